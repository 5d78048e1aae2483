//! `hearth config` - inspect the resolved configuration.

use hearth_config::env::{HEARTH_HOME_VAR, collect_env_vars, fallback_var_names};
use hearth_config::{ConfigPaths, ResolvedConfig};

use crate::theme::Theme;

/// Print the merged configuration with source annotations.
pub(crate) fn show(resolved: &ResolvedConfig, json: bool) -> anyhow::Result<()> {
    let out = if json {
        resolved.show_json()?
    } else {
        resolved.show_toml()?
    };
    println!("{out}");
    Ok(())
}

/// Print the files and variables consulted, and which exist.
pub(crate) fn paths(explicit: Option<&std::path::Path>) -> anyhow::Result<()> {
    let env = collect_env_vars();
    let paths = ConfigPaths::discover(&env)?;

    let describe = |p: &std::path::Path| {
        let state = if p.exists() { "found" } else { "missing" };
        format!("{} {}", p.display(), Theme::dimmed(&format!("({state})")))
    };

    println!("\n{}", Theme::header("Config files (lowest precedence first)"));
    println!("{}", Theme::kv("System", &describe(&paths.system)));
    println!("{}", Theme::kv("User", &describe(&paths.user)));
    if let Some(p) = explicit {
        println!("{}", Theme::kv("Explicit", &describe(p)));
    }

    println!("\n{}", Theme::header("Environment fallbacks"));
    for var in std::iter::once(HEARTH_HOME_VAR).chain(fallback_var_names()) {
        let state = if env.contains_key(var) { "set" } else { "unset" };
        println!("  {var:<24} {}", Theme::dimmed(state));
    }
    println!();
    Ok(())
}
