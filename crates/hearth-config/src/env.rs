//! Environment variable fallbacks.
//!
//! Variables only fill fields that no config file set. Values from the
//! embedded defaults do not count as set.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources};

/// Variable naming an alternate directory for the user config file.
pub const HEARTH_HOME_VAR: &str = "HEARTH_HOME";

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: ValueKind,
}

#[derive(Clone, Copy)]
enum ValueKind {
    String,
    Integer,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "HEARTH_TOKENS_PATH",
        field_path: "store.path",
        kind: ValueKind::String,
    },
    EnvMapping {
        var_name: "HEARTH_LOCK_TIMEOUT_MS",
        field_path: "store.lock_timeout_ms",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "HEARTH_PAIRING_TTL_SECS",
        field_path: "auth.pairing_ttl_secs",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "HEARTH_LOG_LEVEL",
        field_path: "logging.level",
        kind: ValueKind::String,
    },
    EnvMapping {
        var_name: "HEARTH_LOG_FORMAT",
        field_path: "logging.format",
        kind: ValueKind::String,
    },
];

/// Names of all variables consulted as fallbacks.
pub fn fallback_var_names() -> impl Iterator<Item = &'static str> {
    ENV_MAPPINGS.iter().map(|m| m.var_name)
}

/// Fill fields not set by any file layer from `env_vars`.
///
/// Returns the number of variables applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let set_by_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults);
        if set_by_file {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        set_field(merged, mapping.field_path, coerce(mapping.kind, raw));
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    count
}

/// Integers that fail to parse stay strings so deserialization reports them.
fn coerce(kind: ValueKind, raw: &str) -> toml::Value {
    match kind {
        ValueKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map_or_else(|_| toml::Value::String(raw.to_owned()), toml::Value::Integer),
        ValueKind::String => toml::Value::String(raw.to_owned()),
    }
}

/// Set a dotted `path` in `root`, creating intermediate tables.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let (parents, leaf) = path.rsplit_once('.').unwrap_or(("", path));

    let mut current = root;
    for segment in parents.split('.').filter(|s| !s.is_empty()) {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}

/// Snapshot of the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::record_leaves;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    fn defaults_tree() -> (toml::Value, FieldSources) {
        let tree: toml::Value = toml::from_str(
            "[store]\npath = \"/var/lib/hearth/tokens.json\"\nlock_timeout_ms = 10000\n\
             [logging]\nlevel = \"info\"\n",
        )
        .unwrap();
        let mut sources = FieldSources::new();
        record_leaves(&tree, "", &ConfigLayer::Defaults, &mut sources);
        (tree, sources)
    }

    #[test]
    fn env_overrides_defaults() {
        let (mut tree, mut sources) = defaults_tree();
        let env = make_env(&[
            ("HEARTH_TOKENS_PATH", "/tmp/t.json"),
            ("HEARTH_LOCK_TIMEOUT_MS", "250"),
        ]);

        let applied = apply_env_fallbacks(&mut tree, &mut sources, &env);

        assert_eq!(applied, 2);
        assert_eq!(tree["store"]["path"].as_str(), Some("/tmp/t.json"));
        assert_eq!(tree["store"]["lock_timeout_ms"].as_integer(), Some(250));
        assert_eq!(sources.get("store.path"), Some(&ConfigLayer::Environment));
    }

    #[test]
    fn env_does_not_override_files() {
        let (mut tree, mut sources) = defaults_tree();
        sources.insert("logging.level".to_owned(), ConfigLayer::User);
        let env = make_env(&[("HEARTH_LOG_LEVEL", "trace")]);

        assert_eq!(apply_env_fallbacks(&mut tree, &mut sources, &env), 0);
        assert_eq!(tree["logging"]["level"].as_str(), Some("info"));
    }

    #[test]
    fn missing_sections_are_created() {
        let (mut tree, mut sources) = defaults_tree();
        let env = make_env(&[("HEARTH_PAIRING_TTL_SECS", "90")]);

        apply_env_fallbacks(&mut tree, &mut sources, &env);
        assert_eq!(tree["auth"]["pairing_ttl_secs"].as_integer(), Some(90));
    }

    #[test]
    fn unparsable_integer_stays_string() {
        let (mut tree, mut sources) = defaults_tree();
        let env = make_env(&[("HEARTH_LOCK_TIMEOUT_MS", "soon")]);

        apply_env_fallbacks(&mut tree, &mut sources, &env);
        assert_eq!(tree["store"]["lock_timeout_ms"].as_str(), Some("soon"));
    }
}
