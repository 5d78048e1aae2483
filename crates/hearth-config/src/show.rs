//! Source-annotated display for `hearth config show`.

use std::fmt::Write as _;

use crate::merge::FieldSources;
use crate::types::Config;

/// A loaded configuration together with where each value came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path to the layer that set it.
    pub field_sources: FieldSources,
    /// Config files that were loaded, lowest precedence first.
    pub loaded_files: Vec<String>,
}

impl ResolvedConfig {
    /// Render as TOML with a `# [layer]` comment after each value.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn show_toml(&self) -> Result<String, toml::ser::Error> {
        let body = toml::to_string_pretty(&self.config)?;

        let mut output = String::from("# Resolved Hearth configuration\n");
        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (lowest precedence first):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                let _ = writeln!(output, "#   {}. {path}", i.saturating_add(1));
            }
        }
        output.push('\n');

        let mut section = String::new();
        for line in body.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                name.clone_into(&mut section);
            }
            match self.annotate(trimmed, &section) {
                Some(layer) => {
                    let _ = writeln!(output, "{line}  # [{layer}]");
                },
                None => {
                    output.push_str(line);
                    output.push('\n');
                },
            }
        }
        Ok(output)
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized.
    pub fn show_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.config)
    }

    fn annotate(&self, line: &str, section: &str) -> Option<String> {
        if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
            return None;
        }
        let key = line.split('=').next()?.trim();
        let path = if section.is_empty() {
            key.to_owned()
        } else {
            format!("{section}.{key}")
        };
        self.field_sources.get(&path).map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ConfigLayer;

    #[test]
    fn toml_output_is_annotated() {
        let mut field_sources = FieldSources::new();
        field_sources.insert("store.path".to_owned(), ConfigLayer::Environment);
        field_sources.insert("auth.pairing_ttl_secs".to_owned(), ConfigLayer::User);
        let resolved = ResolvedConfig {
            config: Config::default(),
            field_sources,
            loaded_files: vec!["/home/me/.hearth/config.toml".to_owned()],
        };

        let out = resolved.show_toml().unwrap();
        assert!(out.contains("1. /home/me/.hearth/config.toml"));
        assert!(
            out.lines()
                .any(|l| l.starts_with("path = ") && l.ends_with("# [env]"))
        );
        assert!(
            out.lines()
                .any(|l| l.starts_with("pairing_ttl_secs = ") && l.ends_with("# [user]"))
        );
    }

    #[test]
    fn json_output_round_trips() {
        let resolved = ResolvedConfig {
            config: Config::default(),
            field_sources: FieldSources::new(),
            loaded_files: Vec::new(),
        };
        let json = resolved.show_json().unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Config::default());
    }
}
