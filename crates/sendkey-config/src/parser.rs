//! KDL configuration parser
//!
//! ```kdl
//! keyboard {
//!     name-pattern "Planck"
//!     clear-modifiers true
//!     modifiers "LEFTCTRL" "LEFTSHIFT" "LEFTALT" "LEFTMETA"
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::model::*;

/// Expand a leading `~` in a configuration path.
pub fn expand_path(raw: &str) -> PathBuf {
    shellexpand::tilde(raw).into_owned().into()
}

/// Parse the configuration file at `path`, or return defaults if it does
/// not exist.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("No configuration at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    parse_config(path)
}

/// Parse a configuration file from the given path
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse configuration from a string
pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let doc: kdl::KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        // kdl carries its own miette version, so rebuild the span from offset/len
        let span = miette::SourceSpan::from((e.span.offset(), e.span.len()));
        ConfigError::ParseError {
            src: content.to_string(),
            span,
            source: e,
        }
    })?;

    let mut config = Config::default();

    for node in doc.nodes() {
        match node.name().value() {
            "keyboard" => {
                config.keyboard = parse_keyboard(node)?;
            }
            name => {
                tracing::warn!("Unknown top-level node: {}", name);
            }
        }
    }

    Ok(config)
}

fn parse_keyboard(node: &kdl::KdlNode) -> Result<KeyboardConfig, ConfigError> {
    let mut keyboard = KeyboardConfig::default();

    let Some(children) = node.children() else {
        return Ok(keyboard);
    };

    for child in children.nodes() {
        match child.name().value() {
            "name-pattern" => {
                let pattern = first_string(child, "name-pattern")?;
                keyboard.name_pattern = (!pattern.is_empty()).then(|| pattern.to_string());
            }
            "clear-modifiers" => {
                keyboard.clear_modifiers = child
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_bool())
                    .ok_or_else(|| ConfigError::Invalid {
                        message: "clear-modifiers expects true or false".to_string(),
                    })?;
            }
            "modifiers" => {
                let names = child
                    .entries()
                    .iter()
                    .map(|entry| {
                        entry
                            .value()
                            .as_string()
                            .map(str::to_string)
                            .ok_or_else(|| ConfigError::Invalid {
                                message: format!("modifiers expects key names, got {}", entry.value()),
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                if names.is_empty() {
                    return Err(ConfigError::Invalid {
                        message: "modifiers needs at least one key name".to_string(),
                    });
                }
                keyboard.modifiers = Some(names);
            }
            name => {
                tracing::warn!("Unknown keyboard config option: {}", name);
            }
        }
    }

    Ok(keyboard)
}

fn first_string<'a>(node: &'a kdl::KdlNode, option: &str) -> Result<&'a str, ConfigError> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| ConfigError::Invalid {
            message: format!("{} expects a string", option),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config() {
        let config = parse_config_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.keyboard.name_pattern.is_none());
        assert!(!config.keyboard.clear_modifiers);
    }

    #[test]
    fn test_full_keyboard_config() {
        let config = parse_config_str(
            r#"
            keyboard {
                name-pattern "Planck"
                clear-modifiers true
                modifiers "LEFTCTRL" "LEFTSHIFT"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.keyboard.name_pattern.as_deref(), Some("Planck"));
        assert!(config.keyboard.clear_modifiers);
        assert_eq!(
            config.keyboard.modifiers,
            Some(vec!["LEFTCTRL".to_string(), "LEFTSHIFT".to_string()])
        );
    }

    #[test]
    fn test_empty_name_pattern_is_default() {
        let config = parse_config_str(r#"keyboard { name-pattern ""; }"#).unwrap();
        assert!(config.keyboard.name_pattern.is_none());
    }

    #[test]
    fn test_unknown_nodes_are_ignored() {
        let config = parse_config_str(
            r#"
            mouse { speed 3; }
            keyboard { layout "dvorak"; }
            "#,
        )
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_clear_modifiers() {
        let err = parse_config_str(r#"keyboard { clear-modifiers "yes"; }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_invalid_modifiers() {
        let err = parse_config_str("keyboard { modifiers; }").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = parse_config_str(r#"keyboard { modifiers "LEFTCTRL" 3; }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config_str("keyboard {").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/etc/sendkey/config.kdl"), PathBuf::from("/etc/sendkey/config.kdl"));

        let expanded = expand_path("~/.config/sendkey/config.kdl");
        assert!(expanded.ends_with(".config/sendkey/config.kdl"));
        if std::env::var_os("HOME").is_some() {
            assert!(!expanded.starts_with("~"));
        }
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("config.kdl")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"keyboard {{ name-pattern "HHKB"; }}"#).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.keyboard.name_pattern.as_deref(), Some("HHKB"));
    }
}
