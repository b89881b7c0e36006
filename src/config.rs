//! Parser and differ configuration, TOML-deserializable.
//!
//! Mirrors the teacher's `config.rs` split: a small set of plain structs
//! with `Default` impls, loaded from an optional TOML file and otherwise
//! falling back to sensible defaults so a caller never has to construct one
//! by hand for the common case.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Schema substituted for an unqualified identifier.
    pub default_schema: String,
    /// When true, identifier comparisons preserve exact case instead of
    /// folding through [`crate::normalize::identifiers_eq`].
    pub case_sensitive: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_schema: "public".to_string(),
            case_sensitive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferConfig {
    /// When true, an extracted `Sequence` owned by a SERIAL-shaped column
    /// default is filtered out before comparison, so parse-produced and
    /// extraction-produced models compare equal despite the extractor
    /// reporting the sequence explicitly. See the open question on
    /// SERIAL/sequence-ownership parity.
    pub treat_serial_sequence_as_owned: bool,
}

impl Default for DifferConfig {
    fn default() -> Self {
        Self {
            treat_serial_sequence_as_owned: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserConfig,
    pub differ: DifferConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.parser.default_schema, "public");
        assert!(!cfg.parser.case_sensitive);
        assert!(cfg.differ.treat_serial_sequence_as_owned);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg: Config = toml::from_str("[parser]\ncase_sensitive = true\n").unwrap();
        assert_eq!(cfg.parser.default_schema, "public");
        assert!(cfg.parser.case_sensitive);
    }
}
