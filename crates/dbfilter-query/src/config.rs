//! Compiler defaults loaded from TOML.
//!
//! ```toml
//! [sql]
//! range_policy = "reject"
//!
//! [mongo]
//! range_policy = "skip"
//!
//! [elasticsearch]
//! default_from = 0
//! default_size = 100
//! max_size = 10000
//! ```
//!
//! Every section and key is optional; missing values fall back to
//! [`FilterConfig::default`].

use crate::error::{FilterError, Result};
use crate::ir::RangePolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Top-level compiler configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Relational compilers
    pub sql: SqlConfig,
    /// MongoDB compiler
    pub mongo: MongoConfig,
    /// Elasticsearch compiler and search bodies
    pub elasticsearch: SearchConfig,
}

/// Settings for the SQL compilers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// Handling of `between` without a second bound
    pub range_policy: RangePolicy,
}

/// Settings for the MongoDB compiler
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    /// Handling of `between` without a second bound
    pub range_policy: RangePolicy,
}

/// Pagination defaults for Elasticsearch search bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `from` used when the caller gives none
    pub default_from: u64,
    /// `size` used when the caller gives none
    pub default_size: u64,
    /// Upper bound applied to `size`
    pub max_size: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_from: 0,
            default_size: 100,
            // index.max_result_window default
            max_size: 10_000,
        }
    }
}

impl FilterConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| FilterError::config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading filter config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| FilterError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();

        assert_eq!(config.sql.range_policy, RangePolicy::Skip);
        assert_eq!(config.mongo.range_policy, RangePolicy::Skip);
        assert_eq!(config.elasticsearch.default_from, 0);
        assert_eq!(config.elasticsearch.default_size, 100);
        assert_eq!(config.elasticsearch.max_size, 10_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = FilterConfig::from_toml_str(
            r#"
            [sql]
            range_policy = "reject"

            [elasticsearch]
            default_size = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.sql.range_policy, RangePolicy::Reject);
        assert_eq!(config.mongo.range_policy, RangePolicy::Skip);
        assert_eq!(config.elasticsearch.default_size, 25);
        assert_eq!(config.elasticsearch.max_size, 10_000);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = FilterConfig::from_toml_str("").unwrap();
        assert_eq!(config, FilterConfig::default());
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let result = FilterConfig::from_toml_str("[sql]\nrange_policy = \"explode\"\n");
        assert!(matches!(result, Err(FilterError::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = FilterConfig::default();
        config.mongo.range_policy = RangePolicy::Reject;
        config.elasticsearch.default_size = 50;

        let text = config.to_toml_string().unwrap();
        let parsed = FilterConfig::from_toml_str(&text).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[mongo]\nrange_policy = \"reject\"").unwrap();

        let config = FilterConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.mongo.range_policy, RangePolicy::Reject);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = FilterConfig::load_from_file("/nonexistent/dbfilter.toml");
        assert!(matches!(result, Err(FilterError::Io(_))));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = FilterConfig::load_or_default(None).unwrap();
        assert_eq!(config, FilterConfig::default());
    }
}
