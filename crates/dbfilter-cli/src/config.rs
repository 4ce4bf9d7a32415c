//! Configuration loading for the CLI.

use anyhow::{Context, Result};
use dbfilter_query::FilterConfig;
use std::path::Path;
use tracing::debug;

/// Load compiler configuration.
///
/// An explicit path (from `--config` or `DBFILTER_CONFIG`) must exist;
/// without one the built-in defaults are used.
pub fn load(path: Option<&Path>) -> Result<FilterConfig> {
    if path.is_none() {
        debug!("No config file given, using defaults");
    }
    FilterConfig::load_or_default(path).with_context(|| {
        format!(
            "Failed to load config from {}",
            path.map(|p| p.display().to_string()).unwrap_or_default()
        )
    })
}
