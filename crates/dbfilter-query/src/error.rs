//! Error types for filter compilation

use std::io;
use thiserror::Error;

/// Errors raised while compiling a filter set or loading its configuration.
///
/// Malformed conditions (no column, no operator, an operator this version
/// does not know) are never errors. Every compiler skips them through
/// [`crate::transform::compilable`]; [`crate::transform::PruneTransform`]
/// drops them from a whole set up front.
#[derive(Debug, Error)]
pub enum FilterError {
    /// `between` condition without a second bound, under a policy that rejects it
    #[error("Incomplete range filter on column '{column}': 'between' requires a second value")]
    IncompleteRange {
        /// Column the range was applied to
        column: String,
    },

    /// Logic combinator other than AND / OR
    #[error("Invalid filter logic '{0}': expected AND or OR")]
    InvalidLogic(String),

    /// Target name that maps to no compiler
    #[error("Unknown filter target '{0}'")]
    UnknownTarget(String),

    /// Configuration file could not be parsed
    #[error("Config error: {0}")]
    Config(String),

    /// IO error reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Filter document is not valid JSON for the filter model
    #[error("Invalid filter document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Specialized Result type for filter compilation
pub type Result<T> = std::result::Result<T, FilterError>;

impl FilterError {
    /// Create an incomplete range error for a column
    pub fn incomplete_range(column: impl Into<String>) -> Self {
        Self::IncompleteRange {
            column: column.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error comes from the filter itself rather than the environment.
    ///
    /// Callers surface these to the user as "invalid filter".
    pub fn is_invalid_filter(&self) -> bool {
        matches!(
            self,
            Self::IncompleteRange { .. } | Self::InvalidLogic(_) | Self::Json(_)
        )
    }
}
