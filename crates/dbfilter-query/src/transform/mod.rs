//! Filter set transforms.
//!
//! Transforms run over a [`FilterSet`] before any compiler sees it. The only
//! built-in one, [`PruneTransform`], applies the rule shared by all backends:
//! a condition without a column or a known operator is skipped, never an
//! error.

mod prune;

pub use prune::{compilable, PruneTransform};

use crate::error::Result;
use crate::ir::FilterSet;

/// A rewrite of a filter set.
pub trait FilterTransform: Send + Sync {
    /// Unique name for this transform
    fn name(&self) -> &'static str;

    /// Rewrite the set
    fn transform(&self, set: FilterSet) -> Result<FilterSet>;
}
