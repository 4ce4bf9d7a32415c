pub mod compile;
pub mod search_body;

use crate::cli::InputArgs;
use anyhow::{Context, Result};
use dbfilter_query::transform::{FilterTransform, PruneTransform};
use dbfilter_query::FilterSet;
use std::io::Read;
use tracing::debug;

/// Read the filter document named by `args`, applying any logic override.
pub fn read_filter_set(args: &InputArgs) -> Result<FilterSet> {
    let raw = if args.input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read filter document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read filter document {}", args.input))?
    };

    let mut set = FilterSet::from_json_str(&raw).context("Failed to parse filter document")?;
    if let Some(logic) = args.logic {
        set.logic = logic;
    }

    let total = set.conditions.len();
    let set = PruneTransform.transform(set)?;
    debug!(
        conditions = set.conditions.len(),
        pruned = total - set.conditions.len(),
        logic = %set.logic,
        "Loaded filter set"
    );
    Ok(set)
}
