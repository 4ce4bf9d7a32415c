//! Pruning of conditions no compiler can use.

use crate::error::Result;
use crate::ir::{FilterCondition, FilterOperator, FilterSet};
use crate::transform::FilterTransform;
use tracing::debug;

/// Drops conditions that have no column or no recognised operator.
pub struct PruneTransform;

impl FilterTransform for PruneTransform {
    fn name(&self) -> &'static str {
        "prune"
    }

    fn transform(&self, set: FilterSet) -> Result<FilterSet> {
        let FilterSet { logic, conditions } = set;
        let kept = conditions
            .into_iter()
            .filter(|c| keep(c).is_some())
            .collect();
        Ok(FilterSet::new(kept, logic))
    }
}

/// Conditions a compiler should look at, paired with their operator.
///
/// Skipped conditions are logged at debug level with their position so a
/// half-filled filter row can be traced without failing the query.
pub fn compilable<'a>(
    conditions: &'a [FilterCondition],
) -> impl Iterator<Item = (&'a FilterCondition, FilterOperator)> + 'a {
    conditions
        .iter()
        .enumerate()
        .filter_map(|(index, condition)| {
            let op = keep(condition);
            if op.is_none() {
                debug!(
                    index,
                    column = %condition.column_name,
                    "Skipping filter condition without column or known operator"
                );
            }
            op.map(|op| (condition, op))
        })
}

fn keep(condition: &FilterCondition) -> Option<FilterOperator> {
    if condition.column_name.trim().is_empty() {
        return None;
    }
    condition.operator
}
