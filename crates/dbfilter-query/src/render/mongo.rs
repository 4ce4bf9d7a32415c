//! MongoDB filter renderer.
//!
//! Produces a query document using native operators (`$eq`, `$regex`,
//! `$in`, …). One condition is emitted bare, several are wrapped in `$and`
//! or `$or`, none yields `{}` which matches every document.
//!
//! `contains` / `not_contains` pass the value to `$regex` unescaped, so
//! regex metacharacters in the value keep their regex meaning. Existing
//! callers rely on that. `starts_with` / `ends_with` escape the value before
//! anchoring it.

use crate::error::Result;
use crate::ir::{FilterCondition, FilterOperator, FilterSet, Logic, RangePolicy};
use crate::render::{keyed, FilterRenderer, RenderedFilter};
use crate::transform::compilable;
use crate::values::{escape_regex, in_list_strings, pattern_text};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

/// Options for the MongoDB compiler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MongoOptions {
    /// Handling of `between` without a second bound
    pub range_policy: RangePolicy,
}

/// Compiled MongoDB query document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MongoFilter {
    /// Document for `find()` or a `$match` stage
    pub query: Value,
}

impl MongoFilter {
    /// True when the document matches everything
    pub fn is_empty(&self) -> bool {
        self.query.as_object().is_some_and(Map::is_empty)
    }

    /// Wrap the document as an aggregation `$match` stage
    pub fn match_stage(&self) -> Value {
        keyed("$match", self.query.clone())
    }
}

/// Compile conditions to a MongoDB query document with default options.
pub fn compile_mongo_filter(conditions: &[FilterCondition], logic: Logic) -> Result<MongoFilter> {
    compile_mongo_filter_with(conditions, logic, &MongoOptions::default())
}

/// Compile conditions to a MongoDB query document.
pub fn compile_mongo_filter_with(
    conditions: &[FilterCondition],
    logic: Logic,
    options: &MongoOptions,
) -> Result<MongoFilter> {
    let mut clauses = Vec::new();

    for (condition, op) in compilable(conditions) {
        if let Some(clause) = render_condition(condition, op, options)? {
            trace!(%op, clause = %clause, "Compiled Mongo condition");
            clauses.push(clause);
        }
    }

    let query = match clauses.len() {
        0 => json!({}),
        1 => clauses.remove(0),
        _ => {
            let combinator = match logic {
                Logic::And => "$and",
                Logic::Or => "$or",
            };
            keyed(combinator, Value::Array(clauses))
        }
    };

    Ok(MongoFilter { query })
}

/// Compile conditions straight to a `{ $match: … }` aggregation stage.
pub fn compile_mongo_match_stage(conditions: &[FilterCondition], logic: Logic) -> Result<Value> {
    compile_mongo_filter(conditions, logic).map(|filter| filter.match_stage())
}

fn render_condition(
    condition: &FilterCondition,
    op: FilterOperator,
    options: &MongoOptions,
) -> Result<Option<Value>> {
    let value = condition.value_or_null();
    let text = || pattern_text(condition.value.as_ref());

    let expr = match op {
        FilterOperator::Equals => json!({ "$eq": value }),
        FilterOperator::NotEquals => json!({ "$ne": value }),
        FilterOperator::Contains => json!({ "$regex": text(), "$options": "i" }),
        FilterOperator::NotContains => {
            json!({ "$not": { "$regex": text(), "$options": "i" } })
        }
        FilterOperator::StartsWith => json!({
            "$regex": format!("^{}", escape_regex(&text())),
            "$options": "i"
        }),
        FilterOperator::EndsWith => json!({
            "$regex": format!("{}$", escape_regex(&text())),
            "$options": "i"
        }),
        FilterOperator::GreaterThan => json!({ "$gt": value }),
        FilterOperator::LessThan => json!({ "$lt": value }),
        FilterOperator::GreaterOrEqual => json!({ "$gte": value }),
        FilterOperator::LessOrEqual => json!({ "$lte": value }),
        FilterOperator::IsNull => json!({ "$eq": null }),
        FilterOperator::IsNotNull => json!({ "$ne": null }),
        FilterOperator::Between => {
            let Some(high) = options.range_policy.upper_bound(condition)? else {
                return Ok(None);
            };
            json!({ "$gte": value, "$lte": high })
        }
        FilterOperator::In => {
            let items = in_list_strings(condition.value.as_ref());
            if items.is_empty() {
                debug!(column = %condition.column_name, "Skipping 'in' filter with empty list");
                return Ok(None);
            }
            json!({ "$in": items })
        }
    };

    Ok(Some(keyed(&condition.column_name, expr)))
}

/// MongoDB renderer
#[derive(Debug, Clone, Default)]
pub struct MongoRenderer {
    /// Compiler options
    pub options: MongoOptions,
}

impl MongoRenderer {
    /// Create a renderer for the given options
    pub fn new(options: MongoOptions) -> Self {
        Self { options }
    }
}

impl FilterRenderer for MongoRenderer {
    fn name(&self) -> &str {
        "mongo"
    }

    fn render(&self, set: &FilterSet) -> Result<RenderedFilter> {
        compile_mongo_filter_with(&set.conditions, set.logic, &self.options)
            .map(RenderedFilter::Mongo)
    }
}
