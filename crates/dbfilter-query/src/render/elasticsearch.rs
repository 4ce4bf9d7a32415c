//! Elasticsearch filter renderer.
//!
//! Renders a filter set to Query DSL:
//! - `term` / `terms` for equality and membership
//! - case-insensitive `wildcard` for text matching, with `\`, `*` and `?`
//!   in user input escaped so they match literally
//! - `range` for comparisons and `between`
//! - `exists` for null checks
//!
//! Unlike the SQL and MongoDB renderers, a `between` without a second
//! value is always an error here.

use crate::config::SearchConfig;
use crate::error::Result;
use crate::ir::{FilterCondition, FilterOperator, FilterSet, Logic, RangePolicy};
use crate::render::{keyed, FilterRenderer, RenderedFilter};
use crate::transform::compilable;
use crate::values::{escape_wildcard, in_list_typed, scalar_text};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, trace};

/// Compiled Elasticsearch query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElasticsearchFilter {
    /// Query DSL object; `{"bool": {}}` when nothing compiled
    pub query: Value,
}

impl ElasticsearchFilter {
    /// True when no condition compiled.
    pub fn is_empty(&self) -> bool {
        self.query
            .get("bool")
            .and_then(Value::as_object)
            .is_some_and(Map::is_empty)
    }

    /// Query to put in a search body; `match_all` when nothing compiled.
    ///
    /// An empty `bool` clause is not the same as "match everything" in
    /// Elasticsearch, so it is never sent as is.
    pub fn search_query(&self) -> Value {
        if self.is_empty() {
            json!({ "match_all": {} })
        } else {
            self.query.clone()
        }
    }
}

/// Pagination and sorting for a search body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    /// Offset of the first hit; configured default when `None`
    pub from: Option<u64>,
    /// Number of hits; configured default when `None`, capped at the configured maximum
    pub size: Option<u64>,
    /// Sort clauses, passed through unchanged
    pub sort: Option<Vec<Value>>,
    /// Defaults and limits
    pub limits: SearchConfig,
}

impl SearchOptions {
    /// Options using the given defaults and limits
    pub fn with_limits(limits: SearchConfig) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }
}

/// Compile conditions to an Elasticsearch query.
///
/// Returns [`crate::FilterError::IncompleteRange`] for a `between` without a
/// second value.
pub fn compile_elasticsearch_filter(
    conditions: &[FilterCondition],
    logic: Logic,
) -> Result<ElasticsearchFilter> {
    let mut clauses = Vec::new();

    for (condition, op) in compilable(conditions) {
        if let Some(clause) = render_condition(condition, op)? {
            trace!(%op, clause = %clause, "Compiled Elasticsearch condition");
            clauses.push(clause);
        }
    }

    let query = match (clauses.len(), logic) {
        (0, _) => json!({ "bool": {} }),
        (1, _) => clauses.remove(0),
        (_, Logic::And) => json!({ "bool": { "must": clauses } }),
        (_, Logic::Or) => json!({ "bool": { "should": clauses, "minimum_should_match": 1 } }),
    };

    Ok(ElasticsearchFilter { query })
}

/// Compile conditions into a complete search request body.
///
/// ```json
/// { "query": …, "from": 0, "size": 100, "sort": [...] }
/// ```
///
/// `sort` is only present when given.
pub fn compile_elasticsearch_search_body(
    conditions: &[FilterCondition],
    logic: Logic,
    options: &SearchOptions,
) -> Result<Value> {
    let filter = compile_elasticsearch_filter(conditions, logic)?;
    let limits = &options.limits;

    let from = options.from.unwrap_or(limits.default_from);
    let requested = options.size.unwrap_or(limits.default_size);
    let size = requested.min(limits.max_size);
    if size < requested {
        debug!(requested, max = limits.max_size, "Capping search size");
    }

    let mut body = Map::new();
    body.insert("query".to_string(), filter.search_query());
    body.insert("from".to_string(), json!(from));
    body.insert("size".to_string(), json!(size));
    if let Some(sort) = &options.sort {
        body.insert("sort".to_string(), Value::Array(sort.clone()));
    }

    Ok(Value::Object(body))
}

fn render_condition(condition: &FilterCondition, op: FilterOperator) -> Result<Option<Value>> {
    let field = condition.column_name.as_str();
    let value = condition.value_or_null();

    let clause = match op {
        FilterOperator::Equals => term(field, value),
        FilterOperator::NotEquals => must_not(term(field, value)),
        FilterOperator::Contains => wildcard(field, format!("*{}*", wildcard_text(&value))),
        FilterOperator::NotContains => {
            must_not(wildcard(field, format!("*{}*", wildcard_text(&value))))
        }
        FilterOperator::StartsWith => wildcard(field, format!("{}*", wildcard_text(&value))),
        FilterOperator::EndsWith => wildcard(field, format!("*{}", wildcard_text(&value))),
        FilterOperator::GreaterThan => range(field, json!({ "gt": value })),
        FilterOperator::LessThan => range(field, json!({ "lt": value })),
        FilterOperator::GreaterOrEqual => range(field, json!({ "gte": value })),
        FilterOperator::LessOrEqual => range(field, json!({ "lte": value })),
        FilterOperator::IsNull => must_not(exists(field)),
        FilterOperator::IsNotNull => exists(field),
        FilterOperator::Between => {
            let Some(high) = RangePolicy::Reject.upper_bound(condition)? else {
                return Ok(None);
            };
            range(field, json!({ "gte": value, "lte": high }))
        }
        FilterOperator::In => {
            let items = in_list_typed(condition.value.as_ref());
            if items.is_empty() {
                debug!(column = %field, "Skipping 'in' filter with empty list");
                return Ok(None);
            }
            keyed("terms", keyed(field, Value::Array(items)))
        }
    };

    Ok(Some(clause))
}

fn wildcard_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => escape_wildcard(&scalar_text(other)),
    }
}

fn term(field: &str, value: Value) -> Value {
    keyed("term", keyed(field, value))
}

fn wildcard(field: &str, pattern: String) -> Value {
    keyed(
        "wildcard",
        keyed(field, json!({ "value": pattern, "case_insensitive": true })),
    )
}

fn range(field: &str, bounds: Value) -> Value {
    keyed("range", keyed(field, bounds))
}

fn exists(field: &str) -> Value {
    json!({ "exists": { "field": field } })
}

fn must_not(clause: Value) -> Value {
    json!({ "bool": { "must_not": clause } })
}

/// Elasticsearch renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct ElasticsearchRenderer;

impl FilterRenderer for ElasticsearchRenderer {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    fn render(&self, set: &FilterSet) -> Result<RenderedFilter> {
        compile_elasticsearch_filter(&set.conditions, set.logic).map(RenderedFilter::Elasticsearch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;

    fn compile_one(condition: FilterCondition) -> Value {
        compile_elasticsearch_filter(&[condition], Logic::And)
            .unwrap()
            .query
    }

    // =========================================================================
    // Operators
    // =========================================================================

    #[test]
    fn test_equals_term() {
        assert_eq!(
            compile_one(FilterCondition::new("status", FilterOperator::Equals, "active")),
            json!({"term": {"status": "active"}})
        );
    }

    #[test]
    fn test_not_equals_must_not() {
        assert_eq!(
            compile_one(FilterCondition::new("status", FilterOperator::NotEquals, 1)),
            json!({"bool": {"must_not": {"term": {"status": 1}}}})
        );
    }

    #[test]
    fn test_contains_wildcard() {
        assert_eq!(
            compile_one(FilterCondition::new("name", FilterOperator::Contains, "john")),
            json!({"wildcard": {"name": {"value": "*john*", "case_insensitive": true}}})
        );
    }

    #[test]
    fn test_contains_escapes_wildcards() {
        let query = compile_one(FilterCondition::new("name", FilterOperator::Contains, "a*b"));

        assert_eq!(query["wildcard"]["name"]["value"], json!(r"*a\*b*"));
    }

    #[test]
    fn test_not_contains() {
        assert_eq!(
            compile_one(FilterCondition::new("name", FilterOperator::NotContains, "x?")),
            json!({"bool": {"must_not": {"wildcard": {"name": {"value": r"*x\?*", "case_insensitive": true}}}}})
        );
    }

    #[test]
    fn test_prefix_and_suffix() {
        let prefix = compile_one(FilterCondition::new("path", FilterOperator::StartsWith, r"C:\"));
        let suffix = compile_one(FilterCondition::new("path", FilterOperator::EndsWith, ".log"));

        assert_eq!(prefix["wildcard"]["path"]["value"], json!(r"C:\\*"));
        assert_eq!(suffix["wildcard"]["path"]["value"], json!("*.log"));
    }

    #[test]
    fn test_range_operators() {
        let cases = [
            (FilterOperator::GreaterThan, "gt"),
            (FilterOperator::LessThan, "lt"),
            (FilterOperator::GreaterOrEqual, "gte"),
            (FilterOperator::LessOrEqual, "lte"),
        ];
        for (op, es_op) in cases {
            let query = compile_one(FilterCondition::new("price", op, 9.5));
            assert_eq!(query, keyed("range", keyed("price", keyed(es_op, json!(9.5)))));
        }
    }

    #[test]
    fn test_null_checks() {
        assert_eq!(
            compile_one(FilterCondition::unary("email", FilterOperator::IsNull)),
            json!({"bool": {"must_not": {"exists": {"field": "email"}}}})
        );
        assert_eq!(
            compile_one(FilterCondition::unary("email", FilterOperator::IsNotNull)),
            json!({"exists": {"field": "email"}})
        );
    }

    #[test]
    fn test_between() {
        assert_eq!(
            compile_one(FilterCondition::between("ts", "2024-01-01", "2024-12-31")),
            json!({"range": {"ts": {"gte": "2024-01-01", "lte": "2024-12-31"}}})
        );
    }

    #[test]
    fn test_between_without_value2_errors() {
        let result = compile_elasticsearch_filter(
            &[FilterCondition::new("ts", FilterOperator::Between, "2024-01-01")],
            Logic::And,
        );

        assert!(matches!(result, Err(FilterError::IncompleteRange { column }) if column == "ts"));
    }

    #[test]
    fn test_in_typed_array() {
        assert_eq!(
            compile_one(FilterCondition::new("id", FilterOperator::In, json!([1, " two ", 3]))),
            json!({"terms": {"id": [1, "two", 3]}})
        );
    }

    #[test]
    fn test_in_csv_keeps_strings() {
        assert_eq!(
            compile_one(FilterCondition::new("zip", FilterOperator::In, "007, 042")),
            json!({"terms": {"zip": ["007", "042"]}})
        );
    }

    #[test]
    fn test_in_csv_and_array_agree() {
        let from_csv = compile_one(FilterCondition::new("t", FilterOperator::In, "a, b , c"));
        let from_array =
            compile_one(FilterCondition::new("t", FilterOperator::In, json!(["a", "b", "c"])));

        assert_eq!(from_csv, from_array);
    }

    // =========================================================================
    // Combination
    // =========================================================================

    #[test]
    fn test_empty_is_empty_bool() {
        let filter = compile_elasticsearch_filter(&[], Logic::And).unwrap();

        assert_eq!(filter.query, json!({"bool": {}}));
        assert!(filter.is_empty());
        assert_eq!(filter.search_query(), json!({"match_all": {}}));
    }

    #[test]
    fn test_single_condition_is_bare() {
        let filter = compile_elasticsearch_filter(
            &[FilterCondition::unary("a", FilterOperator::IsNotNull)],
            Logic::Or,
        )
        .unwrap();

        assert_eq!(filter.query, json!({"exists": {"field": "a"}}));
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_and_uses_must() {
        let filter = compile_elasticsearch_filter(
            &[
                FilterCondition::new("a", FilterOperator::Equals, 1),
                FilterCondition::new("b", FilterOperator::Equals, 2),
            ],
            Logic::And,
        )
        .unwrap();

        assert_eq!(
            filter.query,
            json!({"bool": {"must": [{"term": {"a": 1}}, {"term": {"b": 2}}]}})
        );
    }

    #[test]
    fn test_or_uses_should() {
        let filter = compile_elasticsearch_filter(
            &[
                FilterCondition::new("a", FilterOperator::Equals, 1),
                FilterCondition::new("b", FilterOperator::Equals, 2),
            ],
            Logic::Or,
        )
        .unwrap();

        assert_eq!(
            filter.query,
            json!({"bool": {
                "should": [{"term": {"a": 1}}, {"term": {"b": 2}}],
                "minimum_should_match": 1
            }})
        );
    }

    #[test]
    fn test_not_equals_alone_is_not_empty() {
        let filter = compile_elasticsearch_filter(
            &[FilterCondition::new("a", FilterOperator::NotEquals, 1)],
            Logic::And,
        )
        .unwrap();

        assert!(!filter.is_empty());
    }

    // =========================================================================
    // Search body
    // =========================================================================

    #[test]
    fn test_search_body_empty_filter_matches_all() {
        let body = compile_elasticsearch_search_body(&[], Logic::And, &SearchOptions::default())
            .unwrap();

        assert_eq!(
            body,
            json!({"query": {"match_all": {}}, "from": 0, "size": 100})
        );
    }

    #[test]
    fn test_search_body_with_pagination_and_sort() {
        let options = SearchOptions {
            from: Some(20),
            size: Some(10),
            sort: Some(vec![json!({"ts": {"order": "desc"}})]),
            ..Default::default()
        };
        let body = compile_elasticsearch_search_body(
            &[FilterCondition::new("level", FilterOperator::Equals, "error")],
            Logic::And,
            &options,
        )
        .unwrap();

        assert_eq!(
            body,
            json!({
                "query": {"term": {"level": "error"}},
                "from": 20,
                "size": 10,
                "sort": [{"ts": {"order": "desc"}}]
            })
        );
    }

    #[test]
    fn test_search_body_caps_size() {
        let options = SearchOptions {
            size: Some(50_000),
            ..SearchOptions::with_limits(SearchConfig {
                max_size: 500,
                ..Default::default()
            })
        };
        let body = compile_elasticsearch_search_body(&[], Logic::And, &options).unwrap();

        assert_eq!(body["size"], json!(500));
    }

    #[test]
    fn test_search_body_propagates_errors() {
        let result = compile_elasticsearch_search_body(
            &[FilterCondition::new("x", FilterOperator::Between, 1)],
            Logic::And,
            &SearchOptions::default(),
        );

        assert!(result.is_err());
    }
}
