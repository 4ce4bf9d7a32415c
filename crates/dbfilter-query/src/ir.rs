//! Backend-agnostic filter representation.
//!
//! This is the shared input of every compiler: a flat list of
//! [`FilterCondition`]s joined by one [`Logic`] combinator. Field names
//! serialize in camelCase so documents produced by the UI layer can be read
//! as they are.

use crate::error::{FilterError, Result};
use crate::values::is_blank;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Comparison applied by a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// `=`
    Equals,
    /// `!=`
    NotEquals,
    /// Case-insensitive substring match
    Contains,
    /// Negated substring match
    NotContains,
    /// Prefix match
    StartsWith,
    /// Suffix match
    EndsWith,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    GreaterOrEqual,
    /// `<=`
    LessOrEqual,
    /// Field is null / missing
    IsNull,
    /// Field is present and not null
    IsNotNull,
    /// Inclusive range between `value` and `value2`
    Between,
    /// Membership in a list
    In,
}

impl FilterOperator {
    /// All operators, in declaration order
    pub const ALL: [FilterOperator; 14] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::EndsWith,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterOrEqual,
        Self::LessOrEqual,
        Self::IsNull,
        Self::IsNotNull,
        Self::Between,
        Self::In,
    ];

    /// Wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::StartsWith => "starts_with",
            Self::EndsWith => "ends_with",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::GreaterOrEqual => "greater_or_equal",
            Self::LessOrEqual => "less_or_equal",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::Between => "between",
            Self::In => "in",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str() == s)
            .ok_or(())
    }
}

/// Combinator applied uniformly across every condition of a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Logic {
    /// All conditions must hold
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    /// At least one condition must hold
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl Logic {
    /// SQL keyword for the combinator
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Logic {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(FilterError::InvalidLogic(s.to_string())),
        }
    }
}

/// How a `between` condition without a second bound is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Drop the condition and keep compiling
    #[default]
    Skip,
    /// Fail the whole compilation with [`FilterError::IncompleteRange`]
    Reject,
}

impl RangePolicy {
    /// Second bound of a `between`, or `None` when the condition is skipped.
    pub fn upper_bound(&self, condition: &FilterCondition) -> Result<Option<Value>> {
        if !is_blank(condition.value2.as_ref()) {
            return Ok(condition.value2.clone());
        }
        match self {
            Self::Skip => {
                debug!(
                    column = %condition.column_name,
                    "Skipping 'between' filter without a second value"
                );
                Ok(None)
            }
            Self::Reject => Err(FilterError::incomplete_range(&condition.column_name)),
        }
    }
}

/// One column/operator/value comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    /// Caller-assigned identifier, ignored by compilers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Target column or document field
    #[serde(default, alias = "column")]
    pub column_name: String,

    /// Comparison to apply. Unknown operator names read as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_operator",
        skip_serializing_if = "Option::is_none"
    )]
    pub operator: Option<FilterOperator>,

    /// Primary comparand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Upper bound for `between`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value2: Option<Value>,
}

fn lenient_operator<'de, D>(deserializer: D) -> std::result::Result<Option<FilterOperator>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|name| name.parse().ok()))
}

impl FilterCondition {
    /// Condition with a single comparand
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            column_name: column.into(),
            operator: Some(operator),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Condition that takes no comparand (`is_null`, `is_not_null`)
    pub fn unary(column: impl Into<String>, operator: FilterOperator) -> Self {
        Self {
            column_name: column.into(),
            operator: Some(operator),
            ..Default::default()
        }
    }

    /// Inclusive `between` condition
    pub fn between(column: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Self::new(column, FilterOperator::Between, low).with_value2(high)
    }

    /// Set the secondary comparand
    pub fn with_value2(mut self, value2: impl Into<Value>) -> Self {
        self.value2 = Some(value2.into());
        self
    }

    /// Set the caller identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether column and operator are both present
    pub fn is_complete(&self) -> bool {
        !self.column_name.trim().is_empty() && self.operator.is_some()
    }

    /// Primary comparand, `null` when absent
    pub fn value_or_null(&self) -> Value {
        self.value.clone().unwrap_or(Value::Null)
    }
}

/// Ordered conditions plus their combinator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSet {
    /// Combinator applied across all conditions
    #[serde(default)]
    pub logic: Logic,
    /// Conditions, in caller order
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
}

impl FilterSet {
    /// Create a set from conditions and logic
    pub fn new(conditions: Vec<FilterCondition>, logic: Logic) -> Self {
        Self { logic, conditions }
    }

    /// Parse a filter document.
    ///
    /// Accepts either `{"logic": "...", "conditions": [...]}` or a bare
    /// array of conditions (logic defaults to AND).
    pub fn from_json_str(input: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(input)?;
        if doc.is_array() {
            let conditions = serde_json::from_value(doc)?;
            return Ok(Self::new(conditions, Logic::And));
        }
        Ok(serde_json::from_value(doc)?)
    }

    /// True when the set has no conditions at all
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_wire_names_round_trip() {
        for op in FilterOperator::ALL {
            assert_eq!(op.as_str().parse::<FilterOperator>(), Ok(op));
        }
        assert!("like".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn test_logic_parse_is_case_insensitive() {
        assert_eq!("or".parse::<Logic>().unwrap(), Logic::Or);
        assert_eq!(" AND ".parse::<Logic>().unwrap(), Logic::And);
        assert!(matches!(
            "xor".parse::<Logic>(),
            Err(FilterError::InvalidLogic(_))
        ));
    }

    #[test]
    fn test_condition_deserializes_camel_case() {
        let cond: FilterCondition = serde_json::from_value(json!({
            "id": "f1",
            "columnName": "age",
            "operator": "between",
            "value": 18,
            "value2": 65
        }))
        .unwrap();

        assert_eq!(cond.id.as_deref(), Some("f1"));
        assert_eq!(cond.column_name, "age");
        assert_eq!(cond.operator, Some(FilterOperator::Between));
        assert_eq!(cond.value, Some(json!(18)));
        assert_eq!(cond.value2, Some(json!(65)));
    }

    #[test]
    fn test_unknown_operator_reads_as_none() {
        let cond: FilterCondition = serde_json::from_value(json!({
            "columnName": "name",
            "operator": "regex_match",
            "value": "x"
        }))
        .unwrap();

        assert_eq!(cond.operator, None);
        assert!(!cond.is_complete());
    }

    #[test]
    fn test_range_policy_upper_bound() {
        let complete = FilterCondition::between("age", 1, 2);
        let open = FilterCondition::new("age", FilterOperator::Between, 1).with_value2(Value::Null);

        assert_eq!(RangePolicy::Skip.upper_bound(&complete).unwrap(), Some(json!(2)));
        assert_eq!(RangePolicy::Skip.upper_bound(&open).unwrap(), None);
        assert!(matches!(
            RangePolicy::Reject.upper_bound(&open),
            Err(FilterError::IncompleteRange { .. })
        ));
    }

    #[test]
    fn test_blank_column_is_incomplete() {
        let cond = FilterCondition::new("   ", FilterOperator::Equals, 1);
        assert!(!cond.is_complete());
    }

    #[test]
    fn test_filter_set_from_bare_array() {
        let set = FilterSet::from_json_str(
            r#"[{"columnName": "a", "operator": "is_null"}]"#,
        )
        .unwrap();

        assert_eq!(set.logic, Logic::And);
        assert_eq!(set.conditions.len(), 1);
        assert_eq!(set.conditions[0].operator, Some(FilterOperator::IsNull));
    }

    #[test]
    fn test_filter_set_from_document() {
        let set = FilterSet::from_json_str(
            r#"{"logic": "OR", "conditions": [{"columnName": "a", "operator": "equals", "value": 1}]}"#,
        )
        .unwrap();

        assert_eq!(set.logic, Logic::Or);
        assert_eq!(set.conditions[0].value, Some(json!(1)));
    }

    #[test]
    fn test_filter_set_invalid_json() {
        let result = FilterSet::from_json_str("{not json");
        assert!(matches!(result, Err(FilterError::Json(_))));
    }
}
