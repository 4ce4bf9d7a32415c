//! Value coercion shared by the compilers.
//!
//! IN-list normalisation, scalar stringification and the escaping used by
//! the document compilers live here so every backend reads the same input
//! the same way.

use serde_json::Value;

/// Whether a comparand counts as absent: missing, `null` or `""`.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Text form of a scalar: string content as is, anything else as JSON text.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Text spliced into a pattern (LIKE, regex); absent or `null` reads as empty.
pub fn pattern_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(value) => scalar_text(value),
    }
}

/// Normalise an `in` comparand to a list of trimmed strings.
///
/// Arrays are stringified element by element; any other value is
/// stringified and split on commas. Empty segments are discarded.
pub fn in_list_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| scalar_text(item).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => split_csv(&scalar_text(other)),
    }
}

/// Normalise an `in` comparand keeping JSON types where the input has them.
///
/// Array elements keep their type; string elements are trimmed and dropped
/// when empty, nulls are dropped. A comma-separated string yields strings
/// only, so values like `"007"` still match exactly. Other scalars become a
/// one-element list.
pub fn in_list_typed(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Null => None,
                Value::String(s) => {
                    let trimmed = s.trim();
                    (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
                }
                other => Some(other.clone()),
            })
            .collect(),
        Some(Value::String(s)) => split_csv(s).into_iter().map(Value::String).collect(),
        Some(other) => vec![other.clone()],
    }
}

fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Escape Elasticsearch wildcard metacharacters (`\`, `*`, `?`).
pub fn escape_wildcard(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '*' | '?') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape every regex metacharacter so the text matches literally.
pub fn escape_regex(input: &str) -> String {
    regex::escape(input)
}
