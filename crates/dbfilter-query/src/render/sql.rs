//! SQL filter renderer.
//!
//! Renders a filter set to a WHERE fragment (without the `WHERE` keyword)
//! for PostgreSQL, MySQL/MariaDB, SQL Server and generic SQL such as SQLite:
//! - identifiers quoted per dialect, quote characters doubled
//! - every literal bound as a parameter, never interpolated
//! - `$n`, `?` or `@pN` placeholders continuing from a caller-supplied offset
//!
//! The positional and named entry points share one operator table; they
//! differ only in how parameters are collected.

use crate::error::Result;
use crate::ir::{FilterCondition, FilterOperator, FilterSet, Logic, RangePolicy};
use crate::render::{FilterRenderer, RenderedFilter};
use crate::transform::compilable;
use crate::values::{in_list_strings, pattern_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

/// Relational dialect a fragment is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// PostgreSQL
    Postgres,
    /// MySQL
    #[serde(rename = "mysql")]
    MySql,
    /// MariaDB (same syntax as MySQL)
    #[serde(rename = "mariadb")]
    MariaDb,
    /// Microsoft SQL Server
    #[serde(rename = "sqlserver")]
    SqlServer,
    /// SQLite
    Sqlite,
    /// Anything else; ANSI quoting with `?` placeholders
    Other,
}

impl SqlDialect {
    /// Name of the dialect
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::MariaDb => "mariadb",
            Self::SqlServer => "sqlserver",
            Self::Sqlite => "sqlite",
            Self::Other => "other",
        }
    }

    /// Quote an identifier with the dialect's default quoting.
    ///
    /// - PostgreSQL and generic SQL: `"col"`
    /// - MySQL / MariaDB: `` `col` ``
    /// - SQL Server: `[col]`
    pub fn quote_identifier(&self, ident: &str) -> String {
        match self {
            Self::MySql | Self::MariaDb => format!("`{}`", ident.replace('`', "``")),
            Self::SqlServer => format!("[{}]", ident.replace(']', "]]")),
            Self::Postgres | Self::Sqlite | Self::Other => {
                format!("\"{}\"", ident.replace('"', "\"\""))
            }
        }
    }

    fn spec(&self) -> DialectSpec {
        match self {
            Self::Postgres => DialectSpec {
                placeholder: PlaceholderStyle::Numbered,
                like: "ILIKE",
                not_like: "NOT ILIKE",
                text_cast: TextCast::PostgresText,
            },
            Self::MySql | Self::MariaDb | Self::Sqlite | Self::Other => DialectSpec {
                placeholder: PlaceholderStyle::Anonymous,
                like: "LIKE",
                not_like: "NOT LIKE",
                text_cast: TextCast::Bare,
            },
            Self::SqlServer => DialectSpec {
                placeholder: PlaceholderStyle::Named,
                like: "LIKE",
                not_like: "NOT LIKE",
                text_cast: TextCast::NVarChar,
            },
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SqlDialect {
    type Err = Infallible;

    /// Unrecognised names fall back to [`SqlDialect::Other`].
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Self::Postgres,
            "mysql" => Self::MySql,
            "mariadb" => Self::MariaDb,
            "sqlserver" | "mssql" => Self::SqlServer,
            "sqlite" => Self::Sqlite,
            _ => Self::Other,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderStyle {
    /// `$1, $2, …`
    Numbered,
    /// `?`
    Anonymous,
    /// `@p0, @p1, …`
    Named,
}

impl PlaceholderStyle {
    fn render(&self, index: usize) -> String {
        match self {
            Self::Numbered => format!("${}", index + 1),
            Self::Anonymous => "?".to_string(),
            Self::Named => format!("@p{}", index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextCast {
    Bare,
    PostgresText,
    NVarChar,
}

impl TextCast {
    fn apply(&self, column: &str) -> String {
        match self {
            Self::Bare => column.to_string(),
            Self::PostgresText => format!("{}::text", column),
            Self::NVarChar => format!("CAST({} AS NVARCHAR(MAX))", column),
        }
    }
}

/// Per-dialect syntax consumed by the shared operator table
#[derive(Debug, Clone, Copy)]
struct DialectSpec {
    placeholder: PlaceholderStyle,
    like: &'static str,
    not_like: &'static str,
    text_cast: TextCast,
}

/// Custom identifier quoting
pub type QuoteFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Options for the SQL compilers
#[derive(Clone)]
pub struct SqlOptions {
    /// Target dialect
    pub db_type: SqlDialect,
    /// Replaces the dialect's identifier quoting when set
    pub quote_identifier: Option<QuoteFn>,
    /// Number of parameters already bound earlier in the same statement
    pub start_index: usize,
    /// Handling of `between` without a second bound
    pub range_policy: RangePolicy,
}

impl fmt::Debug for SqlOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqlOptions")
            .field("db_type", &self.db_type)
            .field("quote_identifier", &self.quote_identifier.as_ref().map(|_| "<fn>"))
            .field("start_index", &self.start_index)
            .field("range_policy", &self.range_policy)
            .finish()
    }
}

/// SQL Server, the named-parameter compiler's native dialect
impl Default for SqlOptions {
    fn default() -> Self {
        Self::new(SqlDialect::SqlServer)
    }
}

impl SqlOptions {
    /// Options for a dialect with default quoting and no offset
    pub fn new(db_type: SqlDialect) -> Self {
        Self {
            db_type,
            quote_identifier: None,
            start_index: 0,
            range_policy: RangePolicy::default(),
        }
    }

    /// Continue placeholder numbering after `start_index` bound parameters
    pub fn with_start_index(mut self, start_index: usize) -> Self {
        self.start_index = start_index;
        self
    }

    /// Override identifier quoting
    pub fn with_quote_identifier(
        mut self,
        quote: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.quote_identifier = Some(Arc::new(quote));
        self
    }

    /// Set the incomplete-range policy
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = policy;
        self
    }

    fn quote(&self, ident: &str) -> String {
        match &self.quote_identifier {
            Some(quote) => quote(ident),
            None => self.db_type.quote_identifier(ident),
        }
    }
}

/// WHERE fragment with positional parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlFilter {
    /// Fragment without the `WHERE` keyword; empty when nothing compiled
    pub where_clause: String,
    /// Values for the placeholders, in order
    pub params: Vec<Value>,
}

impl SqlFilter {
    /// True when no condition compiled
    pub fn is_empty(&self) -> bool {
        self.where_clause.is_empty()
    }

    /// `WHERE …`, or `None` when the fragment is empty
    pub fn where_sql(&self) -> Option<String> {
        (!self.is_empty()).then(|| format!("WHERE {}", self.where_clause))
    }

    /// `start_index` for the next fragment of the same statement
    pub fn next_index(&self, start_index: usize) -> usize {
        start_index + self.params.len()
    }
}

/// WHERE fragment with a named parameter map
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSqlFilter {
    /// Fragment using `@pN` placeholders
    pub where_clause: String,
    /// Values keyed by parameter name (`p0`, `p1`, …, without `@`)
    pub params: HashMap<String, Value>,
}

impl NamedSqlFilter {
    /// True when no condition compiled
    pub fn is_empty(&self) -> bool {
        self.where_clause.is_empty()
    }

    /// `WHERE …`, or `None` when the fragment is empty
    pub fn where_sql(&self) -> Option<String> {
        (!self.is_empty()).then(|| format!("WHERE {}", self.where_clause))
    }

    /// `start_index` for the next fragment of the same statement
    pub fn next_index(&self, start_index: usize) -> usize {
        start_index + self.params.len()
    }
}

/// Collects bound values and hands out their placeholders.
trait ParamSink {
    fn bind(&mut self, value: Value) -> String;
}

struct PositionalParams {
    style: PlaceholderStyle,
    offset: usize,
    values: Vec<Value>,
}

impl ParamSink for PositionalParams {
    fn bind(&mut self, value: Value) -> String {
        let placeholder = self.style.render(self.offset + self.values.len());
        self.values.push(value);
        placeholder
    }
}

struct NamedParams {
    next: usize,
    values: HashMap<String, Value>,
}

impl ParamSink for NamedParams {
    fn bind(&mut self, value: Value) -> String {
        let name = format!("p{}", self.next);
        self.next += 1;
        let placeholder = format!("@{}", name);
        self.values.insert(name, value);
        placeholder
    }
}

/// Compile conditions to a WHERE fragment with positional parameters.
///
/// Conditions without a column or operator, `in` lists that normalise to
/// nothing and (under [`RangePolicy::Skip`]) incomplete `between`s are
/// dropped. Zero surviving conditions give an empty fragment and no params.
///
/// Fragments are joined with a bare ` AND ` / ` OR `. When the fragment is
/// combined with other predicates, wrap it in parentheses first:
/// `tenant = ? AND (a = ? OR b = ?)`.
pub fn compile_sql_filter(
    conditions: &[FilterCondition],
    logic: Logic,
    options: &SqlOptions,
) -> Result<SqlFilter> {
    let spec = options.db_type.spec();
    let mut params = PositionalParams {
        style: spec.placeholder,
        offset: options.start_index,
        values: Vec::new(),
    };
    let where_clause = compile_with(conditions, logic, options, &spec, &mut params)?;

    Ok(SqlFilter {
        where_clause,
        params: params.values,
    })
}

/// Compile conditions to a WHERE fragment with `@pN` named parameters.
///
/// Same operator table as [`compile_sql_filter`]. Names start at
/// `p{start_index}`; quoting, LIKE operators and text casts still follow
/// `options.db_type`.
pub fn compile_sql_filter_named(
    conditions: &[FilterCondition],
    logic: Logic,
    options: &SqlOptions,
) -> Result<NamedSqlFilter> {
    let spec = options.db_type.spec();
    let mut params = NamedParams {
        next: options.start_index,
        values: HashMap::new(),
    };
    let where_clause = compile_with(conditions, logic, options, &spec, &mut params)?;

    Ok(NamedSqlFilter {
        where_clause,
        params: params.values,
    })
}

fn compile_with(
    conditions: &[FilterCondition],
    logic: Logic,
    options: &SqlOptions,
    spec: &DialectSpec,
    params: &mut impl ParamSink,
) -> Result<String> {
    let mut fragments = Vec::new();

    for (condition, op) in compilable(conditions) {
        if let Some(fragment) = render_condition(condition, op, options, spec, params)? {
            trace!(dialect = %options.db_type, %op, fragment = %fragment, "Compiled SQL condition");
            fragments.push(fragment);
        }
    }

    Ok(fragments.join(&format!(" {} ", logic.keyword())))
}

fn render_condition(
    condition: &FilterCondition,
    op: FilterOperator,
    options: &SqlOptions,
    spec: &DialectSpec,
    params: &mut impl ParamSink,
) -> Result<Option<String>> {
    let column = options.quote(&condition.column_name);

    let fragment = match op {
        FilterOperator::Equals => compare(&column, "=", condition, params),
        FilterOperator::NotEquals => compare(&column, "!=", condition, params),
        FilterOperator::GreaterThan => compare(&column, ">", condition, params),
        FilterOperator::LessThan => compare(&column, "<", condition, params),
        FilterOperator::GreaterOrEqual => compare(&column, ">=", condition, params),
        FilterOperator::LessOrEqual => compare(&column, "<=", condition, params),
        FilterOperator::Contains => {
            let text = pattern_text(condition.value.as_ref());
            like(spec, &column, spec.like, format!("%{}%", text), params)
        }
        FilterOperator::NotContains => {
            let text = pattern_text(condition.value.as_ref());
            like(spec, &column, spec.not_like, format!("%{}%", text), params)
        }
        FilterOperator::StartsWith => {
            let text = pattern_text(condition.value.as_ref());
            like(spec, &column, spec.like, format!("{}%", text), params)
        }
        FilterOperator::EndsWith => {
            let text = pattern_text(condition.value.as_ref());
            like(spec, &column, spec.like, format!("%{}", text), params)
        }
        FilterOperator::IsNull => format!("{} IS NULL", column),
        FilterOperator::IsNotNull => format!("{} IS NOT NULL", column),
        FilterOperator::Between => {
            let Some(high) = options.range_policy.upper_bound(condition)? else {
                return Ok(None);
            };
            let low = params.bind(condition.value_or_null());
            let high = params.bind(high);
            format!("{} BETWEEN {} AND {}", column, low, high)
        }
        FilterOperator::In => {
            let items = in_list_strings(condition.value.as_ref());
            if items.is_empty() {
                debug!(column = %condition.column_name, "Skipping 'in' filter with empty list");
                return Ok(None);
            }
            let placeholders: Vec<String> = items
                .into_iter()
                .map(|item| params.bind(Value::String(item)))
                .collect();
            format!("{} IN ({})", column, placeholders.join(", "))
        }
    };

    Ok(Some(fragment))
}

fn compare(
    column: &str,
    symbol: &str,
    condition: &FilterCondition,
    params: &mut impl ParamSink,
) -> String {
    format!("{} {} {}", column, symbol, params.bind(condition.value_or_null()))
}

fn like(
    spec: &DialectSpec,
    column: &str,
    operator: &str,
    pattern: String,
    params: &mut impl ParamSink,
) -> String {
    format!(
        "{} {} {}",
        spec.text_cast.apply(column),
        operator,
        params.bind(Value::String(pattern))
    )
}

/// Positional SQL renderer
#[derive(Debug, Clone)]
pub struct SqlRenderer {
    /// Compiler options
    pub options: SqlOptions,
}

impl SqlRenderer {
    /// Create a renderer for the given options
    pub fn new(options: SqlOptions) -> Self {
        Self { options }
    }
}

impl FilterRenderer for SqlRenderer {
    fn name(&self) -> &str {
        self.options.db_type.as_str()
    }

    fn render(&self, set: &FilterSet) -> Result<RenderedFilter> {
        compile_sql_filter(&set.conditions, set.logic, &self.options).map(RenderedFilter::Sql)
    }
}

/// Named-parameter SQL renderer
#[derive(Debug, Clone)]
pub struct NamedSqlRenderer {
    name: String,
    /// Compiler options
    pub options: SqlOptions,
}

impl NamedSqlRenderer {
    /// Create a renderer for the given options
    pub fn new(options: SqlOptions) -> Self {
        Self {
            name: format!("{}-named", options.db_type),
            options,
        }
    }
}

impl FilterRenderer for NamedSqlRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, set: &FilterSet) -> Result<RenderedFilter> {
        compile_sql_filter_named(&set.conditions, set.logic, &self.options)
            .map(RenderedFilter::NamedSql)
    }
}
