//! Target renderers for filter sets.
//!
//! Renderers convert a backend-agnostic [`FilterSet`] into the native form
//! of one backend: a parameterized SQL fragment, a MongoDB query document
//! or an Elasticsearch query.

pub mod elasticsearch;
pub mod mongo;
pub mod sql;

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::ir::FilterSet;
use elasticsearch::{ElasticsearchFilter, ElasticsearchRenderer};
use mongo::{MongoFilter, MongoOptions, MongoRenderer};
use serde::Serialize;
use serde_json::{Map, Value};
use sql::{NamedSqlFilter, NamedSqlRenderer, SqlDialect, SqlFilter, SqlOptions, SqlRenderer};
use std::fmt;
use std::str::FromStr;

/// Output from rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RenderedFilter {
    /// WHERE fragment with positional parameters
    Sql(SqlFilter),
    /// WHERE fragment with a named parameter map
    NamedSql(NamedSqlFilter),
    /// MongoDB query document
    Mongo(MongoFilter),
    /// Elasticsearch query
    Elasticsearch(ElasticsearchFilter),
}

/// Trait for rendering a filter set to a target query form.
pub trait FilterRenderer: Send + Sync {
    /// Unique name for this renderer
    fn name(&self) -> &str;

    /// Render the filter set
    fn render(&self, set: &FilterSet) -> Result<RenderedFilter>;
}

/// Backend a filter set can be compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Any relational dialect
    Sql(SqlDialect),
    /// MongoDB
    Mongo,
    /// Elasticsearch
    Elasticsearch,
}

impl Target {
    /// Build the renderer for this target.
    ///
    /// `start_index` only matters for SQL targets; `named` switches SQL
    /// targets to the named-parameter compiler.
    pub fn renderer(
        &self,
        config: &FilterConfig,
        start_index: usize,
        named: bool,
    ) -> Box<dyn FilterRenderer> {
        match self {
            Self::Sql(dialect) => {
                let options = SqlOptions::new(*dialect)
                    .with_start_index(start_index)
                    .with_range_policy(config.sql.range_policy);
                if named {
                    Box::new(NamedSqlRenderer::new(options))
                } else {
                    Box::new(SqlRenderer::new(options))
                }
            }
            Self::Mongo => Box::new(MongoRenderer::new(MongoOptions {
                range_policy: config.mongo.range_policy,
            })),
            Self::Elasticsearch => Box::new(ElasticsearchRenderer),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql(dialect) => write!(f, "{}", dialect),
            Self::Mongo => f.write_str("mongo"),
            Self::Elasticsearch => f.write_str("elasticsearch"),
        }
    }
}

impl FromStr for Target {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "elasticsearch" | "elastic" | "es" => Ok(Self::Elasticsearch),
            "postgres" | "postgresql" | "pg" => Ok(Self::Sql(SqlDialect::Postgres)),
            "mysql" => Ok(Self::Sql(SqlDialect::MySql)),
            "mariadb" => Ok(Self::Sql(SqlDialect::MariaDb)),
            "sqlserver" | "mssql" => Ok(Self::Sql(SqlDialect::SqlServer)),
            "sqlite" => Ok(Self::Sql(SqlDialect::Sqlite)),
            "other" | "sql" => Ok(Self::Sql(SqlDialect::Other)),
            _ => Err(FilterError::UnknownTarget(s.to_string())),
        }
    }
}

/// Single-key object `{key: value}`
pub(crate) fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
