//! # dbfilter-query
//!
//! Compiles a database-agnostic filter set (column, operator, value, value2
//! plus a flat AND/OR combinator) into the native query form of each
//! supported backend:
//!
//! - PostgreSQL, MySQL/MariaDB, SQL Server and SQLite WHERE fragments with
//!   bound parameters
//! - MongoDB query documents and `$match` stages
//! - Elasticsearch Query DSL and full search bodies
//!
//! All compilers are pure functions. They never execute anything and never
//! touch the host environment.
//!
//! ```rust
//! use dbfilter_query::{compile_sql_filter, FilterCondition, FilterOperator, Logic, SqlOptions, SqlDialect};
//! use serde_json::json;
//!
//! let conditions = vec![FilterCondition::new("age", FilterOperator::GreaterThan, json!(18))];
//! let compiled = compile_sql_filter(&conditions, Logic::And, &SqlOptions::new(SqlDialect::Postgres)).unwrap();
//!
//! assert_eq!(compiled.where_clause, r#""age" > $1"#);
//! assert_eq!(compiled.params, vec![json!(18)]);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod ir;
pub mod render;
pub mod transform;
pub mod values;

pub use config::{FilterConfig, MongoConfig, SearchConfig, SqlConfig};
pub use error::{FilterError, Result};
pub use ir::{FilterCondition, FilterOperator, FilterSet, Logic, RangePolicy};
pub use render::elasticsearch::{
    compile_elasticsearch_filter, compile_elasticsearch_search_body, ElasticsearchFilter,
    ElasticsearchRenderer, SearchOptions,
};
pub use render::mongo::{
    compile_mongo_filter, compile_mongo_filter_with, compile_mongo_match_stage, MongoFilter,
    MongoOptions, MongoRenderer,
};
pub use render::sql::{
    compile_sql_filter, compile_sql_filter_named, NamedSqlFilter, NamedSqlRenderer, SqlDialect,
    SqlFilter, SqlOptions, SqlRenderer,
};
pub use render::{FilterRenderer, RenderedFilter, Target};
