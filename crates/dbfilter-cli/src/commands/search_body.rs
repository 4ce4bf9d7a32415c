use crate::cli::SearchBodyArgs;
use crate::commands::read_filter_set;
use anyhow::{Context, Result};
use dbfilter_query::{compile_elasticsearch_search_body, FilterConfig, FilterSet, SearchOptions};
use serde_json::Value;

pub fn execute(config: &FilterConfig, args: &SearchBodyArgs) -> Result<String> {
    let set = read_filter_set(&args.input)?;
    render(config, args, &set)
}

/// Build the search body for `set` as pretty JSON.
pub fn render(config: &FilterConfig, args: &SearchBodyArgs, set: &FilterSet) -> Result<String> {
    let sort = args
        .sort
        .as_deref()
        .map(serde_json::from_str::<Vec<Value>>)
        .transpose()
        .context("--sort must be a JSON array")?;

    let options = SearchOptions {
        from: args.from,
        size: args.size,
        sort,
        limits: config.elasticsearch.clone(),
    };

    let body = compile_elasticsearch_search_body(&set.conditions, set.logic, &options)
        .context("Failed to build search body")?;

    serde_json::to_string_pretty(&body).context("Failed to serialize search body")
}
