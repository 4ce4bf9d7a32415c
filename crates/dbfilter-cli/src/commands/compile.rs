use crate::cli::CompileArgs;
use crate::commands::read_filter_set;
use anyhow::{Context, Result};
use dbfilter_query::{FilterConfig, FilterSet};
use tracing::info;

pub fn execute(config: &FilterConfig, args: &CompileArgs) -> Result<String> {
    let set = read_filter_set(&args.input)?;
    render(config, args, &set)
}

/// Render `set` for the target in `args` as pretty JSON.
pub fn render(config: &FilterConfig, args: &CompileArgs, set: &FilterSet) -> Result<String> {
    let renderer = args.target.renderer(config, args.start_index, args.named);
    info!(renderer = renderer.name(), "Compiling filter set");

    let rendered = renderer
        .render(set)
        .with_context(|| format!("Failed to compile filter for {}", args.target))?;

    serde_json::to_string_pretty(&rendered).context("Failed to serialize compiled filter")
}
