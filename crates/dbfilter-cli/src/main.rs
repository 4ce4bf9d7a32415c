use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dbfilter_cli::{
    cli::{Cli, Commands},
    commands, config,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = config::load(cli.config.as_deref())?;

    let output = match &cli.command {
        Commands::Compile(args) => commands::compile::execute(&config, args)?,
        Commands::SearchBody(args) => commands::search_body::execute(&config, args)?,
    };

    println!("{}", output);
    Ok(())
}
