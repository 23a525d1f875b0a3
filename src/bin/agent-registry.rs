//! Agent Registry Binary

use agent_registry::logging::init_logging;
use agent_registry::tooling::cli::{Cli, CliContext};
use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let context = CliContext::new(&cli).context("Failed to load configuration")?;
    init_logging(Some(&context.config().logging), context.log_file())
        .context("Failed to initialise logging")?;

    let output = context.execute(&cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
