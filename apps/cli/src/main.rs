//! LakeSearch CLI, the indexing frontend for lakehouse catalog search.
//!
//! Crawls a workspace's catalog hierarchy and bulk-loads every entity into
//! a search core, recording each run in a local job database.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
