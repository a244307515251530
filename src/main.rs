#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use flowbridge::{Cli, Config, app};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_init()?,
    };
    app::dispatch::dispatch(cli, Arc::new(config)).await
}
