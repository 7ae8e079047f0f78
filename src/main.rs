#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use slopwatch::Config;
use slopwatch::cli::Cli;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Both reqwest and tokio-tungstenite pull in rustls; pick the provider once.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = Config::load_or_init(cli.config.as_deref())?;

    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    slopwatch::app::dispatch::dispatch(cli, config).await
}
