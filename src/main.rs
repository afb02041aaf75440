use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use mapserve::config::Config;
use mapserve::server;

/// Serve a single file over HTTP/1.1 with byte-range support.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Configuration file; must contain a [port] section
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
