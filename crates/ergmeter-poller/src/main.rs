//! ergmeter - rowing logbook meter poller - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Polls a rowing logbook for lifetime, season, and day meter counters.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ERGMETER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    ergmeter_poller::logging::init_logging();

    info!("Starting ergmeter v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config {
        Some(path) => {
            info!(config_path = %path, "Loading configuration");
            ergmeter_poller::AppConfig::from_file(&path)?
        }
        None => ergmeter_poller::AppConfig::load()?,
    };
    info!(
        accounts = config.accounts.len(),
        base_url = %config.base_url,
        "Configuration loaded"
    );

    let app = ergmeter_poller::Application::new(config)?;
    app.run().await?;

    Ok(())
}
