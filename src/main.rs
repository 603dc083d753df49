use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

mod cli;
mod config;
mod export;
mod render;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap so `env =` arguments see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = config::load_settings(cli.config.as_deref(), cli.api_url.as_deref())?;
    config::init_tracing(&settings.log_level);

    info!("WealthWise client starting up");
    debug!("Backend at {}", settings.api_base_url);

    cli.run(settings).await
}
