use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod cli;
mod commands;
mod config;
mod models;
mod services;
mod utils;

use api::AlcorClient;
use cli::Cli;
use commands::AppContext;
use config::Config;
use services::aggregate_service::AggregateSpec;
use services::refresh_service::Refresher;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Initialize tracing; logs go to stderr so `json` output stays clean
    let default_directive = if cli.debug { "token_bubbles=debug" } else { "token_bubbles=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!("🫧 Starting token-bubbles v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    if let Some(url) = cli.tokens_url.clone() {
        config.tokens_url = url;
    }
    if let Some(url) = cli.pools_url.clone() {
        config.pools_url = url;
    }
    debug!("Configuration: {:?}", config);

    let client = match AlcorClient::with_urls(config.tokens_url.clone(), config.pools_url.clone(), config.http_timeout) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    let spec = if cli.with_volume { AggregateSpec::with_volume() } else { AggregateSpec::standard() };
    info!("Empty-pool policy: {}", cli.empty_pools);
    let refresher = Arc::new(Refresher::new(Arc::new(client), spec, cli.empty_pools));

    let ctx = AppContext { config, refresher };

    if let Err(e) = commands::handle_command(&ctx, cli.command).await {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
