//! Cave Game Client - real-time cave navigation over a streamed tunnel
//!
//! This is the main entry point for the game client. It handles:
//! - Session registration and tunnel descriptor retrieval over HTTP
//! - The coordinate stream WebSocket that delivers the tunnel geometry
//! - The fixed-tick drone simulation and its terminal front end
//! - Local best-score persistence

mod app;
mod config;
mod game;
mod net;
mod render;
mod score;
mod term;
mod util;
mod ws;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    info!("Starting Cave Game Client");
    info!("Backend API: {}", config.api_base_url);
    info!("Coordinate stream: {}", config.cave_stream_url());
    info!(
        player = %config.player_name,
        complexity = config.complexity,
        "Session parameters"
    );

    let app = App::new(config);
    app.run().await?;

    info!("Session complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
