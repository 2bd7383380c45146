use axum_helpers::create_app;
use core_config::tracing::{init_tracing, install_color_eyre};
use tracing::info;

mod app;
mod config;
mod openapi;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let router = app::build(&config)?;

    info!(
        name = config.app.name,
        version = config.app.version,
        "Starting calendar API"
    );

    create_app(router, &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Calendar API shutdown complete");
    Ok(())
}
