//! Garcon Server - Main entry point.

use anyhow::Result;
use garcon_common::config::Config;
use garcon_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up GROQ_API_KEY etc. from a local .env if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Garcon v{}", env!("CARGO_PKG_VERSION"));

    // Start the chat server
    garcon_server::start_server(&config).await
}
