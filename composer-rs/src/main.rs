//! composer-rs: email-template editor gateway

use composer_rs::{ApiServer, AppConfig, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "composer_rs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting composer-rs v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("COMPOSER_CONFIG").ok())
        .map(PathBuf::from);
    match &config_path {
        Some(path) => info!("Loading configuration from {}", path.display()),
        None => info!("No config file specified, using defaults and environment"),
    }

    let config = AppConfig::load(config_path.as_deref())?;
    config.validate()?;

    let state = Arc::new(AppState::from_config(&config)?);
    let server = ApiServer::new(state, config.server.listen_addr.clone());
    server.run().await?;

    Ok(())
}
