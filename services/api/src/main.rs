use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{
    config::{AppConfig, LogFormat},
    routes,
    state::{self, AppState},
};

const DEFAULT_LOG_FILTER: &str = "api=info,tower_http=info";

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    init_tracing(config.log_format)?;

    info!("Starting API service");

    let store = state::connect_store(&config.store).await?;
    let identity = state::build_identity(&config.identity)?;
    let app_state = AppState::new(store, identity);

    info!("API service initialized successfully");

    // Start the web server
    let prefix = config.route_prefix();
    let app = routes::create_router(app_state, prefix.as_deref());

    let addr = config.listen_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        "API service listening on {}{}",
        addr,
        prefix.as_deref().unwrap_or_default()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
