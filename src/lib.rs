pub mod api; // HTTP surface: page, JSON API, session middleware
pub mod config;
pub mod core_state; // Shared state: classifier, cohort, session histories
pub mod models;
pub mod pipeline;
pub mod session_cache;
pub mod ui; // Server-rendered HTML

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::{CoreState, StartupError};

/// Load configuration, model and cohort, then serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;

    // Initialize tracing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .try_init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    tracing::info!(
        model = %config.model_path.display(),
        dataset = %config.dataset_path.display(),
        "Loading model and reference dataset"
    );

    let bind_addr = config.bind_addr;
    let core = match CoreState::load(config) {
        Ok(core) => Arc::new(core),
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e);
        }
    };

    let mut server = api::start_server(core, bind_addr).await?;
    tracing::info!(addr = %server.addr(), "Open http://{} in a browser", server.addr());

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {e}");
    }
    tracing::info!("Shutting down");
    server.shutdown();
    server.stopped().await;
    Ok(())
}
