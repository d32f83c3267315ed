pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod llm;
pub mod models;
pub mod triage;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Initialization failed: {0}")]
    Core(#[from] core_state::CoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the triage service and block until Ctrl-C.
pub fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let app_config = config::AppConfig::from_env()?;
    tracing::info!(db = %app_config.database_path.display(), "Using triage database");

    // The blocking LLM client must be built and dropped outside the runtime.
    let core = Arc::new(core_state::CoreState::from_config(&app_config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(serve(core.clone(), &app_config))?;
    drop(runtime);
    drop(core);

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}

async fn serve(core: Arc<core_state::CoreState>, app_config: &config::AppConfig) -> Result<(), StartupError> {
    let server =
        api::start_api_server_on(core, app_config.bind_addr(), &app_config.cors_origins).await?;
    tracing::info!(addr = %server.addr, "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl-C: {e}");
    }
    server.stop().await;
    Ok(())
}
