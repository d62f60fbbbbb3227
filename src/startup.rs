use crate::cache::{refresh_once, spawn_refresh_loop, CacheHandle};
use crate::config::Config;
use crate::error::Error;
use crate::server::{router, AppState};
use crate::shutdown;
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Identifying User-Agent sent with every upstream fetch
const USER_AGENT: &str = concat!("calcache/", env!("CARGO_PKG_VERSION"));

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub fn load_config() -> miette::Result<Arc<Config>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(config)),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Run the cache service until a shutdown signal arrives
pub async fn run(config: Arc<Config>) -> miette::Result<()> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()
        .map_err(Error::from)?;

    let cache = CacheHandle::new();

    // Prime the cache before accepting traffic. A failure here is recorded
    // in the snapshot like any other failed cycle; the server still starts.
    refresh_once(&cache, &client, &config).await;

    spawn_refresh_loop(cache.clone(), client, Arc::clone(&config));

    // Create shutdown channel and spawn the signal handler task
    let (shutdown_send, shutdown_recv) = oneshot::channel();
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send).await;
    });

    let app = router(AppState { cache });
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::from)?;
    info!(
        "Listening on http://{} | interval={}ms",
        addr, config.refresh_interval_ms
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_recv.await;
        })
        .await
        .map_err(Error::from)?;

    Ok(())
}
