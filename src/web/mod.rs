use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline::SyncPipeline;
use crate::storage::Storage;

pub mod routes;
pub mod session;

pub use session::SessionStore;

/// Shared application state; cloned per request, handles are Arc'd.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SyncPipeline>,
    pub storage: Arc<Mutex<Storage>>,
    pub sessions: SessionStore,
    pub config: Arc<Config>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/oauth/login", get(routes::oauth_login))
        .route("/oauth/callback", get(routes::oauth_callback))
        .route("/sync", get(routes::sync))
        .route("/download", get(routes::download))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the store, wire the pipeline and serve the web flow until shutdown.
pub async fn serve(config: Config) -> Result<()> {
    // OAuth credentials are load-bearing for the web flow; fail before binding.
    config.oauth()?;

    let storage = Arc::new(Mutex::new(Storage::new(&config.database_path)?));
    let config = Arc::new(config);
    let pipeline = Arc::new(SyncPipeline::new(storage.clone(), config.clone()));

    let state = AppState {
        pipeline,
        storage,
        sessions: SessionStore::new(),
        config: config.clone(),
    };

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .map_err(|e| Error::Config(format!("invalid listen address {}: {e}", config.listen_addr)))?;

    tracing::info!("listening on http://{addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
