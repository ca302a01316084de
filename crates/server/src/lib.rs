//! Council server library: axum router assembly and the `serve()` entry
//! point.

mod auth;
pub mod handlers;
mod logger;
mod markdown;
pub mod state;

use std::net::SocketAddr;

use anyhow::anyhow;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Parameters for [`serve`].
pub struct ServeConfig {
    pub listen_address: SocketAddr,
    pub config: config::Config,
    pub shutdown_signal: CancellationToken,
    pub log_filter: String,
    pub version: String,
}

pub async fn serve(
    ServeConfig {
        listen_address,
        config,
        shutdown_signal,
        log_filter,
        version,
    }: ServeConfig,
) -> anyhow::Result<()> {
    logger::init(&log_filter);
    log::info!("llm-council {version}");

    let state = AppState::new(&config);
    let app = router(state);

    let listener = TcpListener::bind(listen_address)
        .await
        .map_err(|e| anyhow!("failed to bind to {listen_address}: {e}"))?;

    log::info!("listening on {listen_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown_signal.cancelled().await })
        .await
        .map_err(|e| anyhow!("server error: {e}"))
}

/// Builds the full axum [`Router`], public routes unguarded and every other
/// path behind [`auth::require_api_key`] — the allow-list from spec §6
/// (`/`, `/health`) is exactly what's left outside the protected nest.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health));

    let protected = Router::new()
        .route("/api/info", get(handlers::info::info))
        .route("/api/models", get(handlers::models::list_models))
        .route("/api/council", post(handlers::council::run_sync))
        .route("/api/council/async", post(handlers::council::run_async))
        .route("/api/council/jobs", get(handlers::jobs::list))
        .route("/api/council/jobs/cleanup", delete(handlers::jobs::cleanup))
        .route("/api/council/jobs/{id}", get(handlers::jobs::get))
        .route("/api/conversations/{id}/message/stream", post(handlers::stream::message_stream))
        .layer(from_fn_with_state(state.clone(), auth::require_api_key));

    public.merge(protected).with_state(state).layer(CorsLayer::permissive())
}
