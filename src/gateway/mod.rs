//! Axum-based web UI: a trip form, the generated itinerary, and per-session
//! credential controls.
//!
//! - Request body size limits (`gateway.body_limit_bytes`)
//! - Request timeouts sized to the pipeline deadline

mod handlers;
pub mod pages;
pub mod session;

use handlers::{handle_health, handle_index, handle_plan, handle_reset, handle_terminate};
use pages::Pages;
use session::{SessionLimits, SessionRegistry};

use crate::config::{Config, require_credential};
use anyhow::Result;
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Extra time a request gets beyond the pipeline deadline.
pub const REQUEST_TIMEOUT_GRACE_SECS: u64 = 30;
/// Request timeout used when the pipeline deadline is disabled.
pub const UNBOUNDED_REQUEST_TIMEOUT_SECS: u64 = 3600;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionRegistry>,
    pub pages: Arc<Pages>,
    pub output_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config, sessions: SessionRegistry) -> Result<Self> {
        let output_dir = config.output.resolved_dir();
        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
            pages: Arc::new(Pages::new()?),
            output_dir,
        })
    }
}

pub fn request_timeout(config: &Config) -> Duration {
    match config.pipeline.deadline_secs {
        0 => Duration::from_secs(UNBOUNDED_REQUEST_TIMEOUT_SECS),
        secs => Duration::from_secs(secs.saturating_add(REQUEST_TIMEOUT_GRACE_SECS)),
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.gateway.body_limit_bytes;
    let timeout = request_timeout(&state.config);

    Router::new()
        .route("/", get(handle_index))
        .route("/plan", post(handle_plan))
        .route("/session/reset", post(handle_reset))
        .route("/session/terminate", post(handle_terminate))
        .route("/health", get(handle_health))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
}

/// Run the web UI on `host:port`.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the web UI from a pre-bound listener.
///
/// The process credential (environment or `.env`) seeds each new session.
/// Without one the UI still starts, and every plan request reports the
/// missing key.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let default_credential = match require_credential() {
        Ok(credential) => Some(credential),
        Err(error) => {
            tracing::warn!(%error, "no API credential; plan requests will fail");
            None
        }
    };
    let sessions =
        SessionRegistry::new(default_credential).with_limits(SessionLimits::from(&config.gateway));
    serve(host, listener, config, sessions).await
}

/// Serve with an explicit session registry.
pub async fn serve(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
    sessions: SessionRegistry,
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let state = AppState::new(config, sessions)?;

    println!("◆ Itinera listening on http://{host}:{actual_port}");
    println!("  GET  /                   → trip form");
    println!("  POST /plan               → generate itinerary");
    println!("  POST /session/reset      → clear page");
    println!("  POST /session/terminate  → revoke session API key");
    println!("  GET  /health             → health check");
    println!("  Press Ctrl+C to stop.\n");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down web UI");
}
