//! HTTP surface of the solver.
//!
//! ```text
//! POST /api/solve   {problem, language?} → 200 {problem, solutions[4]}
//!                                        → 400 / 500 / 502 {error, details?}
//! GET  /api/models                       → 200 {models} / 500 {error}
//! ```
//!
//! [`AppState`] is built once at startup and shared with every handler
//! through axum state.

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{ErrorBody, SolveRequest, SolveResponse};

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;

use crate::config::AppConfig;
use crate::solve::SolveService;

/// Application state shared across handlers.
pub struct AppState {
    pub service: SolveService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(service: SolveService, config: AppConfig) -> Self {
        Self {
            service,
            config,
        }
    }
}

/// Build the router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().merge(routes::api_routes()).with_state(state)
}

/// Bind `state.config.server.bind_addr` and serve until the process exits.
pub async fn run(state: AppState) -> Result<()> {
    let addr: SocketAddr = state
        .config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address {:?}", state.config.server.bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;
    serve(listener, Arc::new(state)).await
}

/// Serve on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: Arc<AppState>) -> Result<()> {
    let addr = listener.local_addr()?;
    if !state.service.has_credential() {
        log::error!("server: backend credential missing; every solve will fail with 500");
    }
    log::info!("server: listening on http://{addr}");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
