//! Application entry point: the solve API server.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Read the backend credential from the configured environment variable.
//! 4. Build the [`SolveService`] (Gemini client behind a retrying wrapper).
//! 5. Serve `POST /api/solve` and `GET /api/models` until the process exits.

use algo_solver::{
    config::{AppConfig, Credential},
    server::{self, AppState},
    solve::SolveService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("AlgoSolver starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Credential (read once; never re-read per request)
    let credential = Credential::from_env(&config.generation.api_key_env);
    if credential.is_none() {
        log::error!(
            "{} is not set; solve and model-listing requests will fail",
            config.generation.api_key_env
        );
    }

    // 4. Solve service
    let service = SolveService::from_config(&config, credential);
    log::info!(
        "Backend: {} (model {})",
        config.generation.base_url,
        config.generation.model
    );

    // 5. HTTP server
    server::run(AppState::new(service, config)).await
}
