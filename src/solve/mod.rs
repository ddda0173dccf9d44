//! Structured solution generation.
//!
//! This module provides:
//! * [`ProblemQuery`], [`SolutionVariant`], [`SolutionSet`]: the data model.
//! * [`PromptBuilder`]: instruction text + response schema for one query.
//! * [`GenerationClient`]: async trait for a single backend attempt;
//!   [`GeminiClient`] is the production implementation.
//! * [`RetryingClient`]: timeout, bounded retry with backoff, cancellation.
//! * [`ResponseValidator`]: strict decode of raw backend text.
//! * [`SolveService`]: the whole pipeline behind the [`Solver`] trait.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use algo_solver::config::{AppConfig, Credential};
//! use algo_solver::solve::{CancelToken, SolveService, Solver};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let credential = Credential::from_env(&config.generation.api_key_env);
//!     let service = SolveService::from_config(&config, credential);
//!
//!     let query = service.query("Two Sum", Some("Python")).unwrap();
//!     let set = service.solve(&query, &CancelToken::new()).await.unwrap();
//!     for variant in set.iter() {
//!         println!("{}: {}", variant.approach_type, variant.title);
//!     }
//! }
//! ```

pub mod client;
pub mod model;
pub mod prompt;
pub mod retry;
pub mod service;
pub mod validate;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{GeminiClient, GenerationClient, GenerationError};
pub use model::{
    ApproachType, ProblemQuery, QueryError, SetError, SolutionSet, SolutionVariant,
    UnknownApproach, DEFAULT_LANGUAGE, SOLUTION_COUNT,
};
pub use prompt::{response_schema, GenerationRequest, PromptBuilder, REQUIRED_FIELDS};
pub use retry::{CancelToken, RetryPolicy, RetryingClient};
pub use service::{SolveError, SolveService, Solver};
pub use validate::{ResponseValidator, ValidationError, ValidatorOptions};
