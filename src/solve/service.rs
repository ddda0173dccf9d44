//! The solve pipeline: prompt → backend → validation.
//!
//! [`SolveService`] is built once at startup from [`AppConfig`] and the
//! startup-time [`Credential`], then shared by every request handler.  When
//! no credential was found the service still exists, but every call fails
//! with [`SolveError::MissingCredential`] without touching the network.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::config::{AppConfig, Credential};
use crate::solve::client::{GeminiClient, GenerationClient, GenerationError};
use crate::solve::model::{ProblemQuery, QueryError, SolutionSet};
use crate::solve::prompt::PromptBuilder;
use crate::solve::retry::{CancelToken, RetryPolicy, RetryingClient};
use crate::solve::validate::{ResponseValidator, ValidationError, ValidatorOptions};

// ---------------------------------------------------------------------------
// SolveError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// No backend credential was configured at startup.
    #[error("backend credential is not configured")]
    MissingCredential,

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A remote solve endpoint answered with an error status.
    #[error("solve endpoint returned {status}: {message}")]
    Remote { status: u16, message: String },

    /// The solve task died before reporting an outcome.
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Solver trait
// ---------------------------------------------------------------------------

/// Anything that can turn a [`ProblemQuery`] into a validated
/// [`SolutionSet`]: the in-process [`SolveService`] or a remote endpoint.
#[async_trait]
pub trait Solver: Send + Sync {
    async fn solve(
        &self,
        query: &ProblemQuery,
        cancel: &CancelToken,
    ) -> Result<SolutionSet, SolveError>;
}

// ---------------------------------------------------------------------------
// SolveService
// ---------------------------------------------------------------------------

pub struct SolveService {
    client: Option<Arc<dyn GenerationClient>>,
    prompt: PromptBuilder,
    validator: ResponseValidator,
    default_language: String,
}

impl SolveService {
    pub fn new(
        client: Option<Arc<dyn GenerationClient>>,
        prompt: PromptBuilder,
        validator: ResponseValidator,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            prompt,
            validator,
            default_language: default_language.into(),
        }
    }

    /// Production wiring: `GeminiClient` wrapped in a `RetryingClient`.
    pub fn from_config(config: &AppConfig, credential: Option<Credential>) -> Self {
        let client = credential.map(|credential| {
            let inner = GeminiClient::new(&config.generation, credential);
            let policy = RetryPolicy::from_config(&config.retry, &config.generation);
            Arc::new(RetryingClient::new(inner, policy)) as Arc<dyn GenerationClient>
        });

        Self::new(
            client,
            PromptBuilder::new(config.generation.temperature),
            ResponseValidator::new(ValidatorOptions::from(&config.validation)),
            config.default_language.clone(),
        )
    }

    pub fn has_credential(&self) -> bool {
        self.client.is_some()
    }

    /// Build a query using this service's default language.
    pub fn query(&self, text: &str, language: Option<&str>) -> Result<ProblemQuery, QueryError> {
        ProblemQuery::with_default_language(text, language, &self.default_language)
    }

    fn client(&self) -> Result<&Arc<dyn GenerationClient>, SolveError> {
        self.client.as_ref().ok_or(SolveError::MissingCredential)
    }

    pub async fn solve_cancellable(
        &self,
        query: &ProblemQuery,
        cancel: &CancelToken,
    ) -> Result<SolutionSet, SolveError> {
        let client = self.client()?;
        let request = self.prompt.build(query);

        log::info!(
            "solve: generating solutions (language={}, problem_len={})",
            query.target_language(),
            query.text().len()
        );

        let raw = client.generate_cancellable(&request, cancel).await?;
        log::debug!("solve: raw backend payload ({} bytes)", raw.len());

        let set = self.validator.validate(&raw)?;
        log::info!("solve: validated {} solutions", set.len());
        Ok(set)
    }

    pub async fn list_models(&self) -> Result<Value, SolveError> {
        Ok(self.client()?.list_models().await?)
    }
}

#[async_trait]
impl Solver for SolveService {
    async fn solve(
        &self,
        query: &ProblemQuery,
        cancel: &CancelToken,
    ) -> Result<SolutionSet, SolveError> {
        self.solve_cancellable(query, cancel).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
