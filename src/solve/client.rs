//! Core `GenerationClient` trait and the `GeminiClient` implementation.
//!
//! A client performs exactly one attempt per call.  Retrying, backoff and
//! cancellation are layered on top by [`RetryingClient`](crate::solve::RetryingClient).

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{Credential, GenerationConfig};
use crate::solve::prompt::GenerationRequest;
use crate::solve::retry::CancelToken;

// ---------------------------------------------------------------------------
// GenerationError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the generative backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The call could not complete, or the backend answered with a non-2xx
    /// status.
    #[error("backend request failed: {message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The attempt did not complete within the configured timeout.
    #[error("backend request timed out")]
    Timeout,

    /// The call completed but carried no text.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// The caller cancelled the request.
    #[error("backend request was cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Whether another attempt could plausibly succeed.
    ///
    /// Connection failures, timeouts, `408`, `429` and `5xx` are retryable;
    /// other `4xx` (bad key, bad request), empty responses and cancellation
    /// are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Transport { status: None, .. } => true,
            GenerationError::Transport {
                status: Some(code), ..
            } => *code == 408 || *code == 429 || *code >= 500,
            GenerationError::Timeout => true,
            GenerationError::EmptyResponse | GenerationError::Cancelled => false,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationClient trait
// ---------------------------------------------------------------------------

/// Async interface to a schema-constrained generative backend.
///
/// Implementors must be `Send + Sync` so they can be shared across request
/// handlers behind an `Arc<dyn GenerationClient>`.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send one structured-output request and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Like [`generate`](Self::generate), but resolves to
    /// [`GenerationError::Cancelled`] as soon as `cancel` fires.
    async fn generate_cancellable(
        &self,
        request: &GenerationRequest,
        cancel: &CancelToken,
    ) -> Result<String, GenerationError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled),
            outcome = self.generate(request) => outcome,
        }
    }

    /// List the models the backend exposes, passed through as JSON.
    async fn list_models(&self) -> Result<Value, GenerationError>;
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

/// Calls the Gemini `generateContent` REST endpoint with a response schema.
///
/// All connection details come from [`GenerationConfig`]; the credential is
/// resolved once at startup and handed in.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GenerationConfig,
    credential: Credential,
}

impl GeminiClient {
    /// Build a client from config.
    ///
    /// The HTTP client carries the per-attempt timeout from
    /// `config.timeout_secs`.  A default client is used (and a warning
    /// logged) if the builder fails.
    pub fn new(config: &GenerationConfig, credential: Credential) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                log::warn!(
                    "solve: HTTP client builder failed ({e}); using defaults without the {}s timeout",
                    config.timeout_secs
                );
                reqwest::Client::new()
            });

        Self {
            http,
            config: config.clone(),
            credential,
        }
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.config.base_url.trim_end_matches('/'))
    }

    /// Request body for one `generateContent` call.
    pub fn request_body(request: &GenerationRequest) -> Value {
        json!({
            "contents": [
                { "role": "user", "parts": [ { "text": request.instruction } ] }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema":   request.schema,
                "temperature":      request.temperature
            }
        })
    }

    /// Concatenate the text parts of the first candidate.
    ///
    /// Returns `None` when there is no candidate or no text part.
    pub fn extract_text(response: &Value) -> Option<String> {
        let parts = response["candidates"][0]["content"]["parts"].as_array()?;
        let text: String = parts
            .iter()
            .filter_map(|part| part["text"].as_str())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<Value, GenerationError> {
        let response = req
            .header("x-goog-api-key", self.credential.expose())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Transport {
                status: Some(status.as_u16()),
                message: format!("HTTP {status}: {}", truncate(&body, 512)),
            });
        }

        // A 2xx whose body is not JSON carries no usable text.
        response
            .json::<Value>()
            .await
            .map_err(|e| match GenerationError::from(e) {
                GenerationError::Timeout => GenerationError::Timeout,
                _ => GenerationError::EmptyResponse,
            })
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = Self::request_body(request);
        log::debug!(
            "solve: generateContent model={} prompt_len={}",
            self.config.model,
            request.instruction.len()
        );

        let json = self
            .send(self.http.post(self.generate_url()).json(&body))
            .await?;

        Self::extract_text(&json).ok_or(GenerationError::EmptyResponse)
    }

    async fn list_models(&self) -> Result<Value, GenerationError> {
        let json = self.send(self.http.get(self.models_url())).await?;
        Ok(json.get("models").cloned().unwrap_or(Value::Array(Vec::new())))
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
