//! Mapping from domain errors to HTTP responses.
//!
//! Every handler returns `Result<_, ApiError>`; status codes and error bodies
//! are decided here and nowhere else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::solve::{SolveError, ValidationError};

use super::routes::ErrorBody;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Malformed body or blank problem.  No backend call was made.
    BadRequest(String),
    /// `POST /api/solve` failed after the request was accepted.
    Solve(SolveError),
    /// `GET /api/models` failed.
    ListModels(SolveError),
    /// The route exists but not for this method.
    MethodNotAllowed,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Solve(SolveError::Validation(ValidationError::SchemaViolation { .. })) => {
                StatusCode::BAD_GATEWAY
            }
            ApiError::Solve(SolveError::Remote { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Solve(_) | ApiError::ListModels(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::BadRequest(message) => ErrorBody::new(message.clone()),
            ApiError::MethodNotAllowed => ErrorBody::new("Method Not Allowed"),
            ApiError::Solve(SolveError::MissingCredential)
            | ApiError::ListModels(SolveError::MissingCredential) => {
                ErrorBody::new("backend credential is not configured")
            }
            ApiError::Solve(SolveError::Generation(e)) => {
                ErrorBody::with_details("Failed to generate 4 solutions.", e.to_string())
            }
            // The raw payload is logged by the validator and never returned.
            ApiError::Solve(SolveError::Validation(ValidationError::Parse(_))) => {
                ErrorBody::new("Invalid JSON from backend.")
            }
            ApiError::Solve(SolveError::Validation(e)) => {
                ErrorBody::with_details("Backend response violated the solution schema.", e.to_string())
            }
            ApiError::Solve(e @ SolveError::Remote { .. }) => {
                ErrorBody::with_details("Failed to generate 4 solutions.", e.to_string())
            }
            ApiError::Solve(e @ SolveError::Internal(_)) => {
                ErrorBody::with_details("Failed to generate 4 solutions.", e.to_string())
            }
            ApiError::ListModels(e) => ErrorBody::with_details("Failed to list models", e.to_string()),
        }
    }

    fn describe(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::MethodNotAllowed => "method not allowed".into(),
            ApiError::Solve(e) => format!("solve failed: {e}"),
            ApiError::ListModels(e) => format!("list models failed: {e}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("server: {status}: {}", self.describe());
        } else {
            log::warn!("server: {status}: {}", self.describe());
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::GenerationError;

    #[test]
    fn status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::Solve(SolveError::MissingCredential), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::Solve(GenerationError::Timeout.into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Solve(GenerationError::EmptyResponse.into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Solve(ValidationError::Parse("eof".into()).into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Solve(
                    ValidationError::SchemaViolation {
                        field: "solutions".into(),
                        reason: "expected 4 items, got 3".into(),
                    }
                    .into(),
                ),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Solve(SolveError::Internal("task panicked".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::ListModels(SolveError::MissingCredential),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{error:?}");
        }
    }

    #[test]
    fn schema_violation_details_name_the_field() {
        let error = ApiError::Solve(
            ValidationError::SchemaViolation {
                field: "solutions[1].approachType".into(),
                reason: "expected TimeOptimized".into(),
            }
            .into(),
        );
        let details = error.body().details.unwrap();
        assert!(details.contains("solutions[1].approachType"), "{details}");
    }

    #[test]
    fn missing_credential_has_no_details() {
        let body = ApiError::ListModels(SolveError::MissingCredential).body();
        assert_eq!(body.error, "backend credential is not configured");
        assert!(body.details.is_none());
    }
}
