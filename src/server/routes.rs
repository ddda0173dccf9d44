//! Handlers and wire types for the solve API.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::solve::{CancelToken, SolutionSet, Solver};

use super::error::ApiError;
use super::AppState;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveRequest {
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    pub problem: String,
    pub solutions: SolutionSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Value,
}

// ============================================================================
// Routes
// ============================================================================

pub fn api_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/solve", post(solve).fallback(method_not_allowed))
        .route("/api/models", get(list_models).fallback(method_not_allowed))
}

async fn solve(
    State(state): State<AppStateArc>,
    body: Result<Json<SolveRequest>, JsonRejection>,
) -> Result<Json<SolveResponse>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;

    let problem = req.problem.as_deref().unwrap_or_default();
    let query = state
        .service
        .query(problem, req.language.as_deref())
        .map_err(|_| ApiError::BadRequest("No problem provided.".into()))?;

    log::info!(
        "server: POST /api/solve (language={})",
        query.target_language()
    );

    let solutions = state
        .service
        .solve(&query, &CancelToken::new())
        .await
        .map_err(ApiError::Solve)?;

    Ok(Json(SolveResponse {
        problem: query.text().to_string(),
        solutions,
    }))
}

async fn list_models(State(state): State<AppStateArc>) -> Result<Json<ModelsResponse>, ApiError> {
    log::info!("server: GET /api/models");
    let models = state
        .service
        .list_models()
        .await
        .map_err(ApiError::ListModels)?;
    Ok(Json(ModelsResponse { models }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::server::router;
    use crate::solve::service::stub::{service, StubClient};
    use crate::solve::validate::fixtures::payload;
    use crate::solve::{ApproachType, GenerationError};

    fn app(stub: Option<Arc<StubClient>>) -> Router {
        router(Arc::new(AppState::new(service(stub), AppConfig::default())))
    }

    async fn call(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn solve_returns_four_ordered_variants() {
        let stub = Arc::new(StubClient::ok(payload().to_string()));
        let (status, json) = call(
            app(Some(Arc::clone(&stub))),
            Method::POST,
            "/api/solve",
            r#"{"problem": "Two Sum", "language": "Python"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["problem"], "Two Sum");
        let response: SolveResponse = serde_json::from_value(json).unwrap();
        let order: Vec<_> = response.solutions.iter().map(|v| v.approach_type).collect();
        assert_eq!(order, ApproachType::ORDER);
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn blank_problem_is_rejected_without_backend_call() {
        for body in [r#"{"problem": "   "}"#, r#"{"language": "Java"}"#, "{}", "not json"] {
            let stub = Arc::new(StubClient::ok(payload().to_string()));
            let (status, json) =
                call(app(Some(Arc::clone(&stub))), Method::POST, "/api/solve", body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(json["error"].is_string());
            assert_eq!(stub.calls(), 0, "{body}");
        }
    }

    #[tokio::test]
    async fn missing_credential_is_500_for_both_endpoints() {
        let (status, json) = call(
            app(None),
            Method::POST,
            "/api/solve",
            r#"{"problem": "Two Sum"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "backend credential is not configured");

        let (status, _) = call(app(None), Method::GET, "/api/models", "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn schema_violation_is_502_with_field() {
        let mut bad = payload();
        bad["solutions"].as_array_mut().unwrap().pop();
        let stub = Arc::new(StubClient::ok(bad.to_string()));

        let (status, json) = call(
            app(Some(stub)),
            Method::POST,
            "/api/solve",
            r#"{"problem": "Two Sum"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(json["details"].as_str().unwrap().contains("solutions"));
    }

    #[tokio::test]
    async fn unparsable_payload_is_500_without_raw_text() {
        let stub = Arc::new(StubClient::ok("Sure! Here are your solutions: SECRET_RAW"));
        let (status, json) = call(
            app(Some(stub)),
            Method::POST,
            "/api/solve",
            r#"{"problem": "Two Sum"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!json.to_string().contains("SECRET_RAW"));
    }

    #[tokio::test]
    async fn backend_failure_is_500() {
        let stub = Arc::new(StubClient::err(GenerationError::Transport {
            status: Some(503),
            message: "unavailable".into(),
        }));
        let (status, json) = call(
            app(Some(stub)),
            Method::POST,
            "/api/solve",
            r#"{"problem": "Two Sum"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Failed to generate 4 solutions.");
    }

    #[tokio::test]
    async fn models_are_listed() {
        let stub = Arc::new(StubClient::ok(""));
        let (status, json) = call(app(Some(Arc::clone(&stub))), Method::GET, "/api/models", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["models"][0]["name"], "models/stub");
        assert_eq!(stub.calls(), 1);
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let (status, json) = call(app(None), Method::GET, "/api/solve", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json["error"], "Method Not Allowed");
    }
}
