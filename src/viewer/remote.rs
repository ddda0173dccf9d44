//! [`Solver`] that calls a running solve endpoint over HTTP.

use std::time::Duration;

use async_trait::async_trait;

use crate::server::{ErrorBody, SolveRequest, SolveResponse};
use crate::solve::{CancelToken, GenerationError, ProblemQuery, SolutionSet, SolveError, Solver};

pub struct HttpSolver {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSolver {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn solve_url(&self) -> String {
        format!("{}/api/solve", self.base_url)
    }

    async fn post(&self, query: &ProblemQuery) -> Result<SolutionSet, SolveError> {
        let body = SolveRequest {
            problem: Some(query.text().to_string()),
            language: Some(query.target_language().to_string()),
        };

        let response = self
            .http
            .post(self.solve_url())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::from)?;

        let status = response.status();
        if status.is_success() {
            let parsed: SolveResponse = response.json().await.map_err(GenerationError::from)?;
            return Ok(parsed.solutions);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) => format!("{error} ({details})"),
            Ok(ErrorBody { error, .. }) => error,
            Err(_) => status.to_string(),
        };
        Err(SolveError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl Solver for HttpSolver {
    async fn solve(
        &self,
        query: &ProblemQuery,
        cancel: &CancelToken,
    ) -> Result<SolutionSet, SolveError> {
        log::debug!("viewer: POST {}", self.solve_url());
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GenerationError::Cancelled.into()),
            result = self.post(query) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::server::{serve, AppState};
    use crate::solve::service::stub::{service, StubClient};
    use crate::solve::validate::fixtures::payload;
    use crate::solve::ApproachType;

    async fn spawn_server(stub: Option<Arc<StubClient>>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(service(stub), AppConfig::default()));
        tokio::spawn(serve(listener, state));
        format!("http://{addr}")
    }

    fn two_sum() -> ProblemQuery {
        ProblemQuery::new("Two Sum", Some("Python")).unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let solver = HttpSolver::new("http://localhost:3000/", Duration::from_secs(1));
        assert_eq!(solver.solve_url(), "http://localhost:3000/api/solve");
    }

    #[tokio::test]
    async fn end_to_end_solve() {
        let base = spawn_server(Some(Arc::new(StubClient::ok(payload().to_string())))).await;
        let solver = HttpSolver::new(base, Duration::from_secs(5));

        let set = solver.solve(&two_sum(), &CancelToken::new()).await.unwrap();
        let order: Vec<_> = set.iter().map(|v| v.approach_type).collect();
        assert_eq!(order, ApproachType::ORDER);
    }

    #[tokio::test]
    async fn server_error_becomes_remote_error() {
        let base = spawn_server(None).await;
        let solver = HttpSolver::new(base, Duration::from_secs(5));

        let err = solver.solve(&two_sum(), &CancelToken::new()).await.unwrap_err();
        assert_eq!(
            err,
            SolveError::Remote {
                status: 500,
                message: "backend credential is not configured".into(),
            }
        );
    }

    #[tokio::test]
    async fn cancelled_before_response() {
        let solver = HttpSolver::new("http://127.0.0.1:9", Duration::from_secs(5));
        let cancel = CancelToken::new();
        cancel.cancel();

        assert_eq!(
            solver.solve(&two_sum(), &cancel).await,
            Err(SolveError::Generation(GenerationError::Cancelled))
        );
    }
}
