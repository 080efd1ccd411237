use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use code_judge::{
    summarize, ExecutionResult, JudgeConfig, JudgeService, SubmissionVerdict, TestCase,
    TestInput, TestResult,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Judge error: {0}")]
    JudgeError(#[from] code_judge::Error),
    #[error("Server error: {0}")]
    ServerError(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::JudgeError(_) | ServerError::ServerError(_) => {
                error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExecuteRequest {
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub input: Option<TestInput>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRequest {
    pub language: String,
    pub code: String,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TestResponse {
    pub results: Vec<TestResult>,
    pub summary: SubmissionVerdict,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LanguageStatus {
    pub language: String,
    pub available: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageStatus>,
}

#[derive(Clone)]
pub struct AppState {
    service: Arc<JudgeService>,
}

pub async fn create_app(config: JudgeConfig) -> Result<Router, ServerError> {
    let service = JudgeService::new(config).await?;

    let state = AppState {
        service: Arc::new(service),
    };

    let cors = CorsLayer::permissive();

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/languages", get(languages))
        .route("/execute", post(execute))
        .route("/test", post(test_code))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}

pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    info!("Starting code judge server on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::ServerError(e.to_string()))?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = state
        .service
        .available_languages()
        .into_iter()
        .map(|(language, available)| LanguageStatus {
            language: language.to_string(),
            available,
        })
        .collect();
    Json(LanguagesResponse { languages })
}

async fn execute(
    State(state): State<AppState>,
    Json(payload): Json<ExecuteRequest>,
) -> Json<ExecutionResult> {
    let result = state
        .service
        .execute(&payload.code, &payload.language, payload.input)
        .await;
    Json(result)
}

async fn test_code(
    State(state): State<AppState>,
    Json(payload): Json<TestRequest>,
) -> Result<Json<TestResponse>, ServerError> {
    if payload.test_cases.is_empty() {
        return Err(ServerError::InvalidRequest(
            "testCases must not be empty".to_string(),
        ));
    }

    let results = state
        .service
        .test_code(&payload.code, &payload.language, &payload.test_cases)
        .await;
    let summary = summarize(&results);
    info!(
        "Graded {} submission: {} ({}/{})",
        payload.language, summary.verdict, summary.passed_count, summary.total_tests
    );

    Ok(Json(TestResponse { results, summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use code_judge::Verdict;
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn test_app() -> (TempDir, Router) {
        let root = TempDir::new().unwrap();
        let config = JudgeConfig {
            scratch_root: root.path().to_path_buf(),
            max_concurrent_executions: 1,
            ..JudgeConfig::default()
        };
        let app = create_app(config).await.expect("Failed to create app");
        (root, app)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let limit = usize::MAX;
        let body = axum::body::to_bytes(response.into_body(), limit)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn python_available() -> bool {
        which::which("python3").is_ok()
    }

    #[tokio::test]
    async fn test_health_check() {
        let (_root, app) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_languages() {
        let (_root, app) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/languages")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: LanguagesResponse = body_json(response).await;
        let names: Vec<_> = body.languages.iter().map(|l| l.language.as_str()).collect();
        assert_eq!(names, vec!["javascript", "python", "java", "cpp"]);
    }

    #[tokio::test]
    async fn test_execute_unsupported_language() {
        let (_root, app) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/execute",
                json!({ "language": "cobol", "code": "DISPLAY 'HI'." }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let result: ExecutionResult = body_json(response).await;
        assert!(result.is_error);
        assert_eq!(result.error, "Unsupported language: cobol");
    }

    #[tokio::test]
    async fn test_execute() {
        if !python_available() {
            eprintln!("Skipping test: python3 not available");
            return;
        }
        let (_root, app) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/execute",
                json!({
                    "language": "python",
                    "code": "def solve(nums, target):\n    print('noise')\n    return [0, 1]\n",
                    "input": [4, "2 7 11 15", 9],
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let result: ExecutionResult = body_json(response).await;
        assert!(!result.is_error, "unexpected error: {}", result.error);
        assert_eq!(result.output, "[0,1]");
    }

    #[tokio::test]
    async fn test_test_endpoint() {
        if !python_available() {
            eprintln!("Skipping test: python3 not available");
            return;
        }
        let (_root, app) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/test",
                json!({
                    "language": "python",
                    "code": "def solve(s):\n    return s.upper()\n",
                    "testCases": [
                        { "input": "abc", "expectedOutput": "ABC" },
                        { "input": "x", "expectedOutput": "y" },
                    ],
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: TestResponse = body_json(response).await;
        assert_eq!(body.results.len(), 2);
        assert!(body.results[0].passed);
        assert!(!body.results[1].passed);
        assert_eq!(body.summary.passed_count, 1);
        assert_eq!(body.summary.verdict, Verdict::WrongAnswer);
    }

    #[tokio::test]
    async fn test_empty_test_cases_rejected() {
        let (_root, app) = test_app().await;

        let response = app
            .oneshot(post_json(
                "/test",
                json!({ "language": "python", "code": "", "testCases": [] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
