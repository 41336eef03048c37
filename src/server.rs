//! # Streaming HTTP Transport
//!
//! Exposes generation over HTTP. `POST /generate` validates the request,
//! starts a generation task and streams its progress back as server-sent
//! events, one `data: <json>\n\n` frame per event. The stream ends after the
//! first `completed` or `error` frame.
//!
//! ## Routes
//!
//! - `POST /generate`: `{url, maxUrls?, firecrawlApiKey}` → `text/event-stream`
//! - `GET /health`: `{"status":"ok"}`

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use rig::completion::CompletionModel;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, instrument, warn};

use crate::error::Result;
use crate::generator::{DEFAULT_MAX_URLS, Generator, GeneratorConfig, ProgressEvent};

/// Largest `maxUrls` a client may request
pub const MAX_URLS_LIMIT: u32 = 100;

/// Shortest accepted Firecrawl API key
pub const MIN_API_KEY_LEN: usize = 10;

/// Shared state for the HTTP server
#[derive(Debug, Clone)]
pub struct AppState<C>
where
    C: CompletionModel,
{
    /// Completion model shared by every run, rate limited when built from `model::Client`
    model: C,
    /// Template for per-request generator configuration
    config: GeneratorConfig,
}

impl<C> AppState<C>
where
    C: CompletionModel,
{
    pub fn new(model: C, config: GeneratorConfig) -> Self {
        Self { model, config }
    }
}

/// Body of `POST /generate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub url: String,
    #[serde(default)]
    pub max_urls: Option<u32>,
    pub firecrawl_api_key: String,
}

impl GenerateRequest {
    /// Parse and validate a raw request body
    pub fn parse(body: &[u8]) -> std::result::Result<Self, String> {
        let request: Self = serde_json::from_slice(body).map_err(|e| e.to_string())?;
        request.validate()?;
        Ok(request)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let parsed = url::Url::parse(&self.url).map_err(|e| format!("url: {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(format!("url: unsupported URL {}", self.url));
        }
        if let Some(max_urls) = self.max_urls {
            if !(1..=MAX_URLS_LIMIT).contains(&max_urls) {
                return Err(format!("maxUrls: {max_urls} is outside 1..={MAX_URLS_LIMIT}"));
            }
        }
        if self.firecrawl_api_key.chars().count() < MIN_API_KEY_LEN {
            return Err("firecrawlApiKey: too short".to_string());
        }
        Ok(())
    }

    pub fn max_urls(&self) -> u32 {
        self.max_urls.unwrap_or(DEFAULT_MAX_URLS)
    }
}

/// Errors answered before any stream is opened
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request")]
    InvalidRequest,

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = match &self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (code, body).into_response()
    }
}

/// Build the application router
pub fn router<C>(state: AppState<C>) -> Router
where
    C: CompletionModel + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(generate_handler::<C>))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

/// Serve the router on `addr` until the process stops
pub async fn run_server<C>(addr: SocketAddr, state: AppState<C>) -> Result<()>
where
    C: CompletionModel + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn generate_handler<C>(
    State(state): State<AppState<C>>,
    body: Bytes,
) -> std::result::Result<Response, ApiError>
where
    C: CompletionModel + 'static,
{
    let request = GenerateRequest::parse(&body).map_err(|reason| {
        debug!("Rejected generate request: {}", reason);
        ApiError::InvalidRequest
    })?;

    let mut config = state.config.clone();
    config.max_urls = request.max_urls();
    let generator = Generator::new(&request.firecrawl_api_key, state.model.clone(), config)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("Starting generation for {} ({} URLs max)", request.url, request.max_urls());
    let (tx, rx) = mpsc::unbounded_channel();
    let url = request.url;
    let worker = tokio::spawn(async move {
        if let Err(e) = generator.generate(&url, Some(&tx)).await {
            error!("Generation for {} failed: {}", url, e);
            let _ = tx.send(ProgressEvent::failed(e.to_string()));
        }
    });

    Ok(sse_response(progress_stream(rx, worker)))
}

/// Frame one event as an SSE `data:` chunk
pub fn encode_event(event: &ProgressEvent) -> Option<Bytes> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Bytes::from(format!("data: {json}\n\n"))),
        Err(e) => {
            warn!(error = %e, "failed to serialize progress event");
            None
        }
    }
}

/// Relay progress events until the first terminal one
///
/// When the channel closes without a terminal event the worker is awaited and
/// its failure is reported as an `error` frame.
fn progress_stream(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    worker: JoinHandle<()>,
) -> impl futures::Stream<Item = std::result::Result<Bytes, Infallible>> + Send + 'static {
    async_stream::stream! {
        let mut finished = false;
        while let Some(event) = rx.recv().await {
            let terminal = event.is_terminal();
            if let Some(chunk) = encode_event(&event) {
                yield Ok::<Bytes, Infallible>(chunk);
            }
            if terminal {
                finished = true;
                break;
            }
        }

        if !finished {
            let message = match worker.await {
                Err(e) if e.is_panic() => "Generation task panicked".to_string(),
                Err(e) => format!("Generation task failed: {e}"),
                Ok(()) => "Generation ended without a result".to_string(),
            };
            error!("{}", message);
            if let Some(chunk) = encode_event(&ProgressEvent::failed(message)) {
                yield Ok(chunk);
            }
        }
    }
}

fn sse_response<S>(stream: S) -> Response
where
    S: futures::Stream<Item = std::result::Result<Bytes, Infallible>> + Send + 'static,
{
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/event-stream"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    (headers, Body::from_stream(stream)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GenerationStatus;
    use crate::model::mock_model::MockCompletionModel;
    use axum::http::Request;
    use futures::StreamExt;
    use mockito::{Server, ServerGuard};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const API_KEY: &str = "fc-0123456789";

    fn app(server: &ServerGuard, model: MockCompletionModel) -> Router {
        let config = GeneratorConfig::builder()
            .firecrawl_base_url(server.url())
            .build();
        router(AppState::new(model, config))
    }

    fn offline_app() -> Router {
        router(AppState::new(
            MockCompletionModel::new(),
            GeneratorConfig::builder()
                .firecrawl_base_url("http://127.0.0.1:9")
                .build(),
        ))
    }

    fn post_generate(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn parse_frames(body: &str) -> Vec<ProgressEvent> {
        body.split("\n\n")
            .filter(|frame| !frame.is_empty())
            .map(|frame| {
                let json = frame.strip_prefix("data: ").expect("data frame");
                serde_json::from_str(json).unwrap()
            })
            .collect()
    }

    async fn assert_invalid(body: Value) {
        let response = offline_app()
            .oneshot(post_generate(body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({"error": "Invalid request"}));
    }

    #[tokio::test]
    async fn test_health() {
        let response = offline_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_rejects_missing_fields() {
        assert_invalid(json!({"url": "https://example.com"})).await;
        assert_invalid(json!({"firecrawlApiKey": API_KEY})).await;
    }

    #[tokio::test]
    async fn test_rejects_bad_url() {
        assert_invalid(json!({"url": "not a url", "firecrawlApiKey": API_KEY})).await;
        assert_invalid(json!({"url": "ftp://example.com", "firecrawlApiKey": API_KEY})).await;
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_max_urls() {
        for max_urls in [json!(0), json!(101), json!(-1), json!(2.5)] {
            assert_invalid(json!({
                "url": "https://example.com",
                "maxUrls": max_urls,
                "firecrawlApiKey": API_KEY
            }))
            .await;
        }
    }

    #[tokio::test]
    async fn test_rejects_short_api_key() {
        assert_invalid(json!({"url": "https://example.com", "firecrawlApiKey": "short"})).await;
    }

    #[tokio::test]
    async fn test_rejects_non_json_body() {
        let response = offline_app()
            .oneshot(post_generate("url=https://example.com"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_max_urls_defaults_to_twenty() {
        let request = GenerateRequest::parse(
            br#"{"url": "https://example.com", "firecrawlApiKey": "fc-0123456789"}"#,
        )
        .unwrap();
        assert_eq!(request.max_urls(), DEFAULT_MAX_URLS);
    }

    #[tokio::test]
    async fn test_generate_streams_progress_until_completed() {
        let mut server = Server::new_async().await;
        let _map = server
            .mock("POST", "/v1/map")
            .match_header("authorization", format!("Bearer {API_KEY}").as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "links": ["https://example.com", "https://example.com/docs"]}"#)
            .create_async()
            .await;
        let _scrape = server
            .mock("POST", "/v1/scrape")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "data": {"markdown": "Hello docs"}}"#)
            .expect(2)
            .create_async()
            .await;

        let model = MockCompletionModel::new();
        model
            .set_text_response(r#"{"title": "Docs", "description": "Documentation for the example site."}"#)
            .await;

        let response = app(&server, model)
            .oneshot(post_generate(
                json!({"url": "https://example.com", "maxUrls": 5, "firecrawlApiKey": API_KEY})
                    .to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let events = parse_frames(&body_string(response).await);
        assert_eq!(events.first().unwrap().status, GenerationStatus::Mapping);
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

        let last = events.last().unwrap();
        assert_eq!(last.status, GenerationStatus::Completed);
        assert_eq!(last.total_urls, 2);
        let files = last.files.as_ref().unwrap();
        assert!(files.llms_txt.contains(
            "- [Docs](https://example.com/docs): Documentation for the example site.\n"
        ));
        assert!(files.llms_full_txt.contains("## Docs\nHello docs"));
    }

    #[tokio::test]
    async fn test_generate_streams_error_when_no_urls_found() {
        let mut server = Server::new_async().await;
        let _map = server
            .mock("POST", "/v1/map")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "links": []}"#)
            .create_async()
            .await;

        let response = app(&server, MockCompletionModel::new())
            .oneshot(post_generate(
                json!({"url": "https://example.com", "firecrawlApiKey": API_KEY}).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let events = parse_frames(&body_string(response).await);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, GenerationStatus::Mapping);
        assert_eq!(events[1], ProgressEvent::failed("No URLs found for the website"));
    }

    #[tokio::test]
    async fn test_relay_reports_panicked_worker() {
        let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
        let worker = tokio::spawn(async move {
            let _ = tx.send(ProgressEvent::mapping());
            panic!("worker blew up");
        });

        let frames: Vec<Bytes> = progress_stream(rx, worker)
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        let body: String = frames
            .iter()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .collect();
        let events = parse_frames(&body);

        assert_eq!(events.len(), 2);
        assert_eq!(events[1], ProgressEvent::failed("Generation task panicked"));
    }

    #[tokio::test]
    async fn test_relay_stops_after_terminal_event() {
        let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
        tx.send(ProgressEvent::failed("first")).unwrap();
        tx.send(ProgressEvent::mapping()).unwrap();
        let worker = tokio::spawn(async move {
            drop(tx);
        });

        let frames: Vec<_> = progress_stream(rx, worker).collect().await;
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_encode_event_frames_as_sse() {
        let chunk = encode_event(&ProgressEvent::failed("boom")).unwrap();
        assert_eq!(
            chunk,
            Bytes::from(
                "data: {\"status\":\"error\",\"totalUrls\":0,\"processedUrls\":0,\"errors\":[{\"message\":\"boom\"}]}\n\n"
            )
        );
    }

    #[tokio::test]
    async fn test_cors_preflight_is_permissive() {
        let response = offline_app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/generate")
                    .header("origin", "https://llmstxt.example")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }
}
