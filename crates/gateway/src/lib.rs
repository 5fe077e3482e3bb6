//! HTTP API gateway for Helpdesk.
//!
//! Exposes the chat API under `/api` and, when present, the built
//! frontend as static files.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;
pub mod frontend;

use axum::extract::{ConnectInfo, DefaultBodyLimit};
use axum::{
    Router,
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use helpdesk_assistant::SupportAssistant;
use helpdesk_config::GatewayConfig;
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::api::ErrorResponse;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub assistant: Arc<SupportAssistant>,
}

pub type SharedState = Arc<GatewayState>;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

const HEALTH_PATH: &str = "/api/health";

/// Build the full router.
///
/// Layers applied:
/// - Request body size limit
/// - In-memory rate limiting per client (health exempt)
/// - CORS (any origin unless origins are configured)
/// - HTTP trace logging
pub fn build_router(state: SharedState, config: &GatewayConfig) -> Router {
    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_per_minute,
        Duration::from_secs(60),
    ));

    let api = Router::new()
        .route(HEALTH_PATH, get(health_handler))
        .route("/api/chat", post(api::chat_handler))
        .route("/api/chat/{session_id}", get(api::history_handler))
        .route("/api/sessions", get(api::sessions_handler))
        .with_state(state);

    let app = match frontend::frontend_router(Path::new(&config.static_dir)) {
        Some(frontend) => api.merge(frontend),
        None => api,
    };

    app.layer(DefaultBodyLimit::max(config.body_limit_bytes))
        .layer(middleware::from_fn(move |req, next| {
            let limiter = rate_limiter.clone();
            rate_limit_middleware(limiter, req, next)
        }))
        .layer(cors_layer(&config.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

/// Start the gateway HTTP server and run until ctrl-c.
pub async fn start(
    config: &GatewayConfig,
    assistant: Arc<SupportAssistant>,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(GatewayState { assistant });
    let app = build_router(state, config);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks request timestamps per client key (peer IP).
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly).
struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Check if the client is within rate limits. Returns `true` if allowed.
    fn check(&self, client_key: &str) -> bool {
        self.check_at(client_key, Instant::now())
    }

    fn check_at(&self, client_key: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        // Evict stale clients once the map grows large
        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(client_key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Key a request by peer address, then `X-Forwarded-For`, then "anonymous".
fn client_key(req: &axum::extract::Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Returns 429 with a JSON error once a client exceeds its budget.
/// The health endpoint is exempt so monitoring can poll it freely.
async fn rate_limit_middleware(
    limiter: Arc<RateLimiter>,
    req: axum::extract::Request,
    next: Next,
) -> axum::response::Response {
    if req.uri().path() == HEALTH_PATH {
        return next.run(req).await;
    }

    let client = client_key(&req);
    if !limiter.check(&client) {
        warn!(client = %client, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: RATE_LIMIT_MESSAGE.into(),
            }),
        )
            .into_response();
    }

    next.run(req).await
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use helpdesk_assistant::PromptAssembler;
    use helpdesk_core::corpus::{Corpus, DocumentationEntry};
    use helpdesk_core::error::NoResult;
    use helpdesk_core::message::PromptMessage;
    use helpdesk_core::Provider;
    use helpdesk_providers::FallbackOrchestrator;
    use helpdesk_store::InMemoryStore;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct FixedProvider(&'static str);

    #[async_trait]
    impl Provider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn attempt_reply(&self, _messages: &[PromptMessage]) -> Result<String, NoResult> {
            Ok(self.0.to_string())
        }
    }

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            static_dir: "/nonexistent/frontend/dist".into(),
            ..GatewayConfig::default()
        }
    }

    fn test_app(chain: FallbackOrchestrator, config: &GatewayConfig) -> Router {
        let corpus = Corpus::new(vec![DocumentationEntry::new(
            "Refunds",
            "30-day refund window.",
        )]);
        let assistant = SupportAssistant::new(
            Arc::new(InMemoryStore::new()),
            PromptAssembler::new(corpus),
            chain,
        );
        build_router(
            Arc::new(GatewayState {
                assistant: Arc::new(assistant),
            }),
            config,
        )
    }

    fn answering_app() -> Router {
        test_app(
            FallbackOrchestrator::new().add_default(Arc::new(FixedProvider("30-day refund window"))),
            &test_config(),
        )
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = answering_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn chat_returns_reply() {
        let response = answering_app()
            .oneshot(chat_request(serde_json::json!({
                "sessionId": "abc",
                "message": "What is your refund policy?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sessionId"], "abc");
        assert_eq!(body["reply"], "30-day refund window");
    }

    #[tokio::test]
    async fn blank_message_is_400() {
        let response = answering_app()
            .oneshot(chat_request(serde_json::json!({
                "sessionId": "abc",
                "message": "   "
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("message"));
    }

    #[tokio::test]
    async fn missing_session_is_400() {
        let response = answering_app()
            .oneshot(chat_request(serde_json::json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("sessionId"));
    }

    #[tokio::test]
    async fn whitespace_session_id_is_accepted() {
        let response = answering_app()
            .oneshot(chat_request(serde_json::json!({
                "sessionId": " ",
                "message": "hi"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sessionId"], " ");
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let req = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = answering_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn exhausted_providers_is_503() {
        let app = test_app(FallbackOrchestrator::new(), &test_config());
        let response = app
            .oneshot(chat_request(serde_json::json!({
                "sessionId": "abc",
                "message": "Hello?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], api::UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn history_returns_persisted_transcript() {
        let app = answering_app();
        app.clone()
            .oneshot(chat_request(serde_json::json!({
                "sessionId": "s-42",
                "message": "Refunds?"
            })))
            .await
            .unwrap();

        let req = Request::builder()
            .uri("/api/chat/s-42")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sessionId"], "s-42");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Refunds?");
        assert_eq!(messages[1]["role"], "assistant");

        let req = Request::builder()
            .uri("/api/sessions")
            .body(Body::empty())
            .unwrap();
        let body = body_json(app.oneshot(req).await.unwrap()).await;
        assert_eq!(body["sessions"][0]["id"], "s-42");
    }

    #[tokio::test]
    async fn unknown_session_history_is_empty() {
        let req = Request::builder()
            .uri("/api/chat/never-seen")
            .body(Body::empty())
            .unwrap();
        let response = answering_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rate_limit_returns_429_but_spares_health() {
        let config = GatewayConfig {
            rate_limit_per_minute: 2,
            ..test_config()
        };
        let app = test_app(
            FallbackOrchestrator::new().add_default(Arc::new(FixedProvider("ok"))),
            &config,
        );

        let sessions = || {
            Request::builder()
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap()
        };
        assert_eq!(app.clone().oneshot(sessions()).await.unwrap().status(), StatusCode::OK);
        assert_eq!(app.clone().oneshot(sessions()).await.unwrap().status(), StatusCode::OK);

        let limited = app.clone().oneshot(sessions()).await.unwrap();
        assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body_json(limited).await["error"], RATE_LIMIT_MESSAGE);

        let health = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        assert_eq!(app.oneshot(health).await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let config = GatewayConfig {
            body_limit_bytes: 64,
            ..test_config()
        };
        let app = test_app(
            FallbackOrchestrator::new().add_default(Arc::new(FixedProvider("ok"))),
            &config,
        );
        let response = app
            .oneshot(chat_request(serde_json::json!({
                "sessionId": "abc",
                "message": "x".repeat(500)
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn rate_limiter_window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("1.2.3.4", start));
        assert!(!limiter.check_at("1.2.3.4", start + Duration::from_secs(30)));
        assert!(limiter.check_at("5.6.7.8", start + Duration::from_secs(30)));
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(61)));
    }

    #[test]
    fn client_key_prefers_forwarded_header_without_peer() {
        let req = Request::builder()
            .uri("/api/sessions")
            .header("x-forwarded-for", "10.0.0.7, 172.16.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req), "10.0.0.7");

        let bare = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(client_key(&bare), "anonymous");
    }
}
