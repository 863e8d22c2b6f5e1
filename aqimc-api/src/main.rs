//! AQIMC API Server
//!
//! HTTP interface to the AQIMC cipher pipeline.
//!
//! Configuration (environment variables):
//!   AQIMC_HOST        - Listen address (default: 0.0.0.0)
//!   AQIMC_PORT        - Listen port (default: 5000)
//!   AQIMC_LOG_FORMAT  - "json" for structured logging, "pretty" for dev
//!   RUST_LOG          - tracing filter (default: aqimc_api=info,aqimc=info,tower_http=info)
//!
//! Routes:
//!   GET  /         - service banner and endpoint list
//!   GET  /health   - liveness
//!   POST /encrypt  - { plaintext, key1..key4 }
//!   POST /decrypt  - { ciphertext, key1..key4 }
//!   GET  /test     - built-in HELLO round trip

use std::sync::Arc;

use aqimc::wire::{self, CipherResponse, DecryptRequest, EncryptRequest};
use aqimc::Aqimc;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct Config {
    host: String,
    port: u16,
    json_logs: bool,
}

impl Config {
    fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("AQIMC_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: lookup("AQIMC_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            json_logs: lookup("AQIMC_LOG_FORMAT").map(|v| v == "json").unwrap_or(false),
        }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// State and router
// ---------------------------------------------------------------------------

struct AppState {
    engine: Aqimc,
}

type Shared = Arc<AppState>;

fn app(state: Shared) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/encrypt", post(encrypt))
        .route("/decrypt", post(decrypt))
        .route("/test", get(self_test))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

fn no_json(rejection: JsonRejection) -> (StatusCode, Json<CipherResponse>) {
    tracing::debug!(reason = %rejection, "rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(CipherResponse::failure_message("No JSON data provided")),
    )
}

fn status_of(resp: &CipherResponse) -> StatusCode {
    if resp.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

async fn index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "AQIMC Encryption System API",
        "endpoints": {
            "encrypt": "/encrypt (POST)",
            "decrypt": "/decrypt (POST)",
        },
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "version": VERSION}))
}

async fn encrypt(
    State(state): State<Shared>,
    payload: Result<Json<EncryptRequest>, JsonRejection>,
) -> (StatusCode, Json<CipherResponse>) {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return no_json(rejection),
    };
    let resp = req.respond(&state.engine);
    if let Some(error) = &resp.error {
        tracing::info!(error = %error, "encrypt rejected");
    }
    (status_of(&resp), Json(resp))
}

async fn decrypt(
    State(state): State<Shared>,
    payload: Result<Json<DecryptRequest>, JsonRejection>,
) -> (StatusCode, Json<CipherResponse>) {
    let Json(req) = match payload {
        Ok(body) => body,
        Err(rejection) => return no_json(rejection),
    };
    let resp = req.respond(&state.engine);
    if let Some(error) = &resp.error {
        tracing::info!(error = %error, "decrypt rejected");
    }
    (status_of(&resp), Json(resp))
}

async fn self_test(State(state): State<Shared>) -> impl IntoResponse {
    match wire::self_test(&state.engine) {
        Ok(report) => (StatusCode::OK, Json(serde_json::to_value(report).unwrap_or_default())),
        Err(e) => {
            tracing::error!(kind = e.kind(), error = %e, "self-test failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"success": false, "error": e.to_string()})),
            )
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "aqimc_api=info,aqimc=info,tower_http=info".into());
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).with_target(true).with_thread_ids(true).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state: Shared = Arc::new(AppState { engine: Aqimc::new() });

    let addr = config.addr();
    tracing::info!(addr = %addr, version = VERSION, "starting AQIMC API Server");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app(state)).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        app(Arc::new(AppState { engine: Aqimc::new() }))
    }

    async fn call(req: Request<Body>) -> (StatusCode, Value) {
        let resp = router().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn config_defaults() {
        let cfg = Config::from_lookup(|_| None);
        assert_eq!(cfg.addr(), "0.0.0.0:5000");
        assert!(!cfg.json_logs);
    }

    #[test]
    fn config_overrides() {
        let cfg = Config::from_lookup(|name| match name {
            "AQIMC_HOST" => Some("127.0.0.1".into()),
            "AQIMC_PORT" => Some("8080".into()),
            "AQIMC_LOG_FORMAT" => Some("json".into()),
            _ => None,
        });
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert!(cfg.json_logs);

        let cfg = Config::from_lookup(|name| (name == "AQIMC_PORT").then(|| "nope".into()));
        assert_eq!(cfg.port, 5000);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (status, body) = call(get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let (status, body) = call(get_req("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["encrypt"], "/encrypt (POST)");
        assert_eq!(body["endpoints"]["decrypt"], "/decrypt (POST)");
    }

    #[tokio::test]
    async fn encrypt_then_decrypt() {
        let (status, body) = call(post_json(
            "/encrypt",
            json!({"plaintext": "HELLO", "key1": "KEYA", "key2": "KEYB", "key3": "MATRIX", "key4": "PERMUTE"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["encrypted_text"], "WAIRHGE");
        assert_eq!(body["steps"]["DKSS"]["output"], "RJLOC");

        let (status, body) = call(post_json(
            "/decrypt",
            json!({"ciphertext": "WAIRHGE", "key1": "KEYA", "key2": "KEYB", "key3": "MATRIX", "key4": "PERMUTE"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["decrypted_text"], "HELLO");
        assert_eq!(body["steps"]["KDPP"]["input"], "WAIRHG");
    }

    #[tokio::test]
    async fn cipher_errors_are_400() {
        let (status, body) = call(post_json(
            "/encrypt",
            json!({"plaintext": "HELLO", "key1": "KEYA", "key2": "KEYB", "key3": "AAAA", "key4": "PERMUTE"}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("not invertible"));
    }

    #[tokio::test]
    async fn missing_field_is_400() {
        let (status, body) = call(post_json("/decrypt", json!({"ciphertext": "WAIRHGE"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "key1: must be a non-empty string");
    }

    #[tokio::test]
    async fn non_json_body_is_400() {
        let req = Request::builder()
            .method("POST")
            .uri("/encrypt")
            .body(Body::from("plaintext=HELLO"))
            .unwrap();
        let (status, body) = call(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "No JSON data provided"}));
    }

    #[tokio::test]
    async fn self_test_matches() {
        let (status, body) = call(get_req("/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["match"], true);
        assert_eq!(body["test_plaintext"], "HELLO");
        assert_eq!(body["decrypted"], "HELLO");
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();
        let resp = router().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }
}
