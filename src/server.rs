//! HTTP relay for component code generation.
//!
//! A thin forwarding layer: each generation request embeds the current
//! knowledge base and the caller's prompt into the instruction template
//! and relays it to the hosted generation API. The server holds no
//! session state and keeps nothing between requests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/generate` | Generate component code from a prompt |
//! | `GET`  | `/models` | List hosted models that can generate content |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! A missing prompt yields `400` with a plain-text body. Internal
//! failures yield `500` with a JSON body carrying a human-readable
//! `message` and a `stack` with the full error chain:
//!
//! ```json
//! { "message": "Generation API error 503: ...", "stack": "..." }
//! ```
//!
//! A request to `/generate` with any method other than `POST` yields
//! `405 Method Not Allowed`.
//!
//! # Freshness
//!
//! The knowledge base is re-read from disk and the API key re-read from
//! the environment on every request, so a rebuilt artifact or a rotated
//! key takes effect without a restart.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::genai::GenAiClient;
use crate::prompt::PromptEngine;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<RelayConfig>,
    genai: Arc<GenAiClient>,
    prompt: Arc<PromptEngine>,
}

/// Starts the relay server.
///
/// Binds to the configured address and serves until the process is
/// terminated.
///
/// # Errors
///
/// Returns an error if configuration validation, client construction,
/// or binding fails.
pub async fn run_server(config: &RelayConfig) -> anyhow::Result<()> {
    config.validate()?;

    let state = AppState {
        genai: Arc::new(GenAiClient::new(config)?),
        prompt: Arc::new(PromptEngine::new()?),
        config: Arc::new(config.clone()),
    };

    let bind_addr = config.bind.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Relay listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

/// Builds the router with all routes and the CORS layer.
fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/generate", post(handle_generate))
        .route("/models", get(handle_list_models))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

/// JSON error response body for internal errors.
#[derive(Serialize)]
struct ErrorBody {
    /// Human-readable error message.
    message: String,

    /// Full error chain.
    stack: String,
}

/// Internal error type that converts into an HTTP response.
enum AppError {
    /// 400 with a plain-text body.
    BadRequest(String),
    /// 500 with a JSON `{message, stack}` body.
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Internal(err) => {
                error!("Relay error: {:#}", err);
                let body = ErrorBody {
                    message: err.to_string(),
                    stack: format!("{err:?}"),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

/// Reads the API key from the configured environment variable.
fn read_api_key(config: &RelayConfig) -> Result<String, AppError> {
    std::env::var(&config.api_key_env).map_err(|_| {
        AppError::Internal(anyhow::anyhow!(
            "The generation API key is not configured ({} is unset)",
            config.api_key_env
        ))
    })
}

// ============ POST /generate ============

/// JSON request body for `POST /generate`.
#[derive(Deserialize)]
struct GenerateRequest {
    /// The caller's natural-language request.
    #[serde(default)]
    prompt: Option<String>,
}

/// JSON response body for `POST /generate`.
#[derive(Serialize)]
struct GenerateResponse {
    /// The generated component code, verbatim from the model.
    code: String,
}

/// Handler for `POST /generate`.
///
/// Reads the knowledge base from disk, renders the instruction template
/// around the caller's prompt, and forwards it upstream once. Returns
/// `400` when the prompt is missing or empty, `500` for configuration
/// and upstream failures.
async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = match request.prompt.as_deref() {
        Some(prompt) if !prompt.trim().is_empty() => prompt,
        _ => return Err(AppError::BadRequest("Missing prompt in request".to_string())),
    };

    let api_key = read_api_key(&state.config)?;

    let knowledge_base = tokio::fs::read_to_string(&state.config.kb_path)
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Cannot read knowledge base at {}: {}",
                state.config.kb_path.display(),
                e
            ))
        })?;

    let instruction = state
        .prompt
        .render(&knowledge_base, prompt)
        .map_err(|e| AppError::Internal(e.into()))?;

    let code = state
        .genai
        .generate(&api_key, &instruction)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(GenerateResponse { code }))
}

// ============ GET /models ============

/// Handler for `GET /models`.
///
/// Relays the upstream model listing, filtered to models that support
/// content generation, as pretty-printed JSON.
async fn handle_list_models(State(state): State<AppState>) -> Result<Response, AppError> {
    let api_key = read_api_key(&state.config)?;

    let models = state
        .genai
        .list_models(&api_key)
        .await
        .map_err(AppError::Internal)?;

    let body =
        serde_json::to_string_pretty(&models).map_err(|e| AppError::Internal(e.into()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::net::SocketAddr;

    /// Spawns the relay on an ephemeral port with a key env var that is
    /// guaranteed unset, and returns its address.
    async fn spawn_relay(kb_path: &std::path::Path) -> SocketAddr {
        let config = RelayConfig {
            bind: "127.0.0.1:0".to_string(),
            kb_path: kb_path.to_path_buf(),
            api_key_env: "UIKB_TEST_UNSET_KEY".to_string(),
            ..RelayConfig::default()
        };

        let state = AppState {
            genai: Arc::new(GenAiClient::new(&config).unwrap()),
            prompt: Arc::new(PromptEngine::new().unwrap()),
            config: Arc::new(config),
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.unwrap();
        });

        addr
    }

    async fn spawn_default_relay() -> (SocketAddr, assert_fs::TempDir) {
        let temp = assert_fs::TempDir::new().unwrap();
        let kb = temp.child("knowledge_base.json");
        kb.write_str("[]").unwrap();
        let addr = spawn_relay(kb.path()).await;
        (addr, temp)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (addr, _temp) = spawn_default_relay().await;

        let response = reqwest::get(format!("http://{addr}/health")).await.unwrap();
        assert_eq!(response.status(), 200);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_generate_rejects_non_post() {
        let (addr, _temp) = spawn_default_relay().await;

        let response = reqwest::get(format!("http://{addr}/generate")).await.unwrap();
        assert_eq!(response.status(), 405);
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_prompt() {
        let (addr, _temp) = spawn_default_relay().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{addr}/generate"))
            .json(&serde_json::json!({}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        assert_eq!(response.text().await.unwrap(), "Missing prompt in request");
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_prompt() {
        let (addr, _temp) = spawn_default_relay().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{addr}/generate"))
            .json(&serde_json::json!({ "prompt": "   " }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn test_generate_without_api_key_is_internal_error() {
        let (addr, _temp) = spawn_default_relay().await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{addr}/generate"))
            .json(&serde_json::json!({ "prompt": "a warning badge" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 500);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("not configured"));
        assert!(body["stack"].is_string());
    }

    #[tokio::test]
    async fn test_models_without_api_key_is_internal_error() {
        let (addr, _temp) = spawn_default_relay().await;

        let response = reqwest::get(format!("http://{addr}/models")).await.unwrap();
        assert_eq!(response.status(), 500);
    }
}
