//! HTTP API gateway for Confab.
//!
//! Exposes the chat service over Axum: a greeting route for the API root,
//! the `/chat` endpoint, and a `/health` check — behind a CORS allow-list,
//! a request body size limit, and HTTP trace logging.
//!
//! The wire contract is small and strict:
//! - `POST /chat` with `{"message": "..."}` returns `{"response": "..."}`
//! - any request without a string `message` gets a 400 with a fixed error
//!   body, no matter how the input was malformed
//! - a failed model call gets a 500 carrying the error and, unless
//!   disabled, the full cause chain under `traceback`

use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use confab_agent::ChatOrchestrator;
use confab_config::{AppConfig, ServerConfig};
use confab_core::{ConfigError, ValidationError};
use confab_tools::ToolCatalog;

/// Greeting served at the API root.
const GREETING: &str = "Welcome to the Chatbot API! React frontend should handle the UI.";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: ChatOrchestrator,
    /// Include the error cause chain in 500 bodies
    pub expose_error_detail: bool,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes and layers.
///
/// Fails only when a configured CORS origin is not a valid header value.
pub fn build_router(state: SharedState, server: &ServerConfig) -> Result<Router, ConfigError> {
    let cors = cors_layer(&server.allowed_origins)?;

    Ok(Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http()))
}

/// CORS allow-list from configuration. Browsers from any other origin get
/// no `access-control-allow-origin` and stop there.
fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        let value = origin
            .parse::<HeaderValue>()
            .map_err(|_| ConfigError::Invalid(format!("invalid CORS origin: {origin}")))?;
        allowed.push(value);
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600)))
}

/// Start the gateway HTTP server.
///
/// Builds the tool catalog, model backend, and orchestrator once, then
/// serves until the process is stopped.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_addr();

    let catalog = ToolCatalog::load(&config.tools_path)?;
    let model = confab_providers::build_from_config(&config)?;
    let orchestrator = ChatOrchestrator::from_config(model, &catalog, &config);

    let state = Arc::new(GatewayState {
        orchestrator,
        expose_error_detail: config.server.expose_error_detail,
    });
    let app = build_router(state, &config.server)?;

    info!(addr = %addr, model = %config.model, tools = catalog.len(), "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct GreetingResponse {
    message: &'static str,
}

async fn root_handler() -> Json<GreetingResponse> {
    Json(GreetingResponse { message: GREETING })
}

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

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    traceback: Option<String>,
}

async fn chat_handler(
    State(state): State<SharedState>,
    body: axum::body::Bytes,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request_id = uuid::Uuid::new_v4();

    let message = match parse_chat_message(&body) {
        Ok(message) => message,
        Err(validation) => {
            warn!(%request_id, "Rejected chat request: no usable 'message' field");
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: validation.to_string(),
                    traceback: None,
                }),
            ));
        }
    };

    info!(%request_id, chars = message.len(), "Chat request received");

    match state.orchestrator.handle_query(&message).await {
        Ok(response) => Ok(Json(ChatResponse { response })),
        Err(e) => {
            error!(%request_id, error = %e.chain(), "Chat request failed");
            let traceback = state.expose_error_detail.then(|| e.chain());
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                    traceback,
                }),
            ))
        }
    }
}

/// Extract the chat message from a raw request body.
///
/// Parsed by hand rather than through a typed extractor so that *every*
/// malformed shape — no body, invalid JSON, missing field, wrong type —
/// yields the same fixed 400 body.
fn parse_chat_message(body: &[u8]) -> Result<String, ValidationError> {
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ValidationError::MissingMessage)?;
    match payload.get("message") {
        Some(serde_json::Value::String(message)) => Ok(message.clone()),
        _ => Err(ValidationError::MissingMessage),
    }
}
