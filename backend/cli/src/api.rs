use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use kokoro_channels::{parse_events, verify_signature, SIGNATURE_HEADER};
use kokoro_core::ConversationLog;
use kokoro_logging::redact_sensitive_data;
use kokoro_memory::ConversationStore;
use kokoro_routing::MessageRouter;

/// Shared application state for API handlers.
pub struct AppState {
    pub router: MessageRouter,
    pub store: Arc<dyn ConversationStore>,
    pub channel_secret: String,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/callback", post(callback))
        .route("/history", get(get_history).delete(delete_history))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "kokoro",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// LINE webhook. Events are routed before responding so the reply token
/// is still fresh when the reply goes out.
async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    debug!(
        body = %redact_sensitive_data(&String::from_utf8_lossy(&body)),
        "Request body"
    );

    if let Err(e) = verify_signature(&state.channel_secret, &body, signature) {
        warn!(error = %e, "[LINE] Rejecting webhook");
        return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
    }

    let events = match parse_events(&body) {
        Ok(events) => events,
        Err(e) => {
            error!(error = %e, "[LINE] Failed to parse webhook body");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    for event in &events {
        let outcome = state.router.route(event).await;
        debug!(outcome = ?outcome, "Event routed");
    }

    (StatusCode::OK, "OK").into_response()
}

/// Return the whole conversation log.
async fn get_history(State(state): State<Arc<AppState>>) -> Json<ConversationLog> {
    Json(state.store.load().await)
}

/// Clear the conversation log.
async fn delete_history(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.store.clear().await {
        Ok(()) => {
            info!("History cleared");
            (
                StatusCode::OK,
                Json(json!({ "status": "success", "message": "All history deleted." })),
            )
        }
        Err(e) => {
            error!(error = %e, "Failed to clear history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "Failed to delete history." })),
            )
        }
    }
}
