use axum::{body::Bytes, extract::State, http::StatusCode, response::Json, routing::post, Router};
use shared::{AskRequest, AskResponse, ErrorBody};
use tracing::warn;

use crate::application::ports::CompletionError;
use crate::infrastructure::AppState;

pub fn ask_routes() -> Router<AppState> {
    Router::new().route("/api/ask", post(ask))
}

async fn ask(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AskResponse>, (StatusCode, Json<ErrorBody>)> {
    let payload: AskRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("[API] Undecodable ask body: {}", e);
        (StatusCode::BAD_REQUEST, Json(ErrorBody::new(format!("Invalid JSON body: {}", e))))
    })?;

    if payload.message.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("message must not be empty")),
        ));
    }

    state.ask.handle(payload).await.map(Json).map_err(|e| {
        warn!("[API] Completion failed: {}", e);
        match e {
            CompletionError::Upstream { status, body } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                Json(ErrorBody::new(body)),
            ),
            other => (StatusCode::BAD_GATEWAY, Json(ErrorBody::new(other.to_string()))),
        }
    })
}
