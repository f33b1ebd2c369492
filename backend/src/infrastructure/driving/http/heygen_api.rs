use axum::{body::Bytes, extract::State, http::StatusCode, response::Json, routing::post, Router};
use serde_json::Value;
use shared::{ControlPlaneError, ErrorBody};
use tracing::warn;

use crate::application::gateway::{ProxyGateway, ProxyResponse};
use crate::infrastructure::AppState;

pub fn heygen_routes() -> Router<AppState> {
    Router::new().route("/api/heygen", post(dispatch))
}

async fn dispatch(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProxyResponse>, (StatusCode, Json<ErrorBody>)> {
    // Callers do not always send a JSON content type, so the body is decoded here
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("[API] Undecodable control-plane body: {}", e);
        (StatusCode::BAD_REQUEST, Json(ErrorBody::new(format!("Invalid JSON body: {}", e))))
    })?;

    let request = ProxyGateway::parse(payload).map_err(|rejection| {
        warn!("[API] Rejected control-plane request: {}", rejection);
        (StatusCode::BAD_REQUEST, Json(ErrorBody::new(rejection.to_string())))
    })?;

    match state.gateway.dispatch(request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            warn!(operation = %e.operation(), status = ?e.http_status(), "[API] Control-plane call failed");
            Err((
                error_status(&e),
                Json(ErrorBody::for_operation(e.body(), e.operation())),
            ))
        }
    }
}

/// Relay the upstream status when it is an error status, 502 otherwise
fn error_status(err: &ControlPlaneError) -> StatusCode {
    match err {
        ControlPlaneError::Auth { .. } => StatusCode::UNAUTHORIZED,
        ControlPlaneError::Provider {
            http_status: Some(status),
            ..
        } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error() || s.is_server_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        ControlPlaneError::Provider { http_status: None, .. } => StatusCode::BAD_GATEWAY,
    }
}
