pub mod ask_api;
pub mod heygen_api;

use axum::{
    http::{header, Method},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::infrastructure::AppState;

pub use ask_api::ask_routes;
pub use heygen_api::heygen_routes;

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_check))
        .merge(heygen_routes())
        .merge(ask_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
