// routes.rs
use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{construction::construction_handler, requests::requests_handler},
    AppState,
};

async fn health_check(Extension(app_state): Extension<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running",
        "store": app_state.project_service.backend()
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let construction_routes = Router::new()
        .merge(construction_handler())
        .merge(requests_handler());

    let api_route = Router::new()
        .nest("/construction", construction_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state.clone()));

    Router::new()
        .route("/health", get(health_check))
        .layer(Extension(app_state))
        .nest("/api", api_route)
}
