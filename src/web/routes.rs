use super::{settings, setup, AppState};
use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create the web router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/settings", get(settings::list_settings))
        .route("/api/settings/public", get(settings::public_settings))
        .route(
            "/api/settings/{category}",
            get(settings::get_category)
                .put(settings::put_category)
                .delete(settings::delete_category),
        )
        .route("/api/setup", get(setup::get_status))
        .route("/api/setup/step", post(setup::post_step))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
