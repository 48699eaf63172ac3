pub mod ai_search;
pub mod equivalences;
pub mod models;
pub mod perfumes;

// Re-exports
pub use models::*;

use axum::{Json, Router, extract::State, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub async fn root_handler() -> &'static str {
    "Backend server is running!"
}

// Health handler (simple, keep here)
pub async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let catalog_up = state.search.catalog().is_healthy().await;
    Json(models::HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog: if catalog_up { "up" } else { "down" }.to_string(),
        ai_enabled: state.search.ai_enabled(),
    })
}

/// Full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .merge(perfumes::routes())
        .merge(ai_search::routes())
        .merge(equivalences::routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
