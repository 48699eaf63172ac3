use crate::api::ai_search::handlers::ai_search_handler;
use crate::api::models::AppState;
use axum::{Router, routing::post};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/perfumes/ai-search", post(ai_search_handler))
}
