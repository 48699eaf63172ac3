use crate::api::models::AppState;
use crate::api::perfumes::handlers::search_handler;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/perfumes", get(search_handler))
}
