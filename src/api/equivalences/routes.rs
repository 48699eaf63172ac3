use crate::api::equivalences::handlers::list_handler;
use crate::api::models::AppState;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/equivalencias", get(list_handler))
}
