use crate::api::models::*;
use crate::search::SearchMode;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

/// AI-assisted search: classify the description, then fetch equivalences of matching products
pub async fn ai_search_handler(
    State(state): State<AppState>,
    request: Result<Json<AiSearchRequest>, JsonRejection>,
) -> Result<Json<AiSearchResponse>, AppError> {
    let Json(request) = request?;

    // Validate
    let description = request.validate().map_err(AppError::BadRequest)?.to_string();

    info!(chars = description.chars().count(), "Processing AI search request");

    let outcome = state
        .search
        .run(SearchMode::Assisted {
            description: description.clone(),
        })
        .await?;

    info!(
        terms = outcome.terms.len(),
        matched = outcome.records.len(),
        "AI search request complete"
    );

    Ok(Json(AiSearchResponse {
        user_input: description,
        ai_analysis: outcome.analysis.unwrap_or_default(),
        matched_equivalencias: outcome.records,
        generated_filter: outcome.filter.unwrap_or_default(),
    }))
}
