use crate::api::models::*;
use crate::search::{Refinement, SearchMode};
use crate::storage::Equivalence;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::info;

/// Plain-text search: direct and joined equivalence matches, merged
pub async fn search_handler(
    State(state): State<AppState>,
    params: Result<Query<PerfumeSearchParams>, QueryRejection>,
    refinement: Result<Query<Refinement>, QueryRejection>,
) -> Result<Json<Vec<Equivalence>>, AppError> {
    let Query(params) = params?;
    let Query(refinement) = refinement?;

    // Validate
    let query = params.validate().map_err(AppError::BadRequest)?;

    info!(query = %query, join = ?params.join, "Searching perfumes");

    let outcome = state
        .search
        .run(SearchMode::Plain {
            query: query.to_string(),
            join: params.join,
        })
        .await?;

    let found = outcome.records.len();
    let records = refinement.apply(outcome.records);

    info!(found, returned = records.len(), "Search complete");

    Ok(Json(records))
}
