use crate::api::models::*;
use crate::search::{Refinement, split_terms};
use crate::storage::Equivalence;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::info;

/// Equivalences by parent ids (`perfumeIds`) or by matching terms (`search`)
pub async fn list_handler(
    State(state): State<AppState>,
    params: Result<Query<EquivalenceParams>, QueryRejection>,
    refinement: Result<Query<Refinement>, QueryRejection>,
) -> Result<Json<Vec<Equivalence>>, AppError> {
    let Query(params) = params?;
    let Query(refinement) = refinement?;

    let records = if let Some(raw_ids) = params.perfume_ids.as_deref() {
        let ids = split_terms(raw_ids);
        info!(ids = ids.len(), "Fetching equivalences by product");
        state.search.equivalences_for_products(&ids).await
    } else if let Some(raw_terms) = params.search.as_deref() {
        let terms = split_terms(raw_terms);
        info!(terms = ?terms, "Fetching equivalences by terms");
        state.search.equivalences_matching(&terms, params.join).await
    } else {
        return Err(AppError::BadRequest(
            "perfumeIds or search query parameter is required".to_string(),
        ));
    };

    Ok(Json(refinement.apply(records)))
}
