use axum::{extract::State, Json};
use tracing::instrument;

use crate::{services::assignments::Candidate, ApiResponse, ApiResult, AppState};

/// Employees selectable for any of the five assignment slots.
#[instrument(skip(state))]
pub async fn list_candidates(State(state): State<AppState>) -> ApiResult<Vec<Candidate>> {
    let candidates = state.services.assignments.candidates().await?;
    Ok(Json(ApiResponse::success(candidates)))
}
