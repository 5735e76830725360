use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::process_step::{Model as StepModel, ProcessStepStatus},
    errors::ServiceError,
    services::process_steps::NewProcessStep,
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize)]
pub struct StepStatusRequest {
    pub status: ProcessStepStatus,
}

#[instrument(skip(state, request))]
pub async fn add_step(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<NewProcessStep>,
) -> Result<(StatusCode, Json<ApiResponse<StepModel>>), ServiceError> {
    let step = state.services.process_steps.add_step(order_id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(step))))
}

#[instrument(skip(state))]
pub async fn list_steps(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Vec<StepModel>> {
    state.services.orders.get_order(order_id).await?;
    let steps = state.services.process_steps.list_steps(order_id).await?;
    Ok(Json(ApiResponse::success(steps)))
}

#[instrument(skip(state, request))]
pub async fn update_step_status(
    State(state): State<AppState>,
    Path((order_id, step_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<StepStatusRequest>,
) -> ApiResult<StepModel> {
    let step = state
        .services
        .process_steps
        .update_step_status(order_id, step_id, request.status)
        .await?;
    Ok(Json(ApiResponse::success(step)))
}
