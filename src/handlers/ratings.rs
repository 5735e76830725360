use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::{employee_rating::Model as EmployeeRatingModel, order_rating::Model as OrderRatingModel},
    errors::ServiceError,
    services::ratings::{EmployeeRatingRequest, OrderRatingRequest},
    ApiResponse, ApiResult, AppState,
};

#[instrument(skip(state, request))]
pub async fn rate_employee(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<EmployeeRatingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EmployeeRatingModel>>), ServiceError> {
    let rating = state.services.ratings.rate_employee(order_id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rating))))
}

#[instrument(skip(state))]
pub async fn list_employee_ratings(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<Vec<EmployeeRatingModel>> {
    state.services.orders.get_order(order_id).await?;
    let ratings = state.services.ratings.list_employee_ratings(order_id).await?;
    Ok(Json(ApiResponse::success(ratings)))
}

#[instrument(skip(state, request))]
pub async fn rate_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<OrderRatingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderRatingModel>>), ServiceError> {
    let rating = state.services.ratings.rate_order(order_id, request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rating))))
}
