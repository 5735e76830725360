use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    entities::{order::Model as OrderModel, order_status_history::Model as HistoryModel},
    errors::ServiceError,
    services::{
        order_status::{AdvanceStatusRequest, OrderProgress},
        orders::{CreateOrderRequest, UpdateOrderRequest},
    },
    ApiResponse, ApiResult, AppState, ListQuery, PaginatedResponse,
};

/// An order with the values derived from its stage, dates and payments.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: OrderModel,
    pub status_label: String,
    /// `None` when the stored stage code is not recognised.
    pub progress_percentage: Option<u8>,
    pub is_overdue: bool,
    pub days_remaining: i64,
    pub remaining_amount: Decimal,
}

impl OrderResponse {
    pub fn new(order: OrderModel, today: NaiveDate) -> Self {
        Self {
            status_label: order.status_display(),
            progress_percentage: order.progress_percentage().ok(),
            is_overdue: order.is_overdue(today),
            days_remaining: order.days_remaining(today),
            remaining_amount: order.remaining_amount(),
            order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub order: OrderResponse,
    pub entry: HistoryModel,
}

/// Values a new-order form starts from.
#[derive(Debug, Serialize)]
pub struct OrderDefaultsResponse {
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub advance_amount: Decimal,
    pub duration_days: i64,
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[instrument(skip(state, request))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ServiceError> {
    let defaults = state.services.settings.order_defaults().await?;
    let today = today();
    let order = state
        .services
        .orders
        .create_order(request, &defaults, today)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(OrderResponse::new(order, today))),
    ))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<PaginatedResponse<OrderResponse>> {
    let per_page = query.limit.unwrap_or(state.config.api_default_page_size);
    let listed = state.services.orders.list_orders(query.page, per_page).await?;
    let today = today();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        listed
            .orders
            .into_iter()
            .map(|order| OrderResponse::new(order, today))
            .collect(),
        listed.total,
        listed.page,
        listed.per_page,
    ))))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(OrderResponse::new(order, today()))))
}

#[instrument(skip(state, request))]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> ApiResult<OrderResponse> {
    let order = state.services.orders.update_order(id, request).await?;
    Ok(Json(ApiResponse::success(OrderResponse::new(order, today()))))
}

#[instrument(skip(state))]
pub async fn order_defaults(State(state): State<AppState>) -> ApiResult<OrderDefaultsResponse> {
    let defaults = state.services.settings.order_defaults().await?;
    let today = today();
    Ok(Json(ApiResponse::success(OrderDefaultsResponse {
        start_date: defaults.start_date(today),
        due_date: defaults.due_date(today),
        total_amount: defaults.total_amount,
        advance_amount: Decimal::ZERO,
        duration_days: defaults.duration_days,
    })))
}

#[instrument(skip(state, request))]
pub async fn advance_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AdvanceStatusRequest>,
) -> ApiResult<StatusChangeResponse> {
    let (order, entry) = state.services.order_status.advance_to(id, request).await?;
    Ok(Json(ApiResponse::success(StatusChangeResponse {
        order: OrderResponse::new(order, today()),
        entry,
    })))
}

#[instrument(skip(state))]
pub async fn status_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<HistoryModel>> {
    state.services.orders.get_order(id).await?;
    let history = state.services.order_status.status_history(id).await?;
    Ok(Json(ApiResponse::success(history)))
}

#[instrument(skip(state))]
pub async fn order_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<OrderProgress> {
    let progress = state.services.order_status.progress(id, today()).await?;
    Ok(Json(ApiResponse::success(progress)))
}
