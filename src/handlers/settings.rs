use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    entities::system_setting::Model as SettingModel,
    errors::ServiceError,
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: String,
}

#[instrument(skip(state))]
pub async fn get_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<SettingResponse> {
    let value = state
        .services
        .settings
        .get_setting(&key)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Setting {} not found", key)))?;
    Ok(Json(ApiResponse::success(SettingResponse { key, value })))
}

#[instrument(skip(state, request))]
pub async fn put_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(request): Json<SettingValue>,
) -> ApiResult<SettingModel> {
    let setting = state
        .services
        .settings
        .set_setting(&key, &request.value, request.description)
        .await?;
    Ok(Json(ApiResponse::success(setting)))
}
