use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{error::DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::order::StaffSlot;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Form field the error is attached to, when it is field-scoped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

/// Amount fields accepted on the order form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AmountField {
    TotalAmount,
    AdvanceAmount,
}

/// Business-rule failures raised while validating or evaluating an order.
///
/// All of these are user-facing: the form layer shows the message next to
/// [`OrderValidationError::field`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum OrderValidationError {
    #[error("{field}: enter a valid amount")]
    InvalidAmount { field: AmountField },

    #[error("advance_amount: advance amount cannot be less than 0")]
    NegativeAdvance,

    #[error("advance_amount: advance amount cannot exceed the total amount")]
    AdvanceExceedsTotal,

    #[error("unknown order status: {0}")]
    UnknownStatus(String),

    #[error("{slot}: employee {employee_id} is not an eligible assignee")]
    IneligibleAssignee { slot: StaffSlot, employee_id: Uuid },

    #[error("{field}: rating must be between 1 and 5, got {value}")]
    InvalidRating { field: &'static str, value: i32 },
}

impl OrderValidationError {
    /// Name of the form field this error belongs to, if any.
    pub fn field(&self) -> Option<String> {
        match self {
            Self::InvalidAmount { field } => Some(field.to_string()),
            Self::NegativeAdvance | Self::AdvanceExceedsTotal => {
                Some(AmountField::AdvanceAmount.to_string())
            }
            Self::UnknownStatus(_) => Some("status".to_string()),
            Self::IneligibleAssignee { slot, .. } => Some(slot.field_name().to_string()),
            Self::InvalidRating { field, .. } => Some((*field).to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    OrderValidation(#[from] OrderValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Concurrent modification: {0}")]
    ConcurrentModification(Uuid),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::OrderValidation(_) | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_) | Self::ConcurrentModification(_) => StatusCode::CONFLICT,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            Self::ConcurrentModification(id) => {
                format!("Order {} was modified concurrently; reload and retry", id)
            }
            _ => self.to_string(),
        }
    }

    /// Maps a failed insert. A unique-constraint violation becomes a
    /// `Conflict` carrying `conflict()`; anything else stays a database error.
    pub fn from_insert(err: DbErr, conflict: impl FnOnce() -> String) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Conflict(conflict()),
            _ => ServiceError::DatabaseError(err),
        }
    }

    /// Field the error is attached to, for form-level display.
    pub fn field(&self) -> Option<String> {
        match self {
            Self::OrderValidation(err) => err.field(),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            field: self.field(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(err)).into_response()
    }
}
