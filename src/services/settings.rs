use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::OnConflict, DatabaseConnection, EntityTrait, Set,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    entities::system_setting::{self, ActiveModel as SettingActiveModel, Entity as SettingEntity},
    errors::{AmountField, ServiceError},
    services::payments::{parse_amount, AmountInput},
};

pub const DEFAULT_ORDER_DURATION_KEY: &str = "default_order_duration";
pub const DEFAULT_ORDER_AMOUNT_KEY: &str = "default_order_amount";

/// Days between start and due date when the setting is missing or unusable.
pub const FALLBACK_ORDER_DURATION_DAYS: i64 = 14;

/// Total amount offered for new orders when the setting is missing or unusable.
pub const FALLBACK_ORDER_AMOUNT: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Longest order duration a setting may configure, about ten years.
pub const MAX_ORDER_DURATION_DAYS: i64 = 3_660;

/// Values pre-filled on a new order, resolved once from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderDefaults {
    pub duration_days: i64,
    pub total_amount: Decimal,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            duration_days: FALLBACK_ORDER_DURATION_DAYS,
            total_amount: FALLBACK_ORDER_AMOUNT,
        }
    }
}

impl OrderDefaults {
    /// Resolves defaults from raw setting values. Missing, unparseable or
    /// negative values fall back to the built-in defaults, as do durations
    /// beyond [`MAX_ORDER_DURATION_DAYS`] and amounts the order form itself
    /// would reject.
    pub fn from_settings(duration: Option<&str>, amount: Option<&str>) -> Self {
        let duration_days = duration
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .filter(|days| (0..=MAX_ORDER_DURATION_DAYS).contains(days))
            .unwrap_or_else(|| {
                if duration.is_some() {
                    warn!(value = ?duration, "Ignoring invalid {}", DEFAULT_ORDER_DURATION_KEY);
                }
                FALLBACK_ORDER_DURATION_DAYS
            });

        let total_amount = amount
            .and_then(|raw| {
                parse_amount(AmountField::TotalAmount, &AmountInput::Text(raw.to_string())).ok()
            })
            .filter(|value| !value.is_sign_negative())
            .unwrap_or_else(|| {
                if amount.is_some() {
                    warn!(value = ?amount, "Ignoring invalid {}", DEFAULT_ORDER_AMOUNT_KEY);
                }
                FALLBACK_ORDER_AMOUNT
            });

        Self {
            duration_days,
            total_amount,
        }
    }

    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today
    }

    /// `today` plus the configured duration. A duration that leaves the
    /// calendar range falls back to [`FALLBACK_ORDER_DURATION_DAYS`].
    pub fn due_date(&self, today: NaiveDate) -> NaiveDate {
        Duration::try_days(self.duration_days)
            .and_then(|span| today.checked_add_signed(span))
            .or_else(|| {
                warn!(duration_days = self.duration_days, "Order duration out of range");
                today.checked_add_signed(Duration::days(FALLBACK_ORDER_DURATION_DAYS))
            })
            .unwrap_or(today)
    }
}

/// Key/value settings stored in `system_settings`.
#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
}

impl SettingsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, ServiceError> {
        let setting = SettingEntity::find_by_id(key.to_string())
            .one(&*self.db)
            .await?;
        Ok(setting.map(|s| s.value))
    }

    pub async fn get_setting_or(&self, key: &str, default: &str) -> Result<String, ServiceError> {
        Ok(self
            .get_setting(key)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Inserts or replaces a setting.
    #[instrument(skip(self, value))]
    pub async fn set_setting(
        &self,
        key: &str,
        value: &str,
        description: Option<String>,
    ) -> Result<system_setting::Model, ServiceError> {
        if key.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Setting key cannot be empty".to_string()));
        }

        let model = SettingActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            description: Set(description),
            updated_at: Set(Utc::now()),
        };
        SettingEntity::insert(model)
            .on_conflict(
                OnConflict::column(system_setting::Column::Key)
                    .update_columns([
                        system_setting::Column::Value,
                        system_setting::Column::Description,
                        system_setting::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&*self.db)
            .await?;

        info!(key, "Setting updated");
        SettingEntity::find_by_id(key.to_string())
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::InternalError(format!("Setting {} vanished after upsert", key)))
    }

    /// Reads both order-default settings and resolves them.
    #[instrument(skip(self))]
    pub async fn order_defaults(&self) -> Result<OrderDefaults, ServiceError> {
        let duration = self.get_setting(DEFAULT_ORDER_DURATION_KEY).await?;
        let amount = self.get_setting(DEFAULT_ORDER_AMOUNT_KEY).await?;
        Ok(OrderDefaults::from_settings(
            duration.as_deref(),
            amount.as_deref(),
        ))
    }
}
