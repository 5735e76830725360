use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::errors::OrderValidationError;
use crate::services::payments;

/// Production stages an order moves through, in workflow order.
///
/// Stored as its snake_case code in `orders.current_status`, so a row written
/// by another tool may hold a code that is not listed here; see
/// [`Model::status`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    OrderPlaced,
    MaterialArrived,
    CutterCutting,
    CustomerFirstFitting,
    TailorFirstCompletion,
    SeamstressSecondPrep,
    CustomerSecondFitting,
    TailorSecondCompletion,
    SeamstressFinished,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 9] = [
        OrderStatus::OrderPlaced,
        OrderStatus::MaterialArrived,
        OrderStatus::CutterCutting,
        OrderStatus::CustomerFirstFitting,
        OrderStatus::TailorFirstCompletion,
        OrderStatus::SeamstressSecondPrep,
        OrderStatus::CustomerSecondFitting,
        OrderStatus::TailorSecondCompletion,
        OrderStatus::SeamstressFinished,
    ];

    pub const INITIAL: OrderStatus = OrderStatus::OrderPlaced;
    pub const TERMINAL: OrderStatus = OrderStatus::SeamstressFinished;

    /// Parses a stored status code.
    pub fn from_code(code: &str) -> Result<Self, OrderValidationError> {
        Self::from_str(code).map_err(|_| OrderValidationError::UnknownStatus(code.to_string()))
    }

    pub fn code(&self) -> &str {
        self.as_ref()
    }

    /// Zero-based position in the workflow.
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    pub fn is_terminal(&self) -> bool {
        *self == Self::TERMINAL
    }

    /// Share of the workflow reached once this stage is current, rounded down.
    pub fn progress_percentage(&self) -> u8 {
        ((self.index() + 1) * 100 / Self::ALL.len()) as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OrderPlaced => "Order placed",
            Self::MaterialArrived => "Material arrived",
            Self::CutterCutting => "Cut by cutter",
            Self::CustomerFirstFitting => "Customer first fitting",
            Self::TailorFirstCompletion => "First fitting adjusted by tailor",
            Self::SeamstressSecondPrep => "Second fitting prepared by seamstress",
            Self::CustomerSecondFitting => "Customer second fitting",
            Self::TailorSecondCompletion => "Second fitting adjusted by tailor",
            Self::SeamstressFinished => "Finished by seamstress",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::INITIAL
    }
}

/// Garment kinds the shop takes orders for.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[sea_orm(string_value = "men_suit")]
    MenSuit,
    #[sea_orm(string_value = "women_suit")]
    WomenSuit,
    #[sea_orm(string_value = "wedding_dress")]
    WeddingDress,
    #[sea_orm(string_value = "formal_dress")]
    FormalDress,
    #[sea_orm(string_value = "casual_shirt")]
    CasualShirt,
    #[sea_orm(string_value = "trousers")]
    Trousers,
    #[sea_orm(string_value = "jacket")]
    Jacket,
    #[sea_orm(string_value = "vest")]
    Vest,
    #[sea_orm(string_value = "coat")]
    Coat,
    #[sea_orm(string_value = "repair")]
    Repair,
    #[sea_orm(string_value = "other")]
    Other,
}

/// The five staff-assignment slots on an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffSlot {
    Cutter,
    Tailor,
    TrouserMaker,
    ShirtCutter,
    ShirtSewer,
}

impl StaffSlot {
    pub const ALL: [StaffSlot; 5] = [
        StaffSlot::Cutter,
        StaffSlot::Tailor,
        StaffSlot::TrouserMaker,
        StaffSlot::ShirtCutter,
        StaffSlot::ShirtSewer,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Cutter => "assigned_cutter_id",
            Self::Tailor => "assigned_tailor_id",
            Self::TrouserMaker => "assigned_trouser_maker_id",
            Self::ShirtCutter => "assigned_shirt_cutter_id",
            Self::ShirtSewer => "assigned_shirt_sewer_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cutter => "Cutter",
            Self::Tailor => "Tailor",
            Self::TrouserMaker => "Trouser maker",
            Self::ShirtCutter => "Shirt cutter",
            Self::ShirtSewer => "Shirt sewer",
        }
    }
}

impl fmt::Display for StaffSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// The `orders` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    #[validate(length(
        min = 1,
        max = 20,
        message = "Order number must be between 1 and 20 characters"
    ))]
    pub order_number: String,

    pub customer_id: Uuid,
    pub item_type: ItemType,

    #[validate(length(max = 100, message = "Material code must be at most 100 characters"))]
    pub material_code: Option<String>,

    pub assigned_cutter_id: Option<Uuid>,
    pub assigned_tailor_id: Option<Uuid>,
    pub assigned_trouser_maker_id: Option<Uuid>,
    pub assigned_shirt_cutter_id: Option<Uuid>,
    pub assigned_shirt_sewer_id: Option<Uuid>,

    pub has_shirt: bool,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub advance_amount: Decimal,

    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub completed_date: Option<NaiveDate>,

    /// Stage code, see [`OrderStatus`].
    pub current_status: String,

    pub notes: Option<String>,
    pub is_rated: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::AssignedCutterId",
        to = "super::employee::Column::Id",
        on_delete = "SetNull"
    )]
    Cutter,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::AssignedTailorId",
        to = "super::employee::Column::Id",
        on_delete = "SetNull"
    )]
    Tailor,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::AssignedTrouserMakerId",
        to = "super::employee::Column::Id",
        on_delete = "SetNull"
    )]
    TrouserMaker,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::AssignedShirtCutterId",
        to = "super::employee::Column::Id",
        on_delete = "SetNull"
    )]
    ShirtCutter,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::AssignedShirtSewerId",
        to = "super::employee::Column::Id",
        on_delete = "SetNull"
    )]
    ShirtSewer,
    #[sea_orm(has_many = "super::order_status_history::Entity")]
    StatusHistory,
    #[sea_orm(has_many = "super::process_step::Entity")]
    ProcessSteps,
    #[sea_orm(has_many = "super::employee_rating::Entity")]
    EmployeeRatings,
    #[sea_orm(has_one = "super::order_rating::Entity")]
    Rating,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::process_step::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcessSteps.def()
    }
}

impl Related<super::employee_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeRatings.def()
    }
}

impl Related<super::order_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rating.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The current stage, or `UnknownStatus` if the stored code is not one of
    /// the nine workflow stages.
    pub fn status(&self) -> Result<OrderStatus, OrderValidationError> {
        OrderStatus::from_code(&self.current_status)
    }

    /// Human-readable label of the current stage; unknown codes are shown as-is.
    pub fn status_display(&self) -> String {
        self.status()
            .map(|s| s.label().to_string())
            .unwrap_or_else(|_| self.current_status.clone())
    }

    pub fn progress_percentage(&self) -> Result<u8, OrderValidationError> {
        self.status().map(|s| s.progress_percentage())
    }

    /// Due date has passed and the order has not reached the final stage.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.current_status != OrderStatus::TERMINAL.code()
    }

    /// Days until the due date; negative once it has passed.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    pub fn remaining_amount(&self) -> Decimal {
        payments::remaining_amount(self.total_amount, self.advance_amount)
    }

    /// Employee assigned to the given slot.
    pub fn assignee(&self, slot: StaffSlot) -> Option<Uuid> {
        match slot {
            StaffSlot::Cutter => self.assigned_cutter_id,
            StaffSlot::Tailor => self.assigned_tailor_id,
            StaffSlot::TrouserMaker => self.assigned_trouser_maker_id,
            StaffSlot::ShirtCutter => self.assigned_shirt_cutter_id,
            StaffSlot::ShirtSewer => self.assigned_shirt_sewer_id,
        }
    }
}
