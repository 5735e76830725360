use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff roles. The stored code doubles as the sort key for assignment lists.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeType {
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "cutter")]
    Cutter,
    #[sea_orm(string_value = "tailor")]
    Tailor,
    #[sea_orm(string_value = "seamstress")]
    Seamstress,
    #[sea_orm(string_value = "trouser_maker")]
    TrouserMaker,
    #[sea_orm(string_value = "shirt_cutter")]
    ShirtCutter,
    #[sea_orm(string_value = "shirt_sewer")]
    ShirtSewer,
}

impl EmployeeType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::Cutter => "Cutter",
            Self::Tailor => "Tailor",
            Self::Seamstress => "Seamstress",
            Self::TrouserMaker => "Trouser maker",
            Self::ShirtCutter => "Shirt cutter",
            Self::ShirtSewer => "Shirt sewer",
        }
    }
}

/// Shop staff, maintained by the employee directory.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub employee_type: EmployeeType,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employee_rating::Entity")]
    Ratings,
}

impl Related<super::employee_rating::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ratings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
