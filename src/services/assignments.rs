//! Staff selection for the five assignment slots on an order.

use std::sync::Arc;

use sea_orm::{ActiveEnum, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    entities::{
        employee::{self, EmployeeType, Entity as EmployeeEntity, Model as EmployeeModel},
        order::StaffSlot,
    },
    errors::{OrderValidationError, ServiceError},
};

/// An employee offered in the assignment drop-downs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    pub first_name: String,
    pub employee_type: EmployeeType,
    pub label: String,
}

impl From<&EmployeeModel> for Candidate {
    fn from(employee: &EmployeeModel) -> Self {
        Self {
            id: employee.id,
            first_name: employee.first_name.clone(),
            employee_type: employee.employee_type,
            label: candidate_label(employee),
        }
    }
}

pub fn candidate_label(employee: &EmployeeModel) -> String {
    format!(
        "{} ({})",
        employee.first_name,
        employee.employee_type.label()
    )
}

/// Active, non-manager employees ordered by role code, then first name.
///
/// Every slot shares this list, and one employee may fill several slots.
pub fn resolve_candidates<'a, I>(pool: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = &'a EmployeeModel>,
{
    let mut eligible: Vec<&EmployeeModel> = pool
        .into_iter()
        .filter(|e| e.is_active && e.employee_type != EmployeeType::Manager)
        .collect();
    eligible.sort_by(|a, b| {
        a.employee_type
            .to_value()
            .cmp(&b.employee_type.to_value())
            .then_with(|| a.first_name.cmp(&b.first_name))
    });
    eligible.into_iter().map(Candidate::from).collect()
}

/// Slot assignments submitted with an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct StaffAssignments {
    pub assigned_cutter_id: Option<Uuid>,
    pub assigned_tailor_id: Option<Uuid>,
    pub assigned_trouser_maker_id: Option<Uuid>,
    pub assigned_shirt_cutter_id: Option<Uuid>,
    pub assigned_shirt_sewer_id: Option<Uuid>,
}

impl StaffAssignments {
    pub fn get(&self, slot: StaffSlot) -> Option<Uuid> {
        match slot {
            StaffSlot::Cutter => self.assigned_cutter_id,
            StaffSlot::Tailor => self.assigned_tailor_id,
            StaffSlot::TrouserMaker => self.assigned_trouser_maker_id,
            StaffSlot::ShirtCutter => self.assigned_shirt_cutter_id,
            StaffSlot::ShirtSewer => self.assigned_shirt_sewer_id,
        }
    }

    /// Checks every filled slot against the candidate list.
    pub fn validate_against(&self, candidates: &[Candidate]) -> Result<(), OrderValidationError> {
        for slot in StaffSlot::ALL {
            if let Some(employee_id) = self.get(slot) {
                if !candidates.iter().any(|c| c.id == employee_id) {
                    return Err(OrderValidationError::IneligibleAssignee { slot, employee_id });
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AssignmentService {
    db: Arc<DatabaseConnection>,
}

impl AssignmentService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn candidates(&self) -> Result<Vec<Candidate>, ServiceError> {
        let active = EmployeeEntity::find()
            .filter(employee::Column::IsActive.eq(true))
            .all(&*self.db)
            .await?;
        let candidates = resolve_candidates(&active);
        debug!(count = candidates.len(), "Resolved assignment candidates");
        Ok(candidates)
    }
}
