use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        order::Entity as OrderEntity,
        process_step::{self, ActiveModel as StepActiveModel, Entity as StepEntity, Model as StepModel, ProcessStepStatus},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProcessStep {
    #[validate(length(min = 1, max = 50, message = "Step type must be between 1 and 50 characters"))]
    pub step_type: String,
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Free-form production tasks kept alongside an order's stages.
#[derive(Clone)]
pub struct ProcessStepService {
    db: Arc<DatabaseConnection>,
}

impl ProcessStepService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, step), fields(order_id = %order_id))]
    pub async fn add_step(&self, order_id: Uuid, step: NewProcessStep) -> Result<StepModel, ServiceError> {
        step.validate()?;

        let db = &*self.db;
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let now = Utc::now();
        let saved = StepActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            step_type: Set(step.step_type),
            title: Set(step.title),
            description: Set(step.description),
            status: Set(ProcessStepStatus::Pending),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert process step");
            ServiceError::DatabaseError(e)
        })?;

        info!(step_id = %saved.id, "Process step added");
        Ok(saved)
    }

    /// Steps for an order in the order they were added.
    #[instrument(skip(self))]
    pub async fn list_steps(&self, order_id: Uuid) -> Result<Vec<StepModel>, ServiceError> {
        let steps = StepEntity::find()
            .filter(process_step::Column::OrderId.eq(order_id))
            .order_by_asc(process_step::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(steps)
    }

    /// Moving into `completed` stamps `completed_at`; moving out clears it.
    #[instrument(skip(self))]
    pub async fn update_step_status(
        &self,
        order_id: Uuid,
        step_id: Uuid,
        status: ProcessStepStatus,
    ) -> Result<StepModel, ServiceError> {
        let db = &*self.db;
        let step = StepEntity::find_by_id(step_id)
            .filter(process_step::Column::OrderId.eq(order_id))
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Process step {} not found on order {}", step_id, order_id))
            })?;

        let previous = step.status;
        let now = Utc::now();
        let completed_at = match (previous, status) {
            (ProcessStepStatus::Completed, ProcessStepStatus::Completed) => step.completed_at,
            (_, ProcessStepStatus::Completed) => Some(now),
            _ => None,
        };

        let mut active: StepActiveModel = step.into();
        active.status = Set(status);
        active.completed_at = Set(completed_at);
        active.updated_at = Set(now);

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, "Failed to update process step");
            ServiceError::DatabaseError(e)
        })?;

        info!(from = %previous, to = %updated.status, "Process step status changed");
        Ok(updated)
    }
}
