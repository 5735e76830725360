use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        employee::Entity as EmployeeEntity,
        order::{self, Entity as OrderEntity, Model as OrderModel, OrderStatus},
        order_status_history::{
            self, ActiveModel as HistoryActiveModel, Entity as HistoryEntity,
            Model as HistoryModel,
        },
    },
    errors::ServiceError,
};

/// A request to move an order to a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: OrderStatus,
    /// Employee who completed the stage.
    pub completed_by: Option<Uuid>,
    pub notes: Option<String>,
    /// When set, the transition only applies if the order is still at this version.
    pub expected_version: Option<i32>,
}

impl AdvanceStatusRequest {
    pub fn new(status: OrderStatus) -> Self {
        Self {
            status,
            completed_by: None,
            notes: None,
            expected_version: None,
        }
    }
}

/// Who completed a stage, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCompletion {
    pub completed_by: Option<Uuid>,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<&HistoryModel> for StageCompletion {
    fn from(entry: &HistoryModel) -> Self {
        Self {
            completed_by: entry.completed_by,
            completed_at: entry.completed_at,
            notes: entry.notes.clone(),
        }
    }
}

/// One row of the stage checklist shown for an order.
#[derive(Debug, Clone, Serialize)]
pub struct StageProgress {
    pub status: OrderStatus,
    pub label: &'static str,
    pub completed: bool,
    pub completion: Option<StageCompletion>,
}

/// Builds the nine-stage checklist from an order's history, newest entries first.
pub fn stage_overview(history: &[HistoryModel]) -> Vec<StageProgress> {
    OrderStatus::ALL
        .iter()
        .map(|status| {
            let latest = history.iter().find(|entry| entry.status == status.code());
            StageProgress {
                status: *status,
                label: status.label(),
                completed: latest.is_some(),
                completion: latest.map(StageCompletion::from),
            }
        })
        .collect()
}

/// Drives orders through the production stages and keeps their history.
#[derive(Clone)]
pub struct OrderStatusService {
    db: Arc<DatabaseConnection>,
}

impl OrderStatusService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Moves an order to `request.status` and records a history entry.
    ///
    /// Any of the nine stages is accepted from any other, including the
    /// current one; each call appends exactly one entry. Reaching the final
    /// stage stamps `completed_date` if it is not already set.
    #[instrument(skip(self, request), fields(order_id = %order_id, new_status = %request.status))]
    pub async fn advance_to(
        &self,
        order_id: Uuid,
        request: AdvanceStatusRequest,
    ) -> Result<(OrderModel, HistoryModel), ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if let Some(expected) = request.expected_version {
            if order.version != expected {
                warn!(
                    expected,
                    actual = order.version,
                    "Rejecting status change on stale order version"
                );
                return Err(ServiceError::ConcurrentModification(order_id));
            }
        }

        if let Some(employee_id) = request.completed_by {
            EmployeeEntity::find_by_id(employee_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Employee {} not found", employee_id))
                })?;
        }

        let now = Utc::now();
        let mut update = OrderEntity::update_many()
            .col_expr(order::Column::CurrentStatus, Expr::value(request.status.code()))
            .col_expr(order::Column::UpdatedAt, Expr::value(now))
            .col_expr(
                order::Column::Version,
                Expr::col(order::Column::Version).add(1),
            )
            .filter(order::Column::Id.eq(order_id));

        if request.status.is_terminal() && order.completed_date.is_none() {
            update = update.col_expr(
                order::Column::CompletedDate,
                Expr::value(Some(now.date_naive())),
            );
        }
        if let Some(expected) = request.expected_version {
            update = update.filter(order::Column::Version.eq(expected));
        }

        let result = update.exec(&txn).await.map_err(|e| {
            error!("Failed to update order {} status: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ConcurrentModification(order_id));
        }

        let entry = HistoryActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            status: Set(request.status.code().to_string()),
            completed_by: Set(request.completed_by),
            completed_at: Set(now),
            notes: Set(request.notes),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!("Failed to record status history for order {}: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;

        let updated = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit transaction for order {}: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(
            "Order {} status changed from '{}' to '{}'",
            order_id, order.current_status, updated.current_status
        );

        Ok((updated, entry))
    }

    /// True once at least one history entry exists for the stage.
    #[instrument(skip(self))]
    pub async fn is_stage_completed(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<bool, ServiceError> {
        let count = HistoryEntity::find()
            .filter(order_status_history::Column::OrderId.eq(order_id))
            .filter(order_status_history::Column::Status.eq(status.code()))
            .count(&*self.db)
            .await?;
        Ok(count > 0)
    }

    /// Most recent completion record for the stage, if it was ever reached.
    #[instrument(skip(self))]
    pub async fn stage_completion_info(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<StageCompletion>, ServiceError> {
        let entry = HistoryEntity::find()
            .filter(order_status_history::Column::OrderId.eq(order_id))
            .filter(order_status_history::Column::Status.eq(status.code()))
            .order_by_desc(order_status_history::Column::CompletedAt)
            .one(&*self.db)
            .await?;
        Ok(entry.as_ref().map(StageCompletion::from))
    }

    /// Full history for an order, newest first.
    #[instrument(skip(self))]
    pub async fn status_history(&self, order_id: Uuid) -> Result<Vec<HistoryModel>, ServiceError> {
        let entries = HistoryEntity::find()
            .filter(order_status_history::Column::OrderId.eq(order_id))
            .order_by_desc(order_status_history::Column::CompletedAt)
            .all(&*self.db)
            .await?;
        Ok(entries)
    }

    /// Progress summary for an order as of `today`.
    #[instrument(skip(self))]
    pub async fn progress(
        &self,
        order_id: Uuid,
        today: NaiveDate,
    ) -> Result<OrderProgress, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        let history = self.status_history(order_id).await?;

        Ok(OrderProgress {
            order_id,
            current_status: order.current_status.clone(),
            status_label: order.status_display(),
            progress_percentage: order.progress_percentage()?,
            is_overdue: order.is_overdue(today),
            days_remaining: order.days_remaining(today),
            remaining_amount: order.remaining_amount(),
            stages: stage_overview(&history),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderProgress {
    pub order_id: Uuid,
    pub current_status: String,
    pub status_label: String,
    pub progress_percentage: u8,
    pub is_overdue: bool,
    pub days_remaining: i64,
    pub remaining_amount: rust_decimal::Decimal,
    pub stages: Vec<StageProgress>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_customer, seed_employee, seed_order, test_db};
    use crate::entities::employee::EmployeeType;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn every_call_appends_one_entry() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Bat-Erdene").await;
        let order = seed_order(&db, customer.id).await;
        let service = OrderStatusService::new(db.clone());

        service
            .advance_to(order.id, AdvanceStatusRequest::new(OrderStatus::MaterialArrived))
            .await
            .unwrap();
        let (updated, _) = service
            .advance_to(order.id, AdvanceStatusRequest::new(OrderStatus::MaterialArrived))
            .await
            .unwrap();

        assert_eq!(updated.current_status, "material_arrived");
        assert_eq!(updated.version, order.version + 2);
        assert_eq!(service.status_history(order.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn transitions_are_not_restricted_to_forward_moves() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Saraa").await;
        let order = seed_order(&db, customer.id).await;
        let service = OrderStatusService::new(db.clone());

        service
            .advance_to(order.id, AdvanceStatusRequest::new(OrderStatus::CustomerSecondFitting))
            .await
            .unwrap();
        let (updated, _) = service
            .advance_to(order.id, AdvanceStatusRequest::new(OrderStatus::CutterCutting))
            .await
            .unwrap();

        assert_eq!(updated.status().unwrap(), OrderStatus::CutterCutting);
        assert!(service
            .is_stage_completed(order.id, OrderStatus::CustomerSecondFitting)
            .await
            .unwrap());
        assert!(!service
            .is_stage_completed(order.id, OrderStatus::MaterialArrived)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn records_actor_and_notes() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Tuya").await;
        let cutter = seed_employee(&db, "Bold", EmployeeType::Cutter, true).await;
        let order = seed_order(&db, customer.id).await;
        let service = OrderStatusService::new(db.clone());

        let mut request = AdvanceStatusRequest::new(OrderStatus::CutterCutting);
        request.completed_by = Some(cutter.id);
        request.notes = Some("cut from the grey wool".to_string());
        service.advance_to(order.id, request).await.unwrap();

        let info = service
            .stage_completion_info(order.id, OrderStatus::CutterCutting)
            .await
            .unwrap()
            .expect("stage was completed");
        assert_eq!(info.completed_by, Some(cutter.id));
        assert_eq!(info.notes.as_deref(), Some("cut from the grey wool"));
        assert!(service
            .stage_completion_info(order.id, OrderStatus::CustomerFirstFitting)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn final_stage_sets_completed_date() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Oyun").await;
        let order = seed_order(&db, customer.id).await;
        let service = OrderStatusService::new(db.clone());

        let (finished, _) = service
            .advance_to(order.id, AdvanceStatusRequest::new(OrderStatus::SeamstressFinished))
            .await
            .unwrap();
        assert_eq!(finished.completed_date, Some(Utc::now().date_naive()));
        assert_eq!(finished.progress_percentage().unwrap(), 100);
    }

    #[tokio::test]
    async fn stale_version_is_rejected_without_side_effects() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Nomin").await;
        let order = seed_order(&db, customer.id).await;
        let service = OrderStatusService::new(db.clone());

        let mut first = AdvanceStatusRequest::new(OrderStatus::MaterialArrived);
        first.expected_version = Some(order.version);
        service.advance_to(order.id, first).await.unwrap();

        let mut stale = AdvanceStatusRequest::new(OrderStatus::CutterCutting);
        stale.expected_version = Some(order.version);
        let result = service.advance_to(order.id, stale).await;

        assert_matches!(result, Err(ServiceError::ConcurrentModification(id)) if id == order.id);
        let history = service.status_history(order.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, "material_arrived");
    }

    #[tokio::test]
    async fn unknown_order_or_actor_is_not_found() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Anu").await;
        let order = seed_order(&db, customer.id).await;
        let service = OrderStatusService::new(db.clone());

        let missing_order = service
            .advance_to(Uuid::new_v4(), AdvanceStatusRequest::new(OrderStatus::MaterialArrived))
            .await;
        assert_matches!(missing_order, Err(ServiceError::NotFound(_)));

        let mut request = AdvanceStatusRequest::new(OrderStatus::MaterialArrived);
        request.completed_by = Some(Uuid::new_v4());
        assert_matches!(
            service.advance_to(order.id, request).await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn progress_summarizes_the_order() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Gerel").await;
        let order = seed_order(&db, customer.id).await;
        let service = OrderStatusService::new(db.clone());

        service
            .advance_to(order.id, AdvanceStatusRequest::new(OrderStatus::MaterialArrived))
            .await
            .unwrap();

        let today = order.due_date + chrono::Duration::days(1);
        let progress = service.progress(order.id, today).await.unwrap();
        assert_eq!(progress.progress_percentage, 22);
        assert!(progress.is_overdue);
        assert_eq!(progress.days_remaining, -1);
        assert_eq!(progress.stages.len(), 9);
        assert!(progress.stages[1].completed);
        assert!(!progress.stages[0].completed);
    }
}
