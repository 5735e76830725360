use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::{
        employee::Entity as EmployeeEntity,
        employee_rating::{self, ActiveModel as EmployeeRatingActiveModel, Entity as EmployeeRatingEntity, Model as EmployeeRatingModel},
        order::{self, Entity as OrderEntity},
        order_rating::{ActiveModel as OrderRatingActiveModel, Model as OrderRatingModel},
    },
    errors::{OrderValidationError, ServiceError},
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Checks that a score is on the 1–5 scale.
pub fn check_rating(field: &'static str, value: i32) -> Result<(), OrderValidationError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(())
    } else {
        Err(OrderValidationError::InvalidRating { field, value })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeRatingRequest {
    pub employee_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRatingRequest {
    pub overall_rating: i32,
    pub quality_rating: i32,
    pub service_rating: i32,
    pub timing_rating: i32,
    pub comments: Option<String>,
}

impl OrderRatingRequest {
    fn check(&self) -> Result<(), OrderValidationError> {
        check_rating("overall_rating", self.overall_rating)?;
        check_rating("quality_rating", self.quality_rating)?;
        check_rating("service_rating", self.service_rating)?;
        check_rating("timing_rating", self.timing_rating)
    }
}

#[derive(Clone)]
pub struct RatingService {
    db: Arc<DatabaseConnection>,
}

impl RatingService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Rates one employee's work on an order. Each employee can be rated once
    /// per order.
    #[instrument(skip(self, request), fields(order_id = %order_id, employee_id = %request.employee_id))]
    pub async fn rate_employee(
        &self,
        order_id: Uuid,
        request: EmployeeRatingRequest,
    ) -> Result<EmployeeRatingModel, ServiceError> {
        check_rating("rating", request.rating)?;

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        ensure_order_exists(&txn, order_id).await?;
        EmployeeEntity::find_by_id(request.employee_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Employee {} not found", request.employee_id))
            })?;

        let employee_id = request.employee_id;
        let saved = EmployeeRatingActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            employee_id: Set(employee_id),
            rating: Set(request.rating),
            comment: Set(request.comment),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            insert_failure(e, || {
                format!(
                    "Employee {} has already been rated for order {}",
                    employee_id, order_id
                )
            })
        })?;

        mark_rated(&txn, order_id).await?;
        txn.commit().await.map_err(|e| {
            error!("Failed to commit rating for order {}: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(rating = saved.rating, "Employee rated");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list_employee_ratings(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<EmployeeRatingModel>, ServiceError> {
        let ratings = EmployeeRatingEntity::find()
            .filter(employee_rating::Column::OrderId.eq(order_id))
            .order_by_asc(employee_rating::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(ratings)
    }

    /// Records the customer's rating of the whole order; one per order.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn rate_order(
        &self,
        order_id: Uuid,
        request: OrderRatingRequest,
    ) -> Result<OrderRatingModel, ServiceError> {
        request.check()?;

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        ensure_order_exists(&txn, order_id).await?;
        let saved = OrderRatingActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            overall_rating: Set(request.overall_rating),
            quality_rating: Set(request.quality_rating),
            service_rating: Set(request.service_rating),
            timing_rating: Set(request.timing_rating),
            comments: Set(request.comments),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| insert_failure(e, || format!("Order {} has already been rated", order_id)))?;

        mark_rated(&txn, order_id).await?;
        txn.commit().await.map_err(|e| {
            error!("Failed to commit rating for order {}: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(overall = saved.overall_rating, "Order rated");
        Ok(saved)
    }
}

async fn ensure_order_exists(txn: &DatabaseTransaction, order_id: Uuid) -> Result<(), ServiceError> {
    OrderEntity::find_by_id(order_id)
        .one(txn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
}

/// The unique indexes on ratings are the duplicate check; a violation is a conflict.
fn insert_failure(err: DbErr, conflict: impl FnOnce() -> String) -> ServiceError {
    match ServiceError::from_insert(err, conflict) {
        ServiceError::DatabaseError(e) => {
            error!(error = %e, "Failed to insert rating");
            ServiceError::DatabaseError(e)
        }
        other => {
            warn!(error = %other, "Duplicate rating rejected");
            other
        }
    }
}

async fn mark_rated(txn: &DatabaseTransaction, order_id: Uuid) -> Result<(), ServiceError> {
    OrderEntity::update_many()
        .col_expr(order::Column::IsRated, Expr::value(true))
        .filter(order::Column::Id.eq(order_id))
        .exec(txn)
        .await
        .map_err(|e| {
            error!("Failed to mark order {} as rated: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;
    Ok(())
}
