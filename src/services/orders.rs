use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{
        customer::Entity as CustomerEntity,
        order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity, ItemType, Model as OrderModel, OrderStatus},
    },
    errors::ServiceError,
    services::{
        assignments::{AssignmentService, StaffAssignments},
        payments::{validate_payment, AmountInput},
        settings::OrderDefaults,
    },
};

/// Payload for a new order. Anything left out is filled from [`OrderDefaults`].
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    pub item_type: ItemType,
    #[validate(length(max = 100, message = "Material code must be at most 100 characters"))]
    pub material_code: Option<String>,
    #[serde(default)]
    pub has_shirt: bool,
    #[serde(default)]
    pub assigned_cutter_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_tailor_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_trouser_maker_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_shirt_cutter_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_shirt_sewer_id: Option<Uuid>,
    pub total_amount: Option<AmountInput>,
    pub advance_amount: Option<AmountInput>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl CreateOrderRequest {
    pub fn new(customer_id: Uuid, item_type: ItemType) -> Self {
        Self {
            customer_id,
            item_type,
            material_code: None,
            has_shirt: false,
            assigned_cutter_id: None,
            assigned_tailor_id: None,
            assigned_trouser_maker_id: None,
            assigned_shirt_cutter_id: None,
            assigned_shirt_sewer_id: None,
            total_amount: None,
            advance_amount: None,
            start_date: None,
            due_date: None,
            notes: None,
        }
    }

    pub fn assignments(&self) -> StaffAssignments {
        StaffAssignments {
            assigned_cutter_id: self.assigned_cutter_id,
            assigned_tailor_id: self.assigned_tailor_id,
            assigned_trouser_maker_id: self.assigned_trouser_maker_id,
            assigned_shirt_cutter_id: self.assigned_shirt_cutter_id,
            assigned_shirt_sewer_id: self.assigned_shirt_sewer_id,
        }
    }
}

/// Payload for editing an order. No defaults are applied: the total and both
/// dates must be supplied again.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateOrderRequest {
    pub item_type: ItemType,
    #[validate(length(max = 100, message = "Material code must be at most 100 characters"))]
    pub material_code: Option<String>,
    #[serde(default)]
    pub has_shirt: bool,
    #[serde(default)]
    pub assigned_cutter_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_tailor_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_trouser_maker_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_shirt_cutter_id: Option<Uuid>,
    #[serde(default)]
    pub assigned_shirt_sewer_id: Option<Uuid>,
    pub total_amount: Option<AmountInput>,
    pub advance_amount: Option<AmountInput>,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    /// When set, the edit only applies if the order is still at this version.
    pub expected_version: Option<i32>,
}

impl UpdateOrderRequest {
    /// Starts an edit from the order's current values.
    pub fn from_order(order: &OrderModel) -> Self {
        Self {
            item_type: order.item_type,
            material_code: order.material_code.clone(),
            has_shirt: order.has_shirt,
            assigned_cutter_id: order.assigned_cutter_id,
            assigned_tailor_id: order.assigned_tailor_id,
            assigned_trouser_maker_id: order.assigned_trouser_maker_id,
            assigned_shirt_cutter_id: order.assigned_shirt_cutter_id,
            assigned_shirt_sewer_id: order.assigned_shirt_sewer_id,
            total_amount: Some(AmountInput::Number(order.total_amount)),
            advance_amount: Some(AmountInput::Number(order.advance_amount)),
            start_date: order.start_date,
            due_date: order.due_date,
            notes: order.notes.clone(),
            expected_version: Some(order.version),
        }
    }

    pub fn assignments(&self) -> StaffAssignments {
        StaffAssignments {
            assigned_cutter_id: self.assigned_cutter_id,
            assigned_tailor_id: self.assigned_tailor_id,
            assigned_trouser_maker_id: self.assigned_trouser_maker_id,
            assigned_shirt_cutter_id: self.assigned_shirt_cutter_id,
            assigned_shirt_sewer_id: self.assigned_shirt_sewer_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Largest page a list request may ask for.
pub const MAX_PAGE_SIZE: u64 = 500;

/// Human-readable order number derived from the order id.
pub fn order_number_for(order_id: Uuid) -> String {
    let simple = order_id.simple().to_string();
    format!("ORD-{}", simple.chars().take(8).collect::<String>().to_uppercase())
}

/// Order creation, editing and lookup.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    assignments: AssignmentService,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let assignments = AssignmentService::new(db.clone());
        Self { db, assignments }
    }

    /// Creates an order at the first stage. Missing dates and amounts come
    /// from `defaults`, measured from `today`.
    #[instrument(skip(self, request, defaults), fields(customer_id = %request.customer_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        defaults: &OrderDefaults,
        today: NaiveDate,
    ) -> Result<OrderModel, ServiceError> {
        request.validate()?;

        let total_input = request
            .total_amount
            .clone()
            .unwrap_or(AmountInput::Number(defaults.total_amount));
        let amounts = validate_payment(Some(&total_input), request.advance_amount.as_ref())?;

        let candidates = self.assignments.candidates().await?;
        let assignments = request.assignments();
        assignments.validate_against(&candidates)?;

        let db = &*self.db;
        CustomerEntity::find_by_id(request.customer_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", request.customer_id))
            })?;

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let order = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number_for(order_id)),
            customer_id: Set(request.customer_id),
            item_type: Set(request.item_type),
            material_code: Set(request.material_code),
            assigned_cutter_id: Set(assignments.assigned_cutter_id),
            assigned_tailor_id: Set(assignments.assigned_tailor_id),
            assigned_trouser_maker_id: Set(assignments.assigned_trouser_maker_id),
            assigned_shirt_cutter_id: Set(assignments.assigned_shirt_cutter_id),
            assigned_shirt_sewer_id: Set(assignments.assigned_shirt_sewer_id),
            has_shirt: Set(request.has_shirt),
            total_amount: Set(amounts.total_amount),
            advance_amount: Set(amounts.advance_amount),
            start_date: Set(request.start_date.unwrap_or_else(|| defaults.start_date(today))),
            due_date: Set(request.due_date.unwrap_or_else(|| defaults.due_date(today))),
            completed_date: Set(None),
            current_status: Set(OrderStatus::INITIAL.code().to_string()),
            notes: Set(request.notes),
            is_rated: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(1),
        };

        let txn = db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;
        let saved = order.insert(&txn).await.map_err(|e| {
            error!(error = %e, "Failed to insert order");
            ServiceError::DatabaseError(e)
        })?;
        txn.commit().await.map_err(|e| {
            error!("Failed to commit order {}: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(
            order_id = %saved.id,
            order_number = %saved.order_number,
            total_amount = %saved.total_amount,
            "Order created"
        );
        Ok(saved)
    }

    /// Replaces the editable fields of an order and bumps its version.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderModel, ServiceError> {
        request.validate()?;
        let amounts = validate_payment(request.total_amount.as_ref(), request.advance_amount.as_ref())?;

        let candidates = self.assignments.candidates().await?;
        let assignments = request.assignments();
        assignments.validate_against(&candidates)?;

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let current = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        if let Some(expected) = request.expected_version {
            if current.version != expected {
                warn!(expected, actual = current.version, "Rejecting edit on stale order version");
                return Err(ServiceError::ConcurrentModification(order_id));
            }
        }

        let loaded_version = current.version;
        let mut active: OrderActiveModel = current.into();
        active.item_type = Set(request.item_type);
        active.material_code = Set(request.material_code);
        active.has_shirt = Set(request.has_shirt);
        active.assigned_cutter_id = Set(assignments.assigned_cutter_id);
        active.assigned_tailor_id = Set(assignments.assigned_tailor_id);
        active.assigned_trouser_maker_id = Set(assignments.assigned_trouser_maker_id);
        active.assigned_shirt_cutter_id = Set(assignments.assigned_shirt_cutter_id);
        active.assigned_shirt_sewer_id = Set(assignments.assigned_shirt_sewer_id);
        active.total_amount = Set(amounts.total_amount);
        active.advance_amount = Set(amounts.advance_amount);
        active.start_date = Set(request.start_date);
        active.due_date = Set(request.due_date);
        active.notes = Set(request.notes);
        active.updated_at = Set(Utc::now());
        active.version = Set(loaded_version + 1);

        let updated = OrderEntity::update(active)
            .filter(order::Column::Version.eq(loaded_version))
            .exec(&txn)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => ServiceError::ConcurrentModification(order_id),
                other => {
                    error!(error = %other, "Failed to update order");
                    ServiceError::DatabaseError(other)
                }
            })?;

        txn.commit().await.map_err(|e| {
            error!("Failed to commit order {}: {}", order_id, e);
            ServiceError::DatabaseError(e)
        })?;

        info!(version = updated.version, "Order updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderModel, ServiceError> {
        OrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
    }

    /// Lists orders newest first. `page` is 1-based; `per_page` is capped at
    /// [`MAX_PAGE_SIZE`].
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: u64, per_page: u64) -> Result<OrderListResponse, ServiceError> {
        if page == 0 || per_page == 0 {
            return Err(ServiceError::InvalidInput(
                "page and per_page must be at least 1".to_string(),
            ));
        }
        let per_page = per_page.min(MAX_PAGE_SIZE);
        let offset = (page - 1).checked_mul(per_page);
        if offset.map_or(true, |offset| i64::try_from(offset).is_err()) {
            return Err(ServiceError::InvalidInput(format!("page {} is out of range", page)));
        }

        let paginator = OrderEntity::find()
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count orders");
            ServiceError::DatabaseError(e)
        })?;
        let orders = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(error = %e, page, per_page, "Failed to fetch orders page");
            ServiceError::DatabaseError(e)
        })?;

        info!(total, page, per_page, returned_count = orders.len(), "Orders listed");
        Ok(OrderListResponse {
            orders,
            total,
            page,
            per_page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entities::employee::EmployeeType,
        errors::{AmountField, OrderValidationError},
        entities::order::StaffSlot,
        test_support::{seed_customer, seed_employee, test_db},
    };
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn order_numbers_use_the_id_prefix() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        assert_eq!(order_number_for(id), "ORD-A1B2C3D4");
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Bat-Erdene").await;
        let service = OrderService::new(db.clone());

        let order = service
            .create_order(
                CreateOrderRequest::new(customer.id, ItemType::MenSuit),
                &OrderDefaults::default(),
                today(),
            )
            .await
            .unwrap();

        assert_eq!(order.start_date, today());
        assert_eq!(order.due_date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        assert_eq!(order.total_amount, dec!(100000));
        assert_eq!(order.advance_amount, dec!(0));
        assert_eq!(order.current_status, "order_placed");
        assert_eq!(order.version, 1);
        assert!(order.order_number.starts_with("ORD-"));
        assert!(!order.is_rated);
    }

    #[tokio::test]
    async fn create_keeps_submitted_values() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Saraa").await;
        let tailor = seed_employee(&db, "Enkh", EmployeeType::Tailor, true).await;
        let service = OrderService::new(db.clone());

        let mut request = CreateOrderRequest::new(customer.id, ItemType::WeddingDress);
        request.total_amount = Some("1,800,000".into());
        request.advance_amount = Some("500,000".into());
        request.due_date = Some(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        request.assigned_tailor_id = Some(tailor.id);
        request.assigned_shirt_sewer_id = Some(tailor.id);

        let order = service
            .create_order(request, &OrderDefaults::default(), today())
            .await
            .unwrap();
        assert_eq!(order.total_amount, dec!(1800000));
        assert_eq!(order.remaining_amount(), dec!(1300000));
        assert_eq!(order.due_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(order.assigned_tailor_id, Some(tailor.id));
        assert_eq!(order.assigned_shirt_sewer_id, Some(tailor.id));
    }

    #[tokio::test]
    async fn create_rejects_bad_payments_and_assignees() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Tuya").await;
        let manager = seed_employee(&db, "Ganaa", EmployeeType::Manager, true).await;
        let service = OrderService::new(db.clone());

        let mut over = CreateOrderRequest::new(customer.id, ItemType::Coat);
        over.total_amount = Some("500000".into());
        over.advance_amount = Some("600000".into());
        assert_matches!(
            service.create_order(over, &OrderDefaults::default(), today()).await,
            Err(ServiceError::OrderValidation(OrderValidationError::AdvanceExceedsTotal))
        );

        let mut garbled = CreateOrderRequest::new(customer.id, ItemType::Coat);
        garbled.total_amount = Some("12abc".into());
        assert_matches!(
            service.create_order(garbled, &OrderDefaults::default(), today()).await,
            Err(ServiceError::OrderValidation(OrderValidationError::InvalidAmount {
                field: AmountField::TotalAmount
            }))
        );

        let mut managed = CreateOrderRequest::new(customer.id, ItemType::Coat);
        managed.assigned_cutter_id = Some(manager.id);
        assert_matches!(
            service.create_order(managed, &OrderDefaults::default(), today()).await,
            Err(ServiceError::OrderValidation(OrderValidationError::IneligibleAssignee {
                slot: StaffSlot::Cutter,
                ..
            }))
        );

        assert_eq!(service.list_orders(1, 10).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn create_requires_an_existing_customer() {
        let db = test_db().await;
        let service = OrderService::new(db);
        let result = service
            .create_order(
                CreateOrderRequest::new(Uuid::new_v4(), ItemType::Vest),
                &OrderDefaults::default(),
                today(),
            )
            .await;
        assert_matches!(result, Err(ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_does_not_apply_defaults() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Oyun").await;
        let service = OrderService::new(db.clone());
        let order = service
            .create_order(
                CreateOrderRequest::new(customer.id, ItemType::Jacket),
                &OrderDefaults::default(),
                today(),
            )
            .await
            .unwrap();

        let mut edit = UpdateOrderRequest::from_order(&order);
        edit.total_amount = None;
        assert_matches!(
            service.update_order(order.id, edit).await,
            Err(ServiceError::OrderValidation(OrderValidationError::InvalidAmount { .. }))
        );

        let mut edit = UpdateOrderRequest::from_order(&order);
        edit.advance_amount = Some("40,000".into());
        edit.notes = Some("lining in navy".to_string());
        let updated = service.update_order(order.id, edit).await.unwrap();
        assert_eq!(updated.advance_amount, dec!(40000));
        assert_eq!(updated.total_amount, order.total_amount);
        assert_eq!(updated.version, 2);
        assert_eq!(updated.notes.as_deref(), Some("lining in navy"));
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Nomin").await;
        let service = OrderService::new(db.clone());
        let order = service
            .create_order(
                CreateOrderRequest::new(customer.id, ItemType::Trousers),
                &OrderDefaults::default(),
                today(),
            )
            .await
            .unwrap();

        let first = UpdateOrderRequest::from_order(&order);
        service.update_order(order.id, first).await.unwrap();

        let stale = UpdateOrderRequest::from_order(&order);
        assert_matches!(
            service.update_order(order.id, stale).await,
            Err(ServiceError::ConcurrentModification(id)) if id == order.id
        );
    }

    #[tokio::test]
    async fn list_is_paginated() {
        let db = test_db().await;
        let customer = seed_customer(&db, "Gerel").await;
        let service = OrderService::new(db.clone());
        for _ in 0..3 {
            service
                .create_order(
                    CreateOrderRequest::new(customer.id, ItemType::Repair),
                    &OrderDefaults::default(),
                    today(),
                )
                .await
                .unwrap();
        }

        let first = service.list_orders(1, 2).await.unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.orders.len(), 2);
        let second = service.list_orders(2, 2).await.unwrap();
        assert_eq!(second.orders.len(), 1);
        assert_matches!(service.list_orders(0, 2).await, Err(ServiceError::InvalidInput(_)));
        assert_matches!(
            service.list_orders(u64::MAX, 500).await,
            Err(ServiceError::InvalidInput(_))
        );
        assert_matches!(
            service.list_orders(u64::MAX / 2, 2).await,
            Err(ServiceError::InvalidInput(_))
        );
        let capped = service.list_orders(1, 10_000).await.unwrap();
        assert_eq!(capped.per_page, MAX_PAGE_SIZE);
        assert_eq!(capped.orders.len(), 3);
        assert_matches!(service.get_order(Uuid::new_v4()).await, Err(ServiceError::NotFound(_)));
    }
}
