mod common;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate};
use common::{EmployeeType, TestApp};
use rust_decimal_macros::dec;
use tailorshop_api::{
    entities::order::{ItemType, OrderStatus, StaffSlot},
    errors::{OrderValidationError, ServiceError},
    services::{
        order_status::AdvanceStatusRequest,
        orders::{CreateOrderRequest, UpdateOrderRequest},
        payments::AmountInput,
        settings::OrderDefaults,
    },
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()
}

#[tokio::test]
async fn order_walks_every_stage_and_keeps_full_history() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let customer = app.seed_customer("Shahnoza").await;
    let tailor = app.seed_employee("Olim", EmployeeType::Tailor, true).await;

    let mut request = CreateOrderRequest::new(customer.id, ItemType::MenSuit);
    request.assigned_tailor_id = Some(tailor.id);
    request.total_amount = Some(AmountInput::from("1,800,000"));
    request.advance_amount = Some(AmountInput::from("500,000"));
    let order = services
        .orders
        .create_order(request, &OrderDefaults::default(), today())
        .await
        .unwrap();

    assert_eq!(order.due_date, today() + Duration::days(14));
    assert_eq!(order.remaining_amount(), dec!(1300000));

    let mut last_progress = 0;
    for status in OrderStatus::ALL.iter().skip(1) {
        let mut advance = AdvanceStatusRequest::new(*status);
        advance.completed_by = Some(tailor.id);
        let (updated, entry) = services
            .order_status
            .advance_to(order.id, advance)
            .await
            .unwrap();
        assert_eq!(entry.status, status.code());

        let progress = updated.progress_percentage().unwrap();
        assert!(progress > last_progress);
        last_progress = progress;
    }
    assert_eq!(last_progress, 100);

    let history = services.order_status.status_history(order.id).await.unwrap();
    assert_eq!(history.len(), OrderStatus::ALL.len() - 1);

    let finished = services.orders.get_order(order.id).await.unwrap();
    assert!(finished.completed_date.is_some());
    assert!(!finished.is_overdue(finished.due_date + Duration::days(30)));

    assert!(services
        .order_status
        .is_stage_completed(order.id, OrderStatus::CustomerSecondFitting)
        .await
        .unwrap());
    assert!(!services
        .order_status
        .is_stage_completed(order.id, OrderStatus::OrderPlaced)
        .await
        .unwrap());
}

#[tokio::test]
async fn reentering_a_stage_reports_the_latest_completion() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let customer = app.seed_customer("Shahnoza").await;
    let first = app.seed_employee("Olim", EmployeeType::Seamstress, true).await;
    let second = app.seed_employee("Gulnora", EmployeeType::Seamstress, true).await;
    let order = services
        .orders
        .create_order(
            CreateOrderRequest::new(customer.id, ItemType::FormalDress),
            &OrderDefaults::default(),
            today(),
        )
        .await
        .unwrap();

    for employee in [first.id, second.id] {
        let mut advance = AdvanceStatusRequest::new(OrderStatus::SeamstressSecondPrep);
        advance.completed_by = Some(employee);
        services
            .order_status
            .advance_to(order.id, advance)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let info = services
        .order_status
        .stage_completion_info(order.id, OrderStatus::SeamstressSecondPrep)
        .await
        .unwrap()
        .expect("stage was reached");
    assert_eq!(info.completed_by, Some(second.id));
    assert_eq!(
        services.order_status.status_history(order.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn edit_rejects_inactive_assignee_and_stale_version() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let customer = app.seed_customer("Timur").await;
    let retired = app.seed_employee("Hamid", EmployeeType::ShirtSewer, false).await;
    let order = services
        .orders
        .create_order(
            CreateOrderRequest::new(customer.id, ItemType::CasualShirt),
            &OrderDefaults::default(),
            today(),
        )
        .await
        .unwrap();

    let mut edit = UpdateOrderRequest::from_order(&order);
    edit.assigned_shirt_sewer_id = Some(retired.id);
    let err = services.orders.update_order(order.id, edit).await.unwrap_err();
    assert_matches!(
        err,
        ServiceError::OrderValidation(OrderValidationError::IneligibleAssignee {
            slot: StaffSlot::ShirtSewer,
            ..
        })
    );

    let edit = UpdateOrderRequest::from_order(&order);
    services.orders.update_order(order.id, edit.clone()).await.unwrap();
    let err = services.orders.update_order(order.id, edit).await.unwrap_err();
    assert_matches!(err, ServiceError::ConcurrentModification(id) if id == order.id);
}

#[tokio::test]
async fn edit_requires_a_total_amount() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let customer = app.seed_customer("Timur").await;
    let order = services
        .orders
        .create_order(
            CreateOrderRequest::new(customer.id, ItemType::Vest),
            &OrderDefaults::default(),
            today(),
        )
        .await
        .unwrap();

    let mut edit = UpdateOrderRequest::from_order(&order);
    edit.total_amount = None;
    let err = services.orders.update_order(order.id, edit).await.unwrap_err();
    assert_eq!(err.field().as_deref(), Some("total_amount"));
}

#[tokio::test]
async fn zero_advance_reports_nothing_owed() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("Kamila").await;
    let order = app
        .state
        .services
        .orders
        .create_order(
            CreateOrderRequest::new(customer.id, ItemType::Repair),
            &OrderDefaults::default(),
            today(),
        )
        .await
        .unwrap();

    assert_eq!(order.advance_amount, dec!(0));
    assert_eq!(order.remaining_amount(), dec!(0));
}
