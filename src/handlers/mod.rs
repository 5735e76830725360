//! HTTP handlers and the service container they share.

use std::sync::Arc;

use crate::{
    db::DbPool,
    services::{
        assignments::AssignmentService, order_status::OrderStatusService, orders::OrderService,
        process_steps::ProcessStepService, ratings::RatingService, settings::SettingsService,
    },
};

pub mod employees;
pub mod health;
pub mod orders;
pub mod process_steps;
pub mod ratings;
pub mod settings;

/// Services used by the handlers, all sharing one connection pool.
#[derive(Clone)]
pub struct AppServices {
    pub orders: Arc<OrderService>,
    pub order_status: Arc<OrderStatusService>,
    pub assignments: Arc<AssignmentService>,
    pub settings: Arc<SettingsService>,
    pub process_steps: Arc<ProcessStepService>,
    pub ratings: Arc<RatingService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            orders: Arc::new(OrderService::new(db_pool.clone())),
            order_status: Arc::new(OrderStatusService::new(db_pool.clone())),
            assignments: Arc::new(AssignmentService::new(db_pool.clone())),
            settings: Arc::new(SettingsService::new(db_pool.clone())),
            process_steps: Arc::new(ProcessStepService::new(db_pool.clone())),
            ratings: Arc::new(RatingService::new(db_pool)),
        }
    }
}
