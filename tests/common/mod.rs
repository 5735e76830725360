#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tailorshop_api::{
    app_router,
    config::AppConfig,
    db::{self, DbConfig},
    entities::{customer, employee},
    AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

pub use tailorshop_api::entities::employee::EmployeeType;

/// Configuration suitable for tests; nothing is read from disk or the environment.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        db_min_connections: 1,
        db_connect_timeout_secs: 5,
        db_idle_timeout_secs: 3600,
        db_acquire_timeout_secs: 5,
        host: "127.0.0.1".to_string(),
        port: 18_080,
        environment: "test".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
        auto_migrate: true,
        api_default_page_size: 20,
    }
}

/// Helper harness wrapping the full router over a migrated in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::single_connection(
            "sqlite::memory:",
        ))
        .await
        .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), test_config());
        let router = app_router(state.clone());
        Self { router, state }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("router response");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn seed_customer(&self, full_name: &str) -> customer::Model {
        customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            full_name: Set(full_name.to_string()),
            phone: Set(Some("+998 90 000 00 00".to_string())),
            created_at: Set(Utc::now()),
        }
        .insert(self.db())
        .await
        .expect("insert customer")
    }

    pub async fn seed_employee(
        &self,
        first_name: &str,
        employee_type: EmployeeType,
        is_active: bool,
    ) -> employee::Model {
        employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set(first_name.to_string()),
            last_name: Set("Staff".to_string()),
            employee_type: Set(employee_type),
            is_active: Set(is_active),
        }
        .insert(self.db())
        .await
        .expect("insert employee")
    }

    /// Creates an order through the API and returns its JSON representation.
    pub async fn create_order(&self, body: Value) -> Value {
        let (status, json) = self.post("/api/v1/orders", body).await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
        json["data"].clone()
    }
}

/// Parses a decimal that the API serialises as a string.
pub fn decimal(value: &Value) -> rust_decimal::Decimal {
    value
        .as_str()
        .expect("decimal serialised as string")
        .parse()
        .expect("decimal value")
}
