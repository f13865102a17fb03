use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use entity::Employee;
use http_body_util::BodyExt;
use platform_db::{MemoryStore, RecordStore};
use serde_json::Value;
use server::{AppConfig, AppState, build_router};
use tower::ServiceExt;

/// Router over a fresh in-memory store, plus a handle for seeding it directly.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), Arc::new(AppConfig::default()));
        Self {
            router: build_router(state),
            store,
        }
    }

    pub async fn save(&self, employee: Employee) -> Employee {
        self.store.save(employee).await.unwrap()
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

pub fn ravi() -> Employee {
    Employee::new("ravi", "ravi@gmail.com", "developer")
}

pub fn arun() -> Employee {
    Employee::new("arun", "arun@gmail.com", "tester")
}
