use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderName, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use entity::{Employee, EmployeeId, EmployeePayload};
use platform_api::ApiResult;
use platform_db::{MemoryStore, RecordStore};
use products_hr::EmployeeService;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

const DELETED_MESSAGE: &str = "Employee deleted successfully!";

#[derive(Clone)]
pub struct AppState {
    pub employees: EmployeeService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<AppConfig>) -> Self {
        Self {
            employees: EmployeeService::new(store),
            config,
        }
    }

    /// State over a fresh [`MemoryStore`] with default config.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(AppConfig::default()))
    }
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

/// Bind, then serve until SIGINT or SIGTERM.
pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    let bound = listener.local_addr().context("listener has no local address")?;
    info!(addr = %bound, "employee server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("employee server stopped with an error")
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/employees", get(list_employees))
        .route("/api/employees/create", post(create_employee))
        .route(
            "/api/employees/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(state.config.cors_layer()),
        )
        .with_state(state)
}

async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<EmployeePayload>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let employee = state.employees.create(payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(state.employees.list().await?))
}

async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.employees.get(id).await?))
}

async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    Json(payload): Json<EmployeePayload>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.employees.update(id, payload).await?))
}

#[derive(Serialize)]
struct DeleteResponse {
    message: &'static str,
}

async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
) -> ApiResult<Json<DeleteResponse>> {
    state.employees.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: DELETED_MESSAGE,
    }))
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

#[cfg(unix)]
async fn terminated() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            tracing::error!(error = %err, "SIGTERM handler unavailable");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminated() {
    std::future::pending::<()>().await;
}

async fn shutdown_signal() {
    let interrupted = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "CTRL+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };
    let cause = tokio::select! {
        _ = interrupted => "SIGINT",
        _ = terminated() => "SIGTERM",
    };
    info!(cause, "draining in-flight requests");
}
