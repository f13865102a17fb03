//! HR module: employee record operations over a [`RecordStore`].

use std::sync::Arc;

use entity::{Employee, EmployeeId, EmployeePayload};
use platform_api::{ApiError, ApiResult};
use platform_db::RecordStore;
use tracing::{debug, info};

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn RecordStore>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, payload: EmployeePayload) -> ApiResult<Employee> {
        let saved = self
            .store
            .save(payload.into())
            .await
            .map_err(ApiError::internal)?;
        info!(employee_id = ?saved.id, "employee created");
        Ok(saved)
    }

    pub async fn list(&self) -> ApiResult<Vec<Employee>> {
        let employees = self.store.find_all().await.map_err(ApiError::internal)?;
        debug!(count = employees.len(), "employees listed");
        Ok(employees)
    }

    pub async fn get(&self, id: EmployeeId) -> ApiResult<Employee> {
        debug!(employee_id = id, "loading employee");
        self.store
            .find_by_id(id)
            .await
            .map_err(ApiError::internal)?
            .ok_or(ApiError::NotFound)
    }

    /// Replace name, email and role. Unknown ids fail without touching the store.
    pub async fn update(&self, id: EmployeeId, payload: EmployeePayload) -> ApiResult<Employee> {
        let mut employee = self.get(id).await?;
        employee.apply(payload);
        let saved = self.store.save(employee).await.map_err(ApiError::internal)?;
        info!(employee_id = id, "employee updated");
        Ok(saved)
    }

    /// Unknown ids are reported as not found, like `get` and `update`.
    pub async fn delete(&self, id: EmployeeId) -> ApiResult<()> {
        let employee = self.get(id).await?;
        self.store
            .delete(&employee)
            .await
            .map_err(ApiError::internal)?;
        info!(employee_id = id, "employee deleted");
        Ok(())
    }

    pub async fn seed(&self, payloads: Vec<EmployeePayload>) -> ApiResult<Vec<Employee>> {
        let records = payloads.into_iter().map(Employee::from).collect();
        let saved = self
            .store
            .save_all(records)
            .await
            .map_err(ApiError::internal)?;
        info!(count = saved.len(), "employees seeded");
        Ok(saved)
    }
}

/// Fixture rows used by the `seed` command.
pub fn sample_employees() -> Vec<EmployeePayload> {
    vec![
        EmployeePayload {
            name: "ravi".into(),
            email: "ravi@gmail.com".into(),
            role: "developer".into(),
        },
        EmployeePayload {
            name: "arun".into(),
            email: "arun@gmail.com".into(),
            role: "tester".into(),
        },
    ]
}
