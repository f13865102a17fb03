//! Persisted record types shared by the store, the service and the HTTP layer.

pub mod employee;

pub use employee::{Employee, EmployeeId, EmployeePayload};
