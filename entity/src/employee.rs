use serde::{Deserialize, Serialize};

/// Store-assigned employee identifier.
pub type EmployeeId = i64;

/// An employee record. `id` stays `None` until the record store saves it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Employee {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    /// Overwrite the mutable fields, keeping the identity.
    pub fn apply(&mut self, payload: EmployeePayload) {
        self.name = payload.name;
        self.email = payload.email;
        self.role = payload.role;
    }
}

/// Request body for create and update. Unknown fields, `id` included, are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmployeePayload {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<EmployeePayload> for Employee {
    fn from(payload: EmployeePayload) -> Self {
        Self::new(payload.name, payload.email, payload.role)
    }
}
