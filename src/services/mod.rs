pub mod assignment;
pub mod attendance;
pub mod course;
pub mod grade;
pub mod notification;
pub mod organization;
pub mod scoped;
pub mod student;
pub mod user;

pub use assignment::AssignmentService;
pub use attendance::{AttendanceFilter, AttendanceService};
pub use course::CourseService;
pub use grade::GradeService;
pub use notification::NotificationService;
pub use organization::OrganizationService;
pub use scoped::{Page, ScopedService};
pub use student::StudentService;
pub use user::UserService;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::database::models::FieldError;
use crate::database::{DatabaseError, Row};

/// Columns maintained by the store; never accepted from clients.
pub const SYSTEM_FIELDS: [&str; 3] = ["id", "created_at", "updated_at"];

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("System field '{0}' cannot be set via API")]
    SystemField(String),

    #[error("Field '{0}' cannot be changed once set")]
    ImmutableField(&'static str),

    #[error("Invalid field {0}")]
    Validation(#[from] FieldError),

    /// A referenced row (user, course, organization) does not exist in the tenant.
    #[error("{0}")]
    InvalidReference(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("organization_id is required when no tenant is active")]
    MissingTenant,

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Failed to decode {0} row: {1}")]
    Decode(&'static str, serde_json::Error),
}

pub(crate) fn reject_system_fields(changes: &Row) -> Result<(), ServiceError> {
    match SYSTEM_FIELDS.iter().find(|field| changes.contains_key(**field)) {
        Some(field) => Err(ServiceError::SystemField(field.to_string())),
        None => Ok(()),
    }
}

pub(crate) fn to_row<T: Serialize>(label: &'static str, value: &T) -> Result<Row, ServiceError> {
    match serde_json::to_value(value).map_err(|e| ServiceError::Decode(label, e))? {
        Value::Object(row) => Ok(row),
        other => Err(ServiceError::InvalidPayload(format!("expected an object, got {}", other))),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(label: &'static str, row: Row) -> Result<T, ServiceError> {
    serde_json::from_value(Value::Object(row)).map_err(|e| ServiceError::Decode(label, e))
}

/// Parse a raw update body into its typed form; unknown fields are rejected.
pub(crate) fn parse_payload<T: DeserializeOwned>(changes: Row) -> Result<T, ServiceError> {
    serde_json::from_value(Value::Object(changes)).map_err(|e| ServiceError::InvalidPayload(e.to_string()))
}
