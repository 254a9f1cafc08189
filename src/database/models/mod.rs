pub mod assignment;
pub mod attendance;
pub mod course;
pub mod grade;
pub mod notification;
pub mod organization;
pub mod student;
pub mod user;

pub use assignment::{Assignment, AssignmentCreate, AssignmentUpdate};
pub use attendance::{Attendance, AttendanceCreate, AttendanceStatus, AttendanceUpdate};
pub use course::{Course, CourseCreate, CourseUpdate};
pub use grade::{Grade, GradeCreate, GradeUpdate};
pub use notification::{Notification, NotificationCreate, NotificationPriority, NotificationType, NotificationUpdate};
pub use organization::{Organization, OrganizationCreate, OrganizationUpdate};
pub use student::{Student, StudentCreate, StudentUpdate};
pub use user::{User, UserCreate, UserRole, UserUpdate};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::tenant::OrganizationId;

/// A row type whose table carries `organization_id`.
pub trait TenantScoped: Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static str;
    /// Used in not-found messages, e.g. "Course not found".
    const LABEL: &'static str;

    /// Partial update accepted by `PUT /<entity>/:id`.
    type Update: Validate + Serialize + DeserializeOwned + Send + Sync;

    fn id(&self) -> i64;
    fn organization_id(&self) -> OrganizationId;
}

#[derive(Debug, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

pub trait Validate {
    fn validate(&self) -> Result<(), FieldError>;
}

pub(crate) fn check_len(field: &'static str, value: &str, min: usize, max: Option<usize>) -> Result<(), FieldError> {
    let len = value.chars().count();
    if len < min {
        return Err(FieldError {
            field,
            message: format!("must be at least {} character(s)", min),
        });
    }
    match max {
        Some(max) if len > max => Err(FieldError {
            field,
            message: format!("must be at most {} characters", max),
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_opt_len(field: &'static str, value: Option<&str>, min: usize, max: Option<usize>) -> Result<(), FieldError> {
    value.map_or(Ok(()), |v| check_len(field, v, min, max))
}

pub(crate) fn check_email(field: &'static str, value: &str) -> Result<(), FieldError> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FieldError {
            field,
            message: "is not a valid email address".to_string(),
        })
    }
}

pub(crate) fn default_true() -> bool {
    true
}
