use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_len, check_opt_len, default_true, FieldError, TenantScoped, Validate};
use crate::tenant::OrganizationId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub total_points: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for Assignment {
    const TABLE: &'static str = "assignments";
    const LABEL: &'static str = "Assignment";
    type Update = AssignmentUpdate;

    fn id(&self) -> i64 {
        self.id
    }

    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

fn default_total_points() -> f64 {
    100.0
}

fn check_points(points: Option<f64>) -> Result<(), FieldError> {
    match points {
        Some(value) if value < 0.0 => Err(FieldError {
            field: "total_points",
            message: "must not be negative".to_string(),
        }),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentCreate {
    #[serde(default, skip_serializing)]
    pub organization_id: Option<OrganizationId>,
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[serde(default = "default_total_points")]
    pub total_points: f64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for AssignmentCreate {
    fn validate(&self) -> Result<(), FieldError> {
        check_len("title", &self.title, 1, Some(255))?;
        check_points(Some(self.total_points))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssignmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for AssignmentUpdate {
    fn validate(&self) -> Result<(), FieldError> {
        check_opt_len("title", self.title.as_deref(), 1, Some(255))?;
        check_points(self.total_points)
    }
}
