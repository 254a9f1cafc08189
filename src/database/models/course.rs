use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_len, check_opt_len, default_true, FieldError, TenantScoped, Validate};
use crate::tenant::OrganizationId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub teacher_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for Course {
    const TABLE: &'static str = "courses";
    const LABEL: &'static str = "Course";
    type Update = CourseUpdate;

    fn id(&self) -> i64 {
        self.id
    }

    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCreate {
    #[serde(default, skip_serializing)]
    pub organization_id: Option<OrganizationId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub code: String,
    pub teacher_id: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Validate for CourseCreate {
    fn validate(&self) -> Result<(), FieldError> {
        check_len("title", &self.title, 1, Some(255))?;
        check_len("code", &self.code, 1, Some(50))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for CourseUpdate {
    fn validate(&self) -> Result<(), FieldError> {
        check_opt_len("title", self.title.as_deref(), 1, Some(255))?;
        check_opt_len("code", self.code.as_deref(), 1, Some(50))
    }
}
