use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_email, check_opt_len, default_true, FieldError, TenantScoped, Validate};
use crate::tenant::OrganizationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Teacher,
    Student,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for User {
    const TABLE: &'static str = "users";
    const LABEL: &'static str = "User";
    type Update = UserUpdate;

    fn id(&self) -> i64 {
        self.id
    }

    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    /// Only honoured when the request carries no tenant.
    #[serde(default, skip_serializing)]
    pub organization_id: Option<OrganizationId>,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), FieldError> {
        check_email("email", &self.email)?;
        check_opt_len("full_name", self.full_name.as_deref(), 0, Some(255))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), FieldError> {
        if let Some(email) = &self.email {
            check_email("email", email)?;
        }
        check_opt_len("full_name", self.full_name.as_deref(), 0, Some(255))
    }
}
