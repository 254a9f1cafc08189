use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{check_len, check_opt_len, default_true, FieldError, Validate};
use crate::tenant::OrganizationId;

/// A tenant. Every tenant-scoped row points at one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub code: String,
    pub domain: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub settings: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub const TABLE: &'static str = "organizations";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationCreate {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl Validate for OrganizationCreate {
    fn validate(&self) -> Result<(), FieldError> {
        check_len("name", &self.name, 1, Some(255))?;
        check_len("code", &self.code, 1, Some(50))?;
        check_opt_len("domain", self.domain.as_deref(), 0, Some(255))?;
        check_opt_len("logo_url", self.logo_url.as_deref(), 0, Some(255))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrganizationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for OrganizationUpdate {
    fn validate(&self) -> Result<(), FieldError> {
        check_opt_len("name", self.name.as_deref(), 1, Some(255))?;
        check_opt_len("code", self.code.as_deref(), 1, Some(50))?;
        check_opt_len("domain", self.domain.as_deref(), 0, Some(255))?;
        check_opt_len("logo_url", self.logo_url.as_deref(), 0, Some(255))
    }
}
