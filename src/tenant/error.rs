use thiserror::Error;

use super::OrganizationId;
use crate::services::ServiceError;

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Invalid tenant ID: {0}")]
    MalformedTenantId(String),

    #[error("Organization {0} not found")]
    TenantNotFound(OrganizationId),

    #[error("Organization {0} is inactive")]
    TenantInactive(OrganizationId),

    #[error("Tenant lookup failed: {0}")]
    Lookup(#[from] ServiceError),
}
