//! Row-level multi-tenancy.
//!
//! A request's tenant is resolved once at the edge ([`resolver`], driven by
//! `middleware::tenant`), held in a task-local slot for the lifetime of the
//! request ([`context`]), and applied by every service through the helpers in
//! [`scope`].

pub mod context;
pub mod error;
pub mod resolver;
pub mod scope;

pub use context::TenantContext;
pub use error::TenantError;
pub use resolver::{TenantResolver, TenantSource};
pub use scope::{resolve_create_tenant, sanitize_update, with_tenant_scope, ORGANIZATION_ID};

/// Primary key of an organization, i.e. a tenant id.
pub type OrganizationId = i64;
