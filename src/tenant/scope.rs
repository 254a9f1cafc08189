use serde_json::{json, Value};
use tracing::debug;

use super::{OrganizationId, TenantContext};
use crate::database::Row;
use crate::filter::FilterData;

/// Tenant column carried by every tenant-scoped table.
pub const ORGANIZATION_ID: &str = "organization_id";

/// Restrict `filter` to the active tenant. Without a tenant the filter is returned unchanged.
pub fn with_tenant_scope(ctx: &TenantContext, filter: FilterData) -> FilterData {
    match ctx.organization_id() {
        Some(id) => filter.and_where(json!({ ORGANIZATION_ID: id })),
        None => filter,
    }
}

/// Tenant to stamp on a new row: the active tenant if there is one, otherwise
/// the caller-supplied organization.
pub fn resolve_create_tenant(ctx: &TenantContext, explicit: Option<OrganizationId>) -> Option<OrganizationId> {
    match (ctx.organization_id(), explicit) {
        (Some(active), Some(requested)) if active != requested => {
            debug!(active, requested, "ignoring explicit organization_id under an active tenant");
            Some(active)
        }
        (Some(active), _) => Some(active),
        (None, explicit) => explicit,
    }
}

/// Drop `organization_id` from an update payload while a tenant is active, so
/// rows cannot be moved between tenants. Returns whether anything was removed.
pub fn sanitize_update(ctx: &TenantContext, changes: &mut Row) -> bool {
    if ctx.is_scoped() {
        changes.remove(ORGANIZATION_ID).is_some()
    } else {
        false
    }
}

/// `{ "id": id }`, the base filter for single-row lookups.
pub fn by_id(id: i64) -> FilterData {
    FilterData::with_where(json!({ "id": id }))
}

pub(crate) fn scoped_where(ctx: &TenantContext, where_clause: Value) -> FilterData {
    with_tenant_scope(ctx, FilterData::with_where(where_clause))
}
