use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use super::{decode, parse_payload, reject_system_fields, to_row, ServiceError};
use crate::database::models::{Organization, TenantScoped, Validate};
use crate::database::{Row, Store};
use crate::filter::FilterData;
use crate::tenant::scope::{by_id, scoped_where};
use crate::tenant::{resolve_create_tenant, sanitize_update, with_tenant_scope, OrganizationId, TenantContext, ORGANIZATION_ID};

/// Offset pagination for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i32,
    pub limit: i32,
}

impl Page {
    pub fn new(skip: i32, limit: i32) -> Self {
        Self { skip, limit }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

/// CRUD over one tenant-scoped table.
///
/// Every read, update and delete goes through [`with_tenant_scope`], so a row
/// belonging to another tenant is indistinguishable from a missing one.
/// Creates are stamped with the active tenant (see [`Self::stamp`]).
pub struct ScopedService<E> {
    store: Arc<dyn Store>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ScopedService<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: TenantScoped> ScopedService<E> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    pub fn not_found() -> ServiceError {
        ServiceError::NotFound(format!("{} not found", E::LABEL))
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<Option<E>, ServiceError> {
        let filter = with_tenant_scope(ctx, by_id(id));
        self.store
            .select_one(E::TABLE, filter)
            .await?
            .map(|row| decode(E::LABEL, row))
            .transpose()
    }

    pub async fn get_404(&self, ctx: &TenantContext, id: i64) -> Result<E, ServiceError> {
        self.get(ctx, id).await?.ok_or_else(Self::not_found)
    }

    /// Like [`Self::get_404`] but for ids named inside a payload, which are a
    /// client error rather than a missing resource.
    pub async fn require(&self, ctx: &TenantContext, id: i64) -> Result<E, ServiceError> {
        self.get(ctx, id)
            .await?
            .ok_or_else(|| ServiceError::InvalidReference(format!("{} {} not found", E::LABEL, id)))
    }

    pub async fn find_one(&self, ctx: &TenantContext, where_clause: Value) -> Result<Option<E>, ServiceError> {
        self.store
            .select_one(E::TABLE, scoped_where(ctx, where_clause))
            .await?
            .map(|row| decode(E::LABEL, row))
            .transpose()
    }

    pub async fn exists(&self, ctx: &TenantContext, where_clause: Value) -> Result<bool, ServiceError> {
        Ok(self.store.count(E::TABLE, scoped_where(ctx, where_clause)).await? > 0)
    }

    /// `where_clause` may be `Value::Null` for "everything in the tenant".
    pub async fn list(&self, ctx: &TenantContext, where_clause: Value, order: Value, page: Page) -> Result<Vec<E>, ServiceError> {
        let filter = scoped_where(ctx, where_clause)
            .order_by(order)
            .paginate(page.limit, page.skip);
        self.store
            .select(E::TABLE, filter)
            .await?
            .into_iter()
            .map(|row| decode(E::LABEL, row))
            .collect()
    }

    /// Pick the tenant for a new row. The active tenant wins; without one the
    /// caller must name an organization, and it must exist.
    pub async fn stamp(&self, ctx: &TenantContext, explicit: Option<OrganizationId>) -> Result<OrganizationId, ServiceError> {
        let tenant = resolve_create_tenant(ctx, explicit).ok_or(ServiceError::MissingTenant)?;
        if !ctx.is_scoped() {
            let found = self
                .store
                .count(Organization::TABLE, FilterData::with_where(json!({ "id": tenant })))
                .await?;
            if found == 0 {
                return Err(ServiceError::InvalidReference(format!("Organization {} not found", tenant)));
            }
        }
        Ok(tenant)
    }

    /// Insert `payload` under `tenant`. Any `organization_id` in the payload is replaced.
    pub async fn insert<P: Serialize>(&self, tenant: OrganizationId, payload: &P) -> Result<E, ServiceError> {
        let mut row = to_row(E::LABEL, payload)?;
        row.insert(ORGANIZATION_ID.to_string(), Value::from(tenant));
        let stored = self.store.insert(E::TABLE, row).await?;
        decode(E::LABEL, stored)
    }

    /// Turn a raw update body into a validated update: system fields are
    /// refused, and `organization_id` is dropped under an active tenant.
    /// Without a tenant it is refused outright; a row never changes owner.
    pub fn parse_update(&self, ctx: &TenantContext, mut changes: Row) -> Result<E::Update, ServiceError> {
        reject_system_fields(&changes)?;
        sanitize_update(ctx, &mut changes);
        if changes.contains_key(ORGANIZATION_ID) {
            return Err(ServiceError::ImmutableField(ORGANIZATION_ID));
        }
        let update: E::Update = parse_payload(changes)?;
        update.validate()?;
        Ok(update)
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, update: &E::Update) -> Result<E, ServiceError> {
        let changes = to_row(E::LABEL, update)?;
        let filter = with_tenant_scope(ctx, by_id(id));
        self.store
            .update(E::TABLE, filter, changes)
            .await?
            .into_iter()
            .next()
            .map(|row| decode(E::LABEL, row))
            .transpose()?
            .ok_or_else(Self::not_found)
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        let removed = self.store.delete(E::TABLE, with_tenant_scope(ctx, by_id(id))).await?;
        if removed == 0 {
            return Err(Self::not_found());
        }
        Ok(())
    }
}
