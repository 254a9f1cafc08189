use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use super::{decode, parse_payload, reject_system_fields, to_row, Page, ServiceError};
use crate::database::models::{Organization, OrganizationCreate, OrganizationUpdate, Validate};
use crate::database::{Row, Store};
use crate::filter::FilterData;
use crate::tenant::scope::by_id;
use crate::tenant::OrganizationId;

const LABEL: &str = "Organization";

/// Tenant administration. Organizations are not themselves tenant-scoped, so
/// nothing here consults a [`crate::tenant::TenantContext`].
#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn Store>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn not_found() -> ServiceError {
        ServiceError::NotFound("Organization not found".to_string())
    }

    async fn find(&self, filter: FilterData) -> Result<Option<Organization>, ServiceError> {
        self.store
            .select_one(Organization::TABLE, filter)
            .await?
            .map(|row| decode(LABEL, row))
            .transpose()
    }

    /// Fails with a conflict if another organization already uses `value` for `field`.
    async fn ensure_unique(&self, field: &str, value: &str, except: Option<OrganizationId>) -> Result<(), ServiceError> {
        let mut where_clause = json!({ field: value });
        if let Some(id) = except {
            where_clause["id"] = json!({ "$ne": id });
        }
        let taken = self
            .store
            .count(Organization::TABLE, FilterData::with_where(where_clause))
            .await?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!("Organization with this {} already exists", field)));
        }
        Ok(())
    }

    pub async fn create(&self, payload: OrganizationCreate) -> Result<Organization, ServiceError> {
        payload.validate()?;
        self.ensure_unique("code", &payload.code, None).await?;
        if let Some(domain) = &payload.domain {
            self.ensure_unique("domain", domain, None).await?;
        }

        let stored = self.store.insert(Organization::TABLE, to_row(LABEL, &payload)?).await?;
        let organization: Organization = decode(LABEL, stored)?;
        info!(organization_id = organization.id, code = %organization.code, "organization created");
        Ok(organization)
    }

    pub async fn get(&self, id: OrganizationId) -> Result<Option<Organization>, ServiceError> {
        self.find(by_id(id)).await
    }

    pub async fn get_404(&self, id: OrganizationId) -> Result<Organization, ServiceError> {
        self.get(id).await?.ok_or_else(Self::not_found)
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<Organization>, ServiceError> {
        self.find(FilterData::with_where(json!({ "code": code }))).await
    }

    pub async fn get_by_domain(&self, domain: &str) -> Result<Option<Organization>, ServiceError> {
        self.find(FilterData::with_where(json!({ "domain": domain }))).await
    }

    pub async fn list(&self, page: Page, active_only: bool) -> Result<Vec<Organization>, ServiceError> {
        let where_clause = if active_only { json!({ "is_active": true }) } else { Value::Null };
        let filter = FilterData::with_where(where_clause)
            .order_by(json!("id asc"))
            .paginate(page.limit, page.skip);
        self.store
            .select(Organization::TABLE, filter)
            .await?
            .into_iter()
            .map(|row| decode(LABEL, row))
            .collect()
    }

    pub async fn update(&self, id: OrganizationId, changes: Row) -> Result<Organization, ServiceError> {
        reject_system_fields(&changes)?;
        let update: OrganizationUpdate = parse_payload(changes)?;
        update.validate()?;

        let current = self.get_404(id).await?;
        if let Some(code) = update.code.as_deref().filter(|c| *c != current.code) {
            self.ensure_unique("code", code, Some(id)).await?;
        }
        if let Some(domain) = update.domain.as_deref().filter(|d| Some(*d) != current.domain.as_deref()) {
            self.ensure_unique("domain", domain, Some(id)).await?;
        }

        let organization: Organization = self
            .store
            .update(Organization::TABLE, by_id(id), to_row(LABEL, &update)?)
            .await?
            .into_iter()
            .next()
            .map(|row| decode(LABEL, row))
            .transpose()?
            .ok_or_else(Self::not_found)?;

        if update.is_active == Some(false) {
            info!(organization_id = id, "organization deactivated");
        }
        Ok(organization)
    }

    /// Hard delete. Tenant rows go with it (`ON DELETE CASCADE` in Postgres).
    pub async fn delete(&self, id: OrganizationId) -> Result<(), ServiceError> {
        let removed = self.store.delete(Organization::TABLE, by_id(id)).await?;
        if removed == 0 {
            return Err(Self::not_found());
        }
        info!(organization_id = id, "organization deleted");
        Ok(())
    }
}
