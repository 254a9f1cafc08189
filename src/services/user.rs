use std::sync::Arc;

use serde_json::{json, Value};

use super::{Page, ScopedService, ServiceError};
use crate::database::models::{User, UserCreate, Validate};
use crate::database::{Row, Store};
use crate::tenant::TenantContext;

#[derive(Clone)]
pub struct UserService {
    users: ScopedService<User>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            users: ScopedService::new(store),
        }
    }

    /// Email addresses are unique within a tenant.
    async fn ensure_email_free(&self, ctx: &TenantContext, email: &str, except: Option<i64>) -> Result<(), ServiceError> {
        let mut where_clause = json!({ "email": email });
        if let Some(id) = except {
            where_clause["id"] = json!({ "$ne": id });
        }
        if self.users.exists(ctx, where_clause).await? {
            return Err(ServiceError::Conflict("User with this email already exists".to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, ctx: &TenantContext, payload: UserCreate) -> Result<User, ServiceError> {
        payload.validate()?;
        let tenant = self.users.stamp(ctx, payload.organization_id).await?;
        self.ensure_email_free(&TenantContext::scoped(tenant), &payload.email, None)
            .await?;
        self.users.insert(tenant, &payload).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<User, ServiceError> {
        self.users.get_404(ctx, id).await
    }

    pub async fn get_by_email(&self, ctx: &TenantContext, email: &str) -> Result<Option<User>, ServiceError> {
        self.users.find_one(ctx, json!({ "email": email })).await
    }

    pub async fn list(&self, ctx: &TenantContext, page: Page, active_only: bool) -> Result<Vec<User>, ServiceError> {
        let where_clause = if active_only { json!({ "is_active": true }) } else { Value::Null };
        self.users.list(ctx, where_clause, json!("id asc"), page).await
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, changes: Row) -> Result<User, ServiceError> {
        let update = self.users.parse_update(ctx, changes)?;
        let current = self.users.get_404(ctx, id).await?;
        if let Some(email) = update.email.as_deref().filter(|e| *e != current.email) {
            self.ensure_email_free(&TenantContext::scoped(current.organization_id), email, Some(id))
                .await?;
        }
        self.users.update(ctx, id, &update).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        self.users.delete(ctx, id).await
    }

    /// Resolve a `user_id` named in another entity's payload.
    pub async fn require(&self, ctx: &TenantContext, id: i64) -> Result<User, ServiceError> {
        self.users.require(ctx, id).await
    }
}
