use std::sync::Arc;

use serde_json::json;

use super::{Page, ScopedService, ServiceError, UserService};
use crate::database::models::{Notification, NotificationCreate, NotificationUpdate, Validate};
use crate::database::{Row, Store};
use crate::tenant::TenantContext;

/// In-app notifications. Delivery over email, SMS or push is handled elsewhere;
/// this service only records them and tracks read/delivered state.
#[derive(Clone)]
pub struct NotificationService {
    notifications: ScopedService<Notification>,
    users: UserService,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            notifications: ScopedService::new(store.clone()),
            users: UserService::new(store),
        }
    }

    pub async fn create(&self, ctx: &TenantContext, payload: NotificationCreate) -> Result<Notification, ServiceError> {
        payload.validate()?;
        let tenant = self.notifications.stamp(ctx, payload.organization_id).await?;
        self.users.require(&TenantContext::scoped(tenant), payload.user_id).await?;
        self.notifications.insert(tenant, &payload).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<Notification, ServiceError> {
        self.notifications.get_404(ctx, id).await
    }

    /// Newest first.
    pub async fn list_for_user(
        &self,
        ctx: &TenantContext,
        user_id: i64,
        page: Page,
        unread_only: bool,
    ) -> Result<Vec<Notification>, ServiceError> {
        let mut where_clause = json!({ "user_id": user_id });
        if unread_only {
            where_clause["is_read"] = json!(false);
        }
        self.notifications
            .list(ctx, where_clause, json!("created_at desc, id desc"), page)
            .await
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, changes: Row) -> Result<Notification, ServiceError> {
        let update = self.notifications.parse_update(ctx, changes)?;
        self.notifications.update(ctx, id, &update).await
    }

    pub async fn mark_as_read(&self, ctx: &TenantContext, id: i64) -> Result<Notification, ServiceError> {
        let update = NotificationUpdate {
            is_read: Some(true),
            ..Default::default()
        };
        self.notifications.update(ctx, id, &update).await
    }

    pub async fn mark_as_delivered(&self, ctx: &TenantContext, id: i64) -> Result<Notification, ServiceError> {
        let update = NotificationUpdate {
            is_delivered: Some(true),
            ..Default::default()
        };
        self.notifications.update(ctx, id, &update).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        self.notifications.delete(ctx, id).await
    }
}
