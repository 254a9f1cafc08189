use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{Page, ScopedService, ServiceError, UserService};
use crate::database::models::{Course, CourseCreate, Validate};
use crate::database::{Row, Store};
use crate::tenant::TenantContext;

#[derive(Clone)]
pub struct CourseService {
    courses: ScopedService<Course>,
    users: UserService,
}

impl CourseService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            courses: ScopedService::new(store.clone()),
            users: UserService::new(store),
        }
    }

    async fn ensure_code_free(&self, ctx: &TenantContext, code: &str, except: Option<i64>) -> Result<(), ServiceError> {
        let mut where_clause = json!({ "code": code });
        if let Some(id) = except {
            where_clause["id"] = json!({ "$ne": id });
        }
        if self.courses.exists(ctx, where_clause).await? {
            return Err(ServiceError::Conflict("Course with this code already exists".to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, ctx: &TenantContext, payload: CourseCreate) -> Result<Course, ServiceError> {
        payload.validate()?;
        let tenant = self.courses.stamp(ctx, payload.organization_id).await?;
        let scope = TenantContext::scoped(tenant);
        self.users.require(&scope, payload.teacher_id).await?;
        self.ensure_code_free(&scope, &payload.code, None).await?;
        self.courses.insert(tenant, &payload).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<Course, ServiceError> {
        self.courses.get_404(ctx, id).await
    }

    pub async fn get_by_code(&self, ctx: &TenantContext, code: &str) -> Result<Option<Course>, ServiceError> {
        self.courses.find_one(ctx, json!({ "code": code })).await
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        page: Page,
        teacher_id: Option<i64>,
        active_only: bool,
    ) -> Result<Vec<Course>, ServiceError> {
        let mut where_clause = Map::new();
        if let Some(teacher_id) = teacher_id {
            where_clause.insert("teacher_id".to_string(), json!(teacher_id));
        }
        if active_only {
            where_clause.insert("is_active".to_string(), json!(true));
        }
        self.courses
            .list(ctx, Value::Object(where_clause), json!("id asc"), page)
            .await
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, changes: Row) -> Result<Course, ServiceError> {
        let update = self.courses.parse_update(ctx, changes)?;
        let current = self.courses.get_404(ctx, id).await?;
        let scope = TenantContext::scoped(current.organization_id);

        if let Some(teacher_id) = update.teacher_id.filter(|t| *t != current.teacher_id) {
            self.users.require(&scope, teacher_id).await?;
        }
        if let Some(code) = update.code.as_deref().filter(|c| *c != current.code) {
            self.ensure_code_free(&scope, code, Some(id)).await?;
        }
        self.courses.update(ctx, id, &update).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        self.courses.delete(ctx, id).await
    }

    pub async fn require(&self, ctx: &TenantContext, id: i64) -> Result<Course, ServiceError> {
        self.courses.require(ctx, id).await
    }
}
