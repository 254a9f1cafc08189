use std::sync::Arc;

use serde_json::{json, Value};

use super::{Page, ScopedService, ServiceError, UserService};
use crate::database::models::{Student, StudentCreate, Validate};
use crate::database::{Row, Store};
use crate::tenant::TenantContext;

#[derive(Clone)]
pub struct StudentService {
    students: ScopedService<Student>,
    users: UserService,
}

impl StudentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            students: ScopedService::new(store.clone()),
            users: UserService::new(store),
        }
    }

    async fn ensure_number_free(&self, ctx: &TenantContext, number: &str, except: Option<i64>) -> Result<(), ServiceError> {
        let mut where_clause = json!({ "student_number": number });
        if let Some(id) = except {
            where_clause["id"] = json!({ "$ne": id });
        }
        if self.students.exists(ctx, where_clause).await? {
            return Err(ServiceError::Conflict("Student with this student number already exists".to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, ctx: &TenantContext, payload: StudentCreate) -> Result<Student, ServiceError> {
        payload.validate()?;
        let tenant = self.students.stamp(ctx, payload.organization_id).await?;
        let scope = TenantContext::scoped(tenant);
        self.users.require(&scope, payload.user_id).await?;
        self.ensure_number_free(&scope, &payload.student_number, None).await?;
        self.students.insert(tenant, &payload).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<Student, ServiceError> {
        self.students.get_404(ctx, id).await
    }

    pub async fn get_by_number(&self, ctx: &TenantContext, number: &str) -> Result<Option<Student>, ServiceError> {
        self.students.find_one(ctx, json!({ "student_number": number })).await
    }

    pub async fn list(&self, ctx: &TenantContext, page: Page, active_only: bool) -> Result<Vec<Student>, ServiceError> {
        let where_clause = if active_only { json!({ "is_active": true }) } else { Value::Null };
        self.students.list(ctx, where_clause, json!("id asc"), page).await
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, changes: Row) -> Result<Student, ServiceError> {
        let update = self.students.parse_update(ctx, changes)?;
        let current = self.students.get_404(ctx, id).await?;
        let scope = TenantContext::scoped(current.organization_id);

        if let Some(user_id) = update.user_id.filter(|u| *u != current.user_id) {
            self.users.require(&scope, user_id).await?;
        }
        if let Some(number) = update.student_number.as_deref().filter(|n| *n != current.student_number) {
            self.ensure_number_free(&scope, number, Some(id)).await?;
        }
        self.students.update(ctx, id, &update).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        self.students.delete(ctx, id).await
    }

    pub async fn require(&self, ctx: &TenantContext, id: i64) -> Result<Student, ServiceError> {
        self.students.require(ctx, id).await
    }
}
