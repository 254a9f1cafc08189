use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{CourseService, Page, ScopedService, ServiceError};
use crate::database::models::{Assignment, AssignmentCreate, Validate};
use crate::database::{Row, Store};
use crate::tenant::TenantContext;

#[derive(Clone)]
pub struct AssignmentService {
    assignments: ScopedService<Assignment>,
    courses: CourseService,
}

impl AssignmentService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            assignments: ScopedService::new(store.clone()),
            courses: CourseService::new(store),
        }
    }

    pub async fn create(&self, ctx: &TenantContext, payload: AssignmentCreate) -> Result<Assignment, ServiceError> {
        payload.validate()?;
        let tenant = self.assignments.stamp(ctx, payload.organization_id).await?;
        self.courses
            .require(&TenantContext::scoped(tenant), payload.course_id)
            .await?;
        self.assignments.insert(tenant, &payload).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<Assignment, ServiceError> {
        self.assignments.get_404(ctx, id).await
    }

    /// Ordered by due date, soonest first.
    pub async fn list(
        &self,
        ctx: &TenantContext,
        page: Page,
        course_id: Option<i64>,
        active_only: bool,
    ) -> Result<Vec<Assignment>, ServiceError> {
        let mut where_clause = Map::new();
        if let Some(course_id) = course_id {
            where_clause.insert("course_id".to_string(), json!(course_id));
        }
        if active_only {
            where_clause.insert("is_active".to_string(), json!(true));
        }
        self.assignments
            .list(ctx, Value::Object(where_clause), json!("due_date asc, id asc"), page)
            .await
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, changes: Row) -> Result<Assignment, ServiceError> {
        let update = self.assignments.parse_update(ctx, changes)?;
        let current = self.assignments.get_404(ctx, id).await?;
        if let Some(course_id) = update.course_id.filter(|c| *c != current.course_id) {
            self.courses
                .require(&TenantContext::scoped(current.organization_id), course_id)
                .await?;
        }
        self.assignments.update(ctx, id, &update).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        self.assignments.delete(ctx, id).await
    }

    pub async fn require(&self, ctx: &TenantContext, id: i64) -> Result<Assignment, ServiceError> {
        self.assignments.require(ctx, id).await
    }
}
