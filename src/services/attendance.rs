use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use super::{CourseService, Page, ScopedService, ServiceError, StudentService};
use crate::database::models::{Attendance, AttendanceCreate, Validate};
use crate::database::{Row, Store};
use crate::tenant::TenantContext;

#[derive(Clone)]
pub struct AttendanceService {
    records: ScopedService<Attendance>,
    students: StudentService,
    courses: CourseService,
}

/// Narrows an attendance listing; every field is optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceFilter {
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            records: ScopedService::new(store.clone()),
            students: StudentService::new(store.clone()),
            courses: CourseService::new(store),
        }
    }

    pub async fn create(&self, ctx: &TenantContext, payload: AttendanceCreate) -> Result<Attendance, ServiceError> {
        payload.validate()?;
        let tenant = self.records.stamp(ctx, payload.organization_id).await?;
        let scope = TenantContext::scoped(tenant);
        self.students.require(&scope, payload.student_id).await?;
        self.courses.require(&scope, payload.course_id).await?;

        let taken = json!({
            "student_id": payload.student_id,
            "course_id": payload.course_id,
            "date": payload.date,
        });
        if self.records.exists(&scope, taken).await? {
            return Err(ServiceError::Conflict(
                "Attendance already recorded for this student, course and date".to_string(),
            ));
        }
        self.records.insert(tenant, &payload).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<Attendance, ServiceError> {
        self.records.get_404(ctx, id).await
    }

    /// Most recent day first.
    pub async fn list(&self, ctx: &TenantContext, page: Page, filter: AttendanceFilter) -> Result<Vec<Attendance>, ServiceError> {
        let mut where_clause = Map::new();
        if let Some(student_id) = filter.student_id {
            where_clause.insert("student_id".to_string(), json!(student_id));
        }
        if let Some(course_id) = filter.course_id {
            where_clause.insert("course_id".to_string(), json!(course_id));
        }
        if let Some(date) = filter.date {
            where_clause.insert("date".to_string(), json!(date));
        }
        self.records
            .list(ctx, Value::Object(where_clause), json!("date desc, id asc"), page)
            .await
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, changes: Row) -> Result<Attendance, ServiceError> {
        let update = self.records.parse_update(ctx, changes)?;
        self.records.update(ctx, id, &update).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        self.records.delete(ctx, id).await
    }
}
