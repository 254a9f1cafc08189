use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::{AssignmentService, Page, ScopedService, ServiceError, StudentService};
use crate::database::models::grade::check_score_within;
use crate::database::models::{Grade, GradeCreate, Validate};
use crate::database::{Row, Store};
use crate::tenant::TenantContext;

#[derive(Clone)]
pub struct GradeService {
    grades: ScopedService<Grade>,
    students: StudentService,
    assignments: AssignmentService,
}

impl GradeService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            grades: ScopedService::new(store.clone()),
            students: StudentService::new(store.clone()),
            assignments: AssignmentService::new(store),
        }
    }

    async fn ensure_ungraded(&self, ctx: &TenantContext, student_id: i64, assignment_id: i64) -> Result<(), ServiceError> {
        let where_clause = json!({ "student_id": student_id, "assignment_id": assignment_id });
        if self.grades.exists(ctx, where_clause).await? {
            return Err(ServiceError::Conflict("Student already has a grade for this assignment".to_string()));
        }
        Ok(())
    }

    pub async fn create(&self, ctx: &TenantContext, payload: GradeCreate) -> Result<Grade, ServiceError> {
        payload.validate()?;
        let tenant = self.grades.stamp(ctx, payload.organization_id).await?;
        let scope = TenantContext::scoped(tenant);
        self.students.require(&scope, payload.student_id).await?;
        let assignment = self.assignments.require(&scope, payload.assignment_id).await?;
        check_score_within(payload.score, assignment.total_points)?;
        self.ensure_ungraded(&scope, payload.student_id, payload.assignment_id)
            .await?;
        self.grades.insert(tenant, &payload).await
    }

    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<Grade, ServiceError> {
        self.grades.get_404(ctx, id).await
    }

    pub async fn list(
        &self,
        ctx: &TenantContext,
        page: Page,
        student_id: Option<i64>,
        assignment_id: Option<i64>,
    ) -> Result<Vec<Grade>, ServiceError> {
        let mut where_clause = Map::new();
        if let Some(student_id) = student_id {
            where_clause.insert("student_id".to_string(), json!(student_id));
        }
        if let Some(assignment_id) = assignment_id {
            where_clause.insert("assignment_id".to_string(), json!(assignment_id));
        }
        self.grades
            .list(ctx, Value::Object(where_clause), json!("id asc"), page)
            .await
    }

    pub async fn update(&self, ctx: &TenantContext, id: i64, changes: Row) -> Result<Grade, ServiceError> {
        let update = self.grades.parse_update(ctx, changes)?;
        let current = self.grades.get_404(ctx, id).await?;
        if let Some(score) = update.score {
            let assignment = self
                .assignments
                .require(&TenantContext::scoped(current.organization_id), current.assignment_id)
                .await?;
            check_score_within(score, assignment.total_points)?;
        }
        self.grades.update(ctx, id, &update).await
    }

    pub async fn delete(&self, ctx: &TenantContext, id: i64) -> Result<(), ServiceError> {
        self.grades.delete(ctx, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::OrganizationCreate;
    use crate::database::MemoryStore;
    use crate::services::{CourseService, OrganizationService, UserService};
    use crate::tenant::OrganizationId;

    struct Seeded {
        grades: GradeService,
        org_a: OrganizationId,
        org_b: OrganizationId,
        student: i64,
        assignment: i64,
    }

    /// Two tenants; a student and a 50-point assignment in the first.
    async fn seeded() -> Seeded {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let orgs = OrganizationService::new(store.clone());
        let mut ids = vec![];
        for code in ["A", "B"] {
            let payload: OrganizationCreate = serde_json::from_value(json!({ "name": code, "code": code })).unwrap();
            ids.push(orgs.create(payload).await.unwrap().id);
        }
        let ctx = TenantContext::scoped(ids[0]);

        let users = UserService::new(store.clone());
        let teacher = users
            .create(&ctx, serde_json::from_value(json!({ "email": "t@a.edu", "role": "teacher" })).unwrap())
            .await
            .unwrap();
        let kid = users
            .create(&ctx, serde_json::from_value(json!({ "email": "k@a.edu", "role": "student" })).unwrap())
            .await
            .unwrap();
        let student = StudentService::new(store.clone())
            .create(&ctx, serde_json::from_value(json!({ "user_id": kid.id, "student_number": "S1" })).unwrap())
            .await
            .unwrap();
        let course = CourseService::new(store.clone())
            .create(
                &ctx,
                serde_json::from_value(json!({ "title": "Art", "code": "ART", "teacher_id": teacher.id })).unwrap(),
            )
            .await
            .unwrap();
        let assignment = AssignmentService::new(store.clone())
            .create(
                &ctx,
                serde_json::from_value(json!({
                    "course_id": course.id,
                    "title": "Portfolio",
                    "due_date": "2026-12-01T00:00:00Z",
                    "total_points": 50.0
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        Seeded {
            grades: GradeService::new(store),
            org_a: ids[0],
            org_b: ids[1],
            student: student.id,
            assignment: assignment.id,
        }
    }

    fn payload(student: i64, assignment: i64, score: f64) -> GradeCreate {
        serde_json::from_value(json!({ "student_id": student, "assignment_id": assignment, "score": score })).unwrap()
    }

    #[tokio::test]
    async fn one_grade_per_student_and_assignment() {
        let s = seeded().await;
        let ctx = TenantContext::scoped(s.org_a);

        let grade = s.grades.create(&ctx, payload(s.student, s.assignment, 42.0)).await.unwrap();
        assert_eq!(grade.organization_id, s.org_a);

        let again = s.grades.create(&ctx, payload(s.student, s.assignment, 10.0)).await;
        assert!(matches!(again, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn score_is_capped_by_assignment_points() {
        let s = seeded().await;
        let ctx = TenantContext::scoped(s.org_a);

        let over = s.grades.create(&ctx, payload(s.student, s.assignment, 51.0)).await;
        assert!(matches!(over, Err(ServiceError::Validation(e)) if e.field == "score"));

        let grade = s.grades.create(&ctx, payload(s.student, s.assignment, 50.0)).await.unwrap();
        let raise = s
            .grades
            .update(&ctx, grade.id, json!({ "score": 60.0 }).as_object().cloned().unwrap())
            .await;
        assert!(matches!(raise, Err(ServiceError::Validation(_))));

        let updated = s
            .grades
            .update(&ctx, grade.id, json!({ "score": 45.5, "feedback": "Good" }).as_object().cloned().unwrap())
            .await
            .unwrap();
        assert_eq!(updated.score, 45.5);
        assert_eq!(updated.feedback.as_deref(), Some("Good"));
    }

    #[tokio::test]
    async fn references_resolve_inside_the_tenant_only() {
        let s = seeded().await;
        let other = TenantContext::scoped(s.org_b);

        let foreign = s.grades.create(&other, payload(s.student, s.assignment, 1.0)).await;
        assert!(matches!(foreign, Err(ServiceError::InvalidReference(msg)) if msg == format!("Student {} not found", s.student)));

        let grade = s
            .grades
            .create(&TenantContext::scoped(s.org_a), payload(s.student, s.assignment, 1.0))
            .await
            .unwrap();
        assert!(matches!(s.grades.get(&other, grade.id).await, Err(ServiceError::NotFound(_))));
        assert!(s.grades.list(&other, Page::new(0, 10), None, None).await.unwrap().is_empty());
        assert_eq!(
            s.grades
                .list(&TenantContext::none(), Page::new(0, 10), Some(s.student), None)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
