use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FieldError, TenantScoped, Validate};
use crate::tenant::OrganizationId;

/// A student's score on one assignment. At most one per student and assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub student_id: i64,
    pub assignment_id: i64,
    pub score: f64,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for Grade {
    const TABLE: &'static str = "grades";
    const LABEL: &'static str = "Grade";
    type Update = GradeUpdate;

    fn id(&self) -> i64 {
        self.id
    }

    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

fn check_score(score: Option<f64>) -> Result<(), FieldError> {
    match score {
        Some(value) if !value.is_finite() || value < 0.0 => Err(FieldError {
            field: "score",
            message: "must be a non-negative number".to_string(),
        }),
        _ => Ok(()),
    }
}

/// The ceiling is the assignment's `total_points`, which only the service knows.
pub fn check_score_within(score: f64, total_points: f64) -> Result<(), FieldError> {
    if score > total_points {
        return Err(FieldError {
            field: "score",
            message: format!("must not exceed the assignment's {} total points", total_points),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeCreate {
    #[serde(default, skip_serializing)]
    pub organization_id: Option<OrganizationId>,
    pub student_id: i64,
    pub assignment_id: i64,
    pub score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl Validate for GradeCreate {
    fn validate(&self) -> Result<(), FieldError> {
        check_score(Some(self.score))
    }
}

/// Only the mark itself changes; a grade never moves to another student or assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl Validate for GradeUpdate {
    fn validate(&self) -> Result<(), FieldError> {
        check_score(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn score_bounds() {
        let create: GradeCreate =
            serde_json::from_value(json!({ "student_id": 1, "assignment_id": 2, "score": -1.0 })).unwrap();
        assert_eq!(create.validate().unwrap_err().field, "score");

        assert!(check_score_within(100.0, 100.0).is_ok());
        assert!(check_score_within(100.5, 100.0).is_err());
    }

    #[test]
    fn update_refuses_to_move_a_grade() {
        let moved = serde_json::from_value::<GradeUpdate>(json!({ "student_id": 9 }));
        assert!(moved.is_err());
    }
}
