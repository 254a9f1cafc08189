use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{check_len, check_opt_len, default_true, FieldError, TenantScoped, Validate};
use crate::tenant::OrganizationId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub user_id: i64,
    pub student_number: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub graduation_date: Option<NaiveDate>,
    pub current_grade: Option<String>,
    pub gpa: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for Student {
    const TABLE: &'static str = "students";
    const LABEL: &'static str = "Student";
    type Update = StudentUpdate;

    fn id(&self) -> i64 {
        self.id
    }

    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentCreate {
    #[serde(default, skip_serializing)]
    pub organization_id: Option<OrganizationId>,
    pub user_id: i64,
    pub student_number: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(default)]
    pub graduation_date: Option<NaiveDate>,
    #[serde(default)]
    pub current_grade: Option<String>,
    #[serde(default)]
    pub gpa: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn check_gpa(gpa: Option<f64>) -> Result<(), FieldError> {
    match gpa {
        Some(value) if !(0.0..=5.0).contains(&value) => Err(FieldError {
            field: "gpa",
            message: "must be between 0.0 and 5.0".to_string(),
        }),
        _ => Ok(()),
    }
}

impl Validate for StudentCreate {
    fn validate(&self) -> Result<(), FieldError> {
        check_len("student_number", &self.student_number, 1, Some(50))?;
        check_opt_len("current_grade", self.current_grade.as_deref(), 0, Some(20))?;
        check_gpa(self.gpa)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for StudentUpdate {
    fn validate(&self) -> Result<(), FieldError> {
        check_opt_len("student_number", self.student_number.as_deref(), 1, Some(50))?;
        check_opt_len("current_grade", self.current_grade.as_deref(), 0, Some(20))?;
        check_gpa(self.gpa)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_dates_and_rejects_bad_gpa() {
        let create: StudentCreate = serde_json::from_value(json!({
            "user_id": 3,
            "student_number": "S-0001",
            "date_of_birth": "2008-04-12",
            "gpa": 7.5
        }))
        .unwrap();
        assert_eq!(create.date_of_birth, NaiveDate::from_ymd_opt(2008, 4, 12));
        assert_eq!(create.validate().unwrap_err().field, "gpa");
    }

    #[test]
    fn explicit_organization_is_not_serialized() {
        let create: StudentCreate =
            serde_json::from_value(json!({ "organization_id": 4, "user_id": 3, "student_number": "S-1" })).unwrap();
        assert_eq!(create.organization_id, Some(4));
        assert!(serde_json::to_value(&create).unwrap().get("organization_id").is_none());
    }
}
