use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{check_len, check_opt_len, FieldError, TenantScoped, Validate};
use crate::tenant::OrganizationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    System,
    Course,
    Assignment,
    Grade,
    Announcement,
    Message,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub organization_id: OrganizationId,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub is_read: bool,
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantScoped for Notification {
    const TABLE: &'static str = "notifications";
    const LABEL: &'static str = "Notification";
    type Update = NotificationUpdate;

    fn id(&self) -> i64 {
        self.id
    }

    fn organization_id(&self) -> OrganizationId {
        self.organization_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationCreate {
    #[serde(default, skip_serializing)]
    pub organization_id: Option<OrganizationId>,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    #[serde(default)]
    pub priority: NotificationPriority,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_delivered: bool,
}

impl Validate for NotificationCreate {
    fn validate(&self) -> Result<(), FieldError> {
        check_len("title", &self.title, 1, Some(255))?;
        check_len("message", &self.message, 1, None)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<NotificationPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_delivered: Option<bool>,
}

impl Validate for NotificationUpdate {
    fn validate(&self) -> Result<(), FieldError> {
        check_opt_len("title", self.title.as_deref(), 1, Some(255))?;
        check_opt_len("message", self.message.as_deref(), 1, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn priority_defaults_to_medium() {
        let create: NotificationCreate = serde_json::from_value(json!({
            "user_id": 1,
            "title": "Grades posted",
            "message": "Term 1 grades are available",
            "notification_type": "grade"
        }))
        .unwrap();
        assert_eq!(create.priority, NotificationPriority::Medium);
        assert!(!create.is_read);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let parsed = serde_json::from_value::<NotificationCreate>(json!({
            "user_id": 1,
            "title": "x",
            "message": "y",
            "notification_type": "carrier-pigeon"
        }));
        assert!(parsed.is_err());
    }
}
