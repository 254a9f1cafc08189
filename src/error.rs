// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::services::ServiceError;
use crate::tenant::TenantError;

/// Message shared by unknown and inactive tenants; callers cannot tell
/// which organizations exist.
pub const TENANT_UNAVAILABLE: &str = "Organization not found or inactive";

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidTenantId(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity (validation but semantically valid JSON)
    UnprocessableEntity {
        message: String,
        field_errors: HashMap<String, String>,
    },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidTenantId(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::UnprocessableEntity { .. } => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidTenantId(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::UnprocessableEntity { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            ApiError::UnprocessableEntity { message, field_errors } => {
                json!({
                    "error": true,
                    "message": message,
                    "code": "UNPROCESSABLE_ENTITY",
                    "field_errors": field_errors
                })
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidTenantId(_) => "INVALID_TENANT_ID",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UnprocessableEntity { .. } => "UNPROCESSABLE_ENTITY",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn unprocessable_entity(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ApiError::UnprocessableEntity {
            message: message.into(),
            field_errors,
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::ConfigMissing(key) => {
                tracing::error!("Database configuration missing: {}", key);
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::QueryError(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            DatabaseError::Sqlx(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::warn!(constraint = ?db_err.constraint(), "unique constraint violated");
                ApiError::conflict("Resource already exists")
            }
            DatabaseError::Sqlx(sqlx::Error::Database(db_err))
                if db_err.is_foreign_key_violation() || db_err.is_check_violation() =>
            {
                tracing::warn!(constraint = ?db_err.constraint(), "constraint violated: {}", db_err.message());
                let mut field_errors = HashMap::new();
                if let Some(constraint) = db_err.constraint() {
                    field_errors.insert("constraint".to_string(), constraint.to_string());
                }
                let message = if db_err.is_foreign_key_violation() {
                    "Referenced record not found"
                } else {
                    "Value violates a table constraint"
                };
                ApiError::unprocessable_entity(message, field_errors)
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) => {
                tracing::error!("Database pool timed out");
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::SystemField(_) | ServiceError::ImmutableField(_) | ServiceError::MissingTenant => ApiError::bad_request(err.to_string()),
            ServiceError::Validation(field_error) => {
                let mut field_errors = HashMap::new();
                field_errors.insert(field_error.field.to_string(), field_error.message.clone());
                ApiError::unprocessable_entity(format!("Invalid field {}", field_error), field_errors)
            }
            ServiceError::InvalidReference(msg) | ServiceError::InvalidPayload(msg) => {
                ApiError::unprocessable_entity(msg, HashMap::new())
            }
            ServiceError::Database(db_err) => db_err.into(),
            ServiceError::Decode(label, e) => {
                tracing::error!("Failed to decode {} row: {}", label, e);
                ApiError::internal_server_error("Failed to format response")
            }
        }
    }
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::MalformedTenantId(raw) => {
                ApiError::InvalidTenantId(format!("Invalid tenant ID format: {}", raw))
            }
            TenantError::TenantNotFound(_) | TenantError::TenantInactive(_) => ApiError::not_found(TENANT_UNAVAILABLE),
            TenantError::Lookup(service_err) => service_err.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::FieldError;

    #[test]
    fn malformed_tenant_is_bad_request() {
        let err: ApiError = TenantError::MalformedTenantId("abc".to_string()).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_json()["code"], "INVALID_TENANT_ID");
    }

    #[test]
    fn missing_and_inactive_tenants_look_identical() {
        let missing: ApiError = TenantError::TenantNotFound(7).into();
        let inactive: ApiError = TenantError::TenantInactive(7).into();
        assert_eq!(missing.status_code(), 404);
        assert_eq!(missing.to_json(), inactive.to_json());
        assert_eq!(missing.message(), TENANT_UNAVAILABLE);
    }

    #[test]
    fn service_errors_map_to_statuses() {
        let cases: Vec<(ServiceError, u16)> = vec![
            (ServiceError::NotFound("Course not found".into()), 404),
            (ServiceError::Conflict("dup".into()), 409),
            (ServiceError::SystemField("id".into()), 400),
            (ServiceError::ImmutableField("organization_id"), 400),
            (ServiceError::MissingTenant, 400),
            (ServiceError::InvalidReference("User 5 not found".into()), 422),
            (
                ServiceError::Validation(FieldError {
                    field: "gpa",
                    message: "must be between 0.0 and 5.0".into(),
                }),
                422,
            ),
            (ServiceError::Database(DatabaseError::QueryError("boom".into())), 500),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[derive(Debug)]
    struct ConstraintViolation(fn() -> sqlx::error::ErrorKind);

    impl std::fmt::Display for ConstraintViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "constraint violated")
        }
    }

    impl std::error::Error for ConstraintViolation {}

    impl sqlx::error::DatabaseError for ConstraintViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }
        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
        fn constraint(&self) -> Option<&str> {
            Some("users_organization_id_email_key")
        }
        fn kind(&self) -> sqlx::error::ErrorKind {
            (self.0)()
        }
    }

    fn violation(kind: fn() -> sqlx::error::ErrorKind) -> ApiError {
        let err = sqlx::Error::Database(Box::new(ConstraintViolation(kind)));
        ServiceError::Database(DatabaseError::Sqlx(err)).into()
    }

    #[test]
    fn constraint_violations_are_client_errors() {
        let unique = violation(|| sqlx::error::ErrorKind::UniqueViolation);
        assert_eq!(unique.status_code(), 409);
        assert_eq!(unique.error_code(), "CONFLICT");

        let foreign = violation(|| sqlx::error::ErrorKind::ForeignKeyViolation);
        assert_eq!(foreign.status_code(), 422);
        assert_eq!(foreign.message(), "Referenced record not found");

        let check = violation(|| sqlx::error::ErrorKind::CheckViolation);
        assert_eq!(check.status_code(), 422);

        let other = violation(|| sqlx::error::ErrorKind::Other);
        assert_eq!(other.status_code(), 500);
    }

    #[test]
    fn internal_details_are_hidden() {
        let err: ApiError = DatabaseError::QueryError("relation \"x\" does not exist".into()).into();
        assert!(!err.message().contains("relation"));
    }
}
