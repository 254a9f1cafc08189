use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, TenantConfig};
use crate::database::Store;
use crate::handlers;
use crate::middleware::resolve_tenant_middleware;
use crate::services::{
    AssignmentService, AttendanceService, CourseService, GradeService, NotificationService, OrganizationService,
    StudentService, UserService,
};
use crate::tenant::TenantResolver;

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub organizations: OrganizationService,
    pub users: UserService,
    pub students: StudentService,
    pub courses: CourseService,
    pub assignments: AssignmentService,
    pub grades: GradeService,
    pub attendance: AttendanceService,
    pub notifications: NotificationService,
    pub resolver: Arc<TenantResolver>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tenant: &TenantConfig) -> Self {
        Self {
            organizations: OrganizationService::new(store.clone()),
            users: UserService::new(store.clone()),
            students: StudentService::new(store.clone()),
            courses: CourseService::new(store.clone()),
            assignments: AssignmentService::new(store.clone()),
            grades: GradeService::new(store.clone()),
            attendance: AttendanceService::new(store.clone()),
            notifications: NotificationService::new(store.clone()),
            resolver: Arc::new(TenantResolver::new(tenant)),
            store,
        }
    }
}

/// Router with default development settings (permissive CORS).
pub fn app(state: AppState) -> Router {
    app_with_config(state, &AppConfig::development())
}

pub fn app_with_config(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(organization_routes())
        .merge(user_routes())
        .merge(student_routes())
        .merge(course_routes())
        .merge(assignment_routes())
        .merge(grade_routes())
        .merge(attendance_routes())
        .merge(notification_routes())
        .layer(middleware::from_fn_with_state(state.clone(), resolve_tenant_middleware))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = if config.security.enable_cors {
        router.layer(cors_layer(&config.security.cors_origins))
    } else {
        router
    };

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn organization_routes() -> Router<AppState> {
    use handlers::organizations;

    Router::new()
        .route("/api/v1/organizations", post(organizations::create).get(organizations::list))
        .route(
            "/api/v1/organizations/:id",
            get(organizations::show)
                .put(organizations::update)
                .delete(organizations::delete),
        )
        .route("/api/v1/organizations/by-code/:code", get(organizations::by_code))
        .route("/api/v1/organizations/by-domain/:domain", get(organizations::by_domain))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/api/v1/users", post(users::create).get(users::list))
        .route("/api/v1/users/:id", get(users::show).put(users::update).delete(users::delete))
        .route("/api/v1/users/:id/notifications", get(users::notifications))
        .route("/api/v1/users/by-email/:email", get(users::by_email))
}

fn student_routes() -> Router<AppState> {
    use handlers::students;

    Router::new()
        .route("/api/v1/students", post(students::create).get(students::list))
        .route(
            "/api/v1/students/:id",
            get(students::show).put(students::update).delete(students::delete),
        )
        .route("/api/v1/students/by-number/:number", get(students::by_number))
}

fn course_routes() -> Router<AppState> {
    use handlers::courses;

    Router::new()
        .route("/api/v1/courses", post(courses::create).get(courses::list))
        .route("/api/v1/courses/:id", get(courses::show).put(courses::update).delete(courses::delete))
        .route("/api/v1/courses/by-code/:code", get(courses::by_code))
}

fn assignment_routes() -> Router<AppState> {
    use handlers::assignments;

    Router::new()
        .route("/api/v1/assignments", post(assignments::create).get(assignments::list))
        .route(
            "/api/v1/assignments/:id",
            get(assignments::show)
                .put(assignments::update)
                .delete(assignments::delete),
        )
}

fn grade_routes() -> Router<AppState> {
    use handlers::grades;

    Router::new()
        .route("/api/v1/grades", post(grades::create).get(grades::list))
        .route("/api/v1/grades/:id", get(grades::show).put(grades::update).delete(grades::delete))
}

fn attendance_routes() -> Router<AppState> {
    use handlers::attendance;

    Router::new()
        .route("/api/v1/attendance", post(attendance::create).get(attendance::list))
        .route(
            "/api/v1/attendance/:id",
            get(attendance::show)
                .put(attendance::update)
                .delete(attendance::delete),
        )
}

fn notification_routes() -> Router<AppState> {
    use handlers::notifications;

    Router::new()
        .route("/api/v1/notifications", post(notifications::create))
        .route(
            "/api/v1/notifications/:id",
            get(notifications::show)
                .put(notifications::update)
                .delete(notifications::delete),
        )
        .route("/api/v1/notifications/:id/read", post(notifications::mark_read))
        .route("/api/v1/notifications/:id/delivered", post(notifications::mark_delivered))
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Education ERP API",
            "version": version,
            "description": "Multi-tenant education administration API",
            "tenancy": {
                "header": state.resolver.header_name(),
                "query_param": state.resolver.query_param_name()
            },
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "organizations": "/api/v1/organizations[/:id|/by-code/:code|/by-domain/:domain] (tenant administration, unscoped)",
                "users": "/api/v1/users[/:id|/by-email/:email] (tenant-scoped)",
                "students": "/api/v1/students[/:id|/by-number/:number] (tenant-scoped)",
                "courses": "/api/v1/courses[/:id|/by-code/:code] (tenant-scoped)",
                "assignments": "/api/v1/assignments[/:id] (tenant-scoped)",
                "grades": "/api/v1/grades[/:id] (tenant-scoped)",
                "attendance": "/api/v1/attendance[/:id] (tenant-scoped)",
                "notifications": "/api/v1/notifications/:id (tenant-scoped)"
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": state.store.kind(),
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "store": state.store.kind(),
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
