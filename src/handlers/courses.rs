use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{page, Deleted, DEFAULT_LIMIT};
use crate::app::AppState;
use crate::database::models::{Course, CourseCreate};
use crate::database::Row;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::tenant::TenantContext;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub teacher_id: Option<i64>,
    #[serde(default)]
    pub active_only: bool,
}

/// POST /api/v1/courses
pub async fn create(State(state): State<AppState>, ctx: TenantContext, Json(payload): Json<CourseCreate>) -> ApiResult<Course> {
    Ok(ApiResponse::created(state.courses.create(&ctx, payload).await?))
}

/// GET /api/v1/courses?teacher_id=&active_only=
pub async fn list(State(state): State<AppState>, ctx: TenantContext, Query(query): Query<ListQuery>) -> ApiResult<Vec<Course>> {
    let courses = state
        .courses
        .list(
            &ctx,
            page(query.skip, query.limit, DEFAULT_LIMIT),
            query.teacher_id,
            query.active_only,
        )
        .await?;
    Ok(ApiResponse::success(courses))
}

/// GET /api/v1/courses/:id
pub async fn show(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Course> {
    Ok(ApiResponse::success(state.courses.get(&ctx, id).await?))
}

/// GET /api/v1/courses/by-code/:code
pub async fn by_code(State(state): State<AppState>, ctx: TenantContext, Path(code): Path<String>) -> ApiResult<Course> {
    let course = state
        .courses
        .get_by_code(&ctx, &code)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    Ok(ApiResponse::success(course))
}

/// PUT /api/v1/courses/:id
pub async fn update(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(changes): Json<Row>,
) -> ApiResult<Course> {
    Ok(ApiResponse::success(state.courses.update(&ctx, id, changes).await?))
}

/// DELETE /api/v1/courses/:id
pub async fn delete(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Deleted> {
    state.courses.delete(&ctx, id).await?;
    Ok(ApiResponse::success(Deleted::new("Course")))
}
