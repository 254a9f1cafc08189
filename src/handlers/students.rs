use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{page, Deleted, DEFAULT_LIMIT};
use crate::app::AppState;
use crate::database::models::{Student, StudentCreate};
use crate::database::Row;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::tenant::TenantContext;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub active_only: bool,
}

/// POST /api/v1/students
pub async fn create(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<StudentCreate>,
) -> ApiResult<Student> {
    Ok(ApiResponse::created(state.students.create(&ctx, payload).await?))
}

/// GET /api/v1/students
pub async fn list(State(state): State<AppState>, ctx: TenantContext, Query(query): Query<ListQuery>) -> ApiResult<Vec<Student>> {
    let students = state
        .students
        .list(&ctx, page(query.skip, query.limit, DEFAULT_LIMIT), query.active_only)
        .await?;
    Ok(ApiResponse::success(students))
}

/// GET /api/v1/students/:id
pub async fn show(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Student> {
    Ok(ApiResponse::success(state.students.get(&ctx, id).await?))
}

/// GET /api/v1/students/by-number/:number
pub async fn by_number(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(number): Path<String>,
) -> ApiResult<Student> {
    let student = state
        .students
        .get_by_number(&ctx, &number)
        .await?
        .ok_or_else(|| ApiError::not_found("Student not found"))?;
    Ok(ApiResponse::success(student))
}

/// PUT /api/v1/students/:id
pub async fn update(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(changes): Json<Row>,
) -> ApiResult<Student> {
    Ok(ApiResponse::success(state.students.update(&ctx, id, changes).await?))
}

/// DELETE /api/v1/students/:id
pub async fn delete(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Deleted> {
    state.students.delete(&ctx, id).await?;
    Ok(ApiResponse::success(Deleted::new("Student")))
}
