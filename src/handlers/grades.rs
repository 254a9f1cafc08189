use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{page, Deleted, DEFAULT_LIMIT};
use crate::app::AppState;
use crate::database::models::{Grade, GradeCreate};
use crate::database::Row;
use crate::middleware::{ApiResponse, ApiResult};
use crate::tenant::TenantContext;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub student_id: Option<i64>,
    pub assignment_id: Option<i64>,
}

/// POST /api/v1/grades
pub async fn create(State(state): State<AppState>, ctx: TenantContext, Json(payload): Json<GradeCreate>) -> ApiResult<Grade> {
    Ok(ApiResponse::created(state.grades.create(&ctx, payload).await?))
}

/// GET /api/v1/grades?student_id=&assignment_id=
pub async fn list(State(state): State<AppState>, ctx: TenantContext, Query(query): Query<ListQuery>) -> ApiResult<Vec<Grade>> {
    let grades = state
        .grades
        .list(
            &ctx,
            page(query.skip, query.limit, DEFAULT_LIMIT),
            query.student_id,
            query.assignment_id,
        )
        .await?;
    Ok(ApiResponse::success(grades))
}

/// GET /api/v1/grades/:id
pub async fn show(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Grade> {
    Ok(ApiResponse::success(state.grades.get(&ctx, id).await?))
}

/// PUT /api/v1/grades/:id - score and feedback only
pub async fn update(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(changes): Json<Row>,
) -> ApiResult<Grade> {
    Ok(ApiResponse::success(state.grades.update(&ctx, id, changes).await?))
}

/// DELETE /api/v1/grades/:id
pub async fn delete(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Deleted> {
    state.grades.delete(&ctx, id).await?;
    Ok(ApiResponse::success(Deleted::new("Grade")))
}
