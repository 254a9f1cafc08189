use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{page, Deleted, DEFAULT_LIMIT};
use crate::app::AppState;
use crate::database::models::{Assignment, AssignmentCreate};
use crate::database::Row;
use crate::middleware::{ApiResponse, ApiResult};
use crate::tenant::TenantContext;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub course_id: Option<i64>,
    #[serde(default)]
    pub active_only: bool,
}

/// POST /api/v1/assignments
pub async fn create(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<AssignmentCreate>,
) -> ApiResult<Assignment> {
    Ok(ApiResponse::created(state.assignments.create(&ctx, payload).await?))
}

/// GET /api/v1/assignments?course_id=&active_only=
pub async fn list(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Assignment>> {
    let assignments = state
        .assignments
        .list(
            &ctx,
            page(query.skip, query.limit, DEFAULT_LIMIT),
            query.course_id,
            query.active_only,
        )
        .await?;
    Ok(ApiResponse::success(assignments))
}

/// GET /api/v1/assignments/:id
pub async fn show(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Assignment> {
    Ok(ApiResponse::success(state.assignments.get(&ctx, id).await?))
}

/// PUT /api/v1/assignments/:id
pub async fn update(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(changes): Json<Row>,
) -> ApiResult<Assignment> {
    Ok(ApiResponse::success(state.assignments.update(&ctx, id, changes).await?))
}

/// DELETE /api/v1/assignments/:id
pub async fn delete(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Deleted> {
    state.assignments.delete(&ctx, id).await?;
    Ok(ApiResponse::success(Deleted::new("Assignment")))
}
