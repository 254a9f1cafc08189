use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{page, Deleted, DEFAULT_LIMIT};
use crate::app::AppState;
use crate::database::models::{Attendance, AttendanceCreate};
use crate::database::Row;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AttendanceFilter;
use crate::tenant::TenantContext;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub student_id: Option<i64>,
    pub course_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

/// POST /api/v1/attendance
pub async fn create(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<AttendanceCreate>,
) -> ApiResult<Attendance> {
    Ok(ApiResponse::created(state.attendance.create(&ctx, payload).await?))
}

/// GET /api/v1/attendance?student_id=&course_id=&date=
pub async fn list(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Attendance>> {
    let filter = AttendanceFilter {
        student_id: query.student_id,
        course_id: query.course_id,
        date: query.date,
    };
    let records = state
        .attendance
        .list(&ctx, page(query.skip, query.limit, DEFAULT_LIMIT), filter)
        .await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/v1/attendance/:id
pub async fn show(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Attendance> {
    Ok(ApiResponse::success(state.attendance.get(&ctx, id).await?))
}

/// PUT /api/v1/attendance/:id - status and remarks only
pub async fn update(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(changes): Json<Row>,
) -> ApiResult<Attendance> {
    Ok(ApiResponse::success(state.attendance.update(&ctx, id, changes).await?))
}

/// DELETE /api/v1/attendance/:id
pub async fn delete(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Deleted> {
    state.attendance.delete(&ctx, id).await?;
    Ok(ApiResponse::success(Deleted::new("Attendance record")))
}
