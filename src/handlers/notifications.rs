use axum::{
    extract::{Path, State},
    Json,
};

use super::Deleted;
use crate::app::AppState;
use crate::database::models::{Notification, NotificationCreate};
use crate::database::Row;
use crate::middleware::{ApiResponse, ApiResult};
use crate::tenant::TenantContext;

/// POST /api/v1/notifications
pub async fn create(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<NotificationCreate>,
) -> ApiResult<Notification> {
    Ok(ApiResponse::created(state.notifications.create(&ctx, payload).await?))
}

/// GET /api/v1/notifications/:id
pub async fn show(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Notification> {
    Ok(ApiResponse::success(state.notifications.get(&ctx, id).await?))
}

/// PUT /api/v1/notifications/:id
pub async fn update(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(changes): Json<Row>,
) -> ApiResult<Notification> {
    Ok(ApiResponse::success(state.notifications.update(&ctx, id, changes).await?))
}

/// POST /api/v1/notifications/:id/read
pub async fn mark_read(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Notification> {
    Ok(ApiResponse::success(state.notifications.mark_as_read(&ctx, id).await?))
}

/// POST /api/v1/notifications/:id/delivered
pub async fn mark_delivered(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> ApiResult<Notification> {
    Ok(ApiResponse::success(state.notifications.mark_as_delivered(&ctx, id).await?))
}

/// DELETE /api/v1/notifications/:id
pub async fn delete(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Deleted> {
    state.notifications.delete(&ctx, id).await?;
    Ok(ApiResponse::success(Deleted::new("Notification")))
}
