use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{page, Deleted, DEFAULT_LIMIT};
use crate::app::AppState;
use crate::database::models::{Notification, User, UserCreate};
use crate::database::Row;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::tenant::TenantContext;

const NOTIFICATIONS_LIMIT: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct NotificationsQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub unread_only: bool,
}

/// POST /api/v1/users
pub async fn create(State(state): State<AppState>, ctx: TenantContext, Json(payload): Json<UserCreate>) -> ApiResult<User> {
    Ok(ApiResponse::created(state.users.create(&ctx, payload).await?))
}

/// GET /api/v1/users
pub async fn list(State(state): State<AppState>, ctx: TenantContext, Query(query): Query<ListQuery>) -> ApiResult<Vec<User>> {
    let users = state
        .users
        .list(&ctx, page(query.skip, query.limit, DEFAULT_LIMIT), query.active_only)
        .await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/v1/users/:id
pub async fn show(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.get(&ctx, id).await?))
}

/// GET /api/v1/users/by-email/:email
pub async fn by_email(State(state): State<AppState>, ctx: TenantContext, Path(email): Path<String>) -> ApiResult<User> {
    let user = state
        .users
        .get_by_email(&ctx, &email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/v1/users/:id
pub async fn update(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(changes): Json<Row>,
) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.update(&ctx, id, changes).await?))
}

/// DELETE /api/v1/users/:id
pub async fn delete(State(state): State<AppState>, ctx: TenantContext, Path(id): Path<i64>) -> ApiResult<Deleted> {
    state.users.delete(&ctx, id).await?;
    Ok(ApiResponse::success(Deleted::new("User")))
}

/// GET /api/v1/users/:id/notifications - newest first, 10 per page by default
pub async fn notifications(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Query(query): Query<NotificationsQuery>,
) -> ApiResult<Vec<Notification>> {
    let user = state.users.get(&ctx, id).await?;
    let notifications = state
        .notifications
        .list_for_user(&ctx, user.id, page(query.skip, query.limit, NOTIFICATIONS_LIMIT), query.unread_only)
        .await?;
    Ok(ApiResponse::success(notifications))
}
