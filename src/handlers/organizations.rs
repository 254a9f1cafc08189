use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{page, Deleted};
use crate::app::AppState;
use crate::database::models::{Organization, OrganizationCreate};
use crate::database::Row;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::tenant::OrganizationId;

/// Organization listings are small pages: 10 by default, at most 100.
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub active_only: bool,
}

/// POST /api/v1/organizations
pub async fn create(State(state): State<AppState>, Json(payload): Json<OrganizationCreate>) -> ApiResult<Organization> {
    let organization = state.organizations.create(payload).await?;
    Ok(ApiResponse::created(organization))
}

/// GET /api/v1/organizations
pub async fn list(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<Organization>> {
    match query.limit {
        Some(0) => return Err(limit_error("must be at least 1")),
        Some(limit) if limit > MAX_LIMIT => return Err(limit_error("must be at most 100")),
        _ => {}
    }
    let organizations = state
        .organizations
        .list(page(query.skip, query.limit, DEFAULT_LIMIT), query.active_only)
        .await?;
    Ok(ApiResponse::success(organizations))
}

fn limit_error(message: &str) -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert("limit".to_string(), message.to_string());
    ApiError::unprocessable_entity("Invalid query parameter", field_errors)
}

/// GET /api/v1/organizations/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<OrganizationId>) -> ApiResult<Organization> {
    Ok(ApiResponse::success(state.organizations.get_404(id).await?))
}

/// GET /api/v1/organizations/by-code/:code
pub async fn by_code(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<Organization> {
    let organization = state
        .organizations
        .get_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;
    Ok(ApiResponse::success(organization))
}

/// GET /api/v1/organizations/by-domain/:domain
pub async fn by_domain(State(state): State<AppState>, Path(domain): Path<String>) -> ApiResult<Organization> {
    let organization = state
        .organizations
        .get_by_domain(&domain)
        .await?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;
    Ok(ApiResponse::success(organization))
}

/// PUT /api/v1/organizations/:id - partial update, including `is_active`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<OrganizationId>,
    Json(changes): Json<Row>,
) -> ApiResult<Organization> {
    Ok(ApiResponse::success(state.organizations.update(id, changes).await?))
}

/// DELETE /api/v1/organizations/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<OrganizationId>) -> ApiResult<Deleted> {
    state.organizations.delete(id).await?;
    Ok(ApiResponse::success(Deleted::new("Organization")))
}
