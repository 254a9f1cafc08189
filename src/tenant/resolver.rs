use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, Uri},
};
use tracing::debug;

use super::{OrganizationId, TenantError};
use crate::config::TenantConfig;
use crate::database::models::Organization;
use crate::services::OrganizationService;

/// Where a request's tenant id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantSource {
    Header,
    QueryParam,
}

/// Works out which organization a request belongs to.
///
/// Sources are tried in order: the tenant header, then the tenant query
/// parameter. A present but non-numeric value is an error rather than a
/// fall-through, so a typo never silently yields an unscoped request.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    header: String,
    query_param: String,
    skip_paths: Vec<String>,
}

impl TenantResolver {
    pub fn new(config: &TenantConfig) -> Self {
        Self {
            header: config.header.clone(),
            query_param: config.query_param.clone(),
            skip_paths: config
                .skip_paths
                .iter()
                .map(|p| p.trim_end_matches('/').to_string())
                .collect(),
        }
    }

    pub fn header_name(&self) -> &str {
        &self.header
    }

    pub fn query_param_name(&self) -> &str {
        &self.query_param
    }

    /// Skip-listed prefixes match whole path segments: `/health` covers
    /// `/health` and `/health/db` but not `/healthz`.
    pub fn should_skip(&self, path: &str) -> bool {
        self.skip_paths.iter().any(|prefix| {
            prefix.is_empty()
                || path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .map_or(false, |rest| rest.starts_with('/'))
        })
    }

    /// The tenant id the request asks for, if any.
    pub fn candidate(&self, headers: &HeaderMap, uri: &Uri) -> Result<Option<(OrganizationId, TenantSource)>, TenantError> {
        if let Some(value) = headers.get(self.header.as_str()) {
            let raw = value
                .to_str()
                .map_err(|_| TenantError::MalformedTenantId(String::from_utf8_lossy(value.as_bytes()).into_owned()))?;
            if !raw.trim().is_empty() {
                return parse_tenant_id(raw).map(|id| Some((id, TenantSource::Header)));
            }
        }

        if uri.query().is_some() {
            let params = Query::<HashMap<String, String>>::try_from_uri(uri)
                .map(|Query(params)| params)
                .unwrap_or_default();
            if let Some(raw) = params.get(&self.query_param) {
                if !raw.trim().is_empty() {
                    return parse_tenant_id(raw).map(|id| Some((id, TenantSource::QueryParam)));
                }
            }
        }

        Ok(None)
    }

    /// Look the candidate up and insist it is active.
    pub async fn resolve(&self, organizations: &OrganizationService, id: OrganizationId) -> Result<Organization, TenantError> {
        match organizations.get(id).await? {
            Some(org) if org.is_active => {
                debug!(organization_id = id, code = %org.code, "tenant resolved");
                Ok(org)
            }
            Some(_) => Err(TenantError::TenantInactive(id)),
            None => Err(TenantError::TenantNotFound(id)),
        }
    }
}

fn parse_tenant_id(raw: &str) -> Result<OrganizationId, TenantError> {
    raw.trim()
        .parse::<OrganizationId>()
        .map_err(|_| TenantError::MalformedTenantId(raw.to_string()))
}
