//! HTTP handlers, one module per resource.
//!
//! Tenant-scoped handlers take a [`crate::tenant::TenantContext`] extractor and
//! hand it to the service; they never read the task-local context themselves.

pub mod assignments;
pub mod attendance;
pub mod courses;
pub mod grades;
pub mod notifications;
pub mod organizations;
pub mod students;
pub mod users;

use serde::Serialize;

use crate::services::Page;

/// Default page size for tenant-scoped lists.
pub const DEFAULT_LIMIT: u32 = 100;

/// Body returned by delete endpoints.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: String,
}

impl Deleted {
    pub fn new(label: &str) -> Self {
        Self {
            message: format!("{} deleted successfully", label),
        }
    }
}

pub(crate) fn page(skip: Option<u32>, limit: Option<u32>, default_limit: u32) -> Page {
    let clamp = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
    Page::new(clamp(skip.unwrap_or(0)), clamp(limit.unwrap_or(default_limit)))
}
