use std::cell::Cell;
use std::convert::Infallible;
use std::future::Future;

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::OrganizationId;

tokio::task_local! {
    static ACTIVE_TENANT: Cell<Option<OrganizationId>>;
}

/// Run `future` with a fresh, empty tenant slot. The slot is visible to
/// everything the future awaits and disappears when it completes.
pub async fn scope<F: Future>(future: F) -> F::Output {
    ACTIVE_TENANT.scope(Cell::new(None), future).await
}

/// Install the active tenant for the current request. A no-op (with a warning)
/// outside [`scope`].
pub fn set(organization_id: OrganizationId) {
    if ACTIVE_TENANT.try_with(|slot| slot.set(Some(organization_id))).is_err() {
        warn!(organization_id, "tenant context set outside a request scope; ignored");
    }
}

pub fn get() -> Option<OrganizationId> {
    ACTIVE_TENANT.try_with(Cell::get).ok().flatten()
}

pub fn clear() {
    let _ = ACTIVE_TENANT.try_with(|slot| slot.set(None));
}

/// Snapshot of the active tenant, passed explicitly into services.
///
/// Handlers take it as an extractor; it reads the task-local slot once and
/// never changes afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TenantContext {
    organization_id: Option<OrganizationId>,
}

impl TenantContext {
    /// No tenant: queries are unscoped, creates need an explicit organization.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn scoped(organization_id: OrganizationId) -> Self {
        Self {
            organization_id: Some(organization_id),
        }
    }

    pub fn current() -> Self {
        Self { organization_id: get() }
    }

    pub fn organization_id(&self) -> Option<OrganizationId> {
        self.organization_id
    }

    pub fn is_scoped(&self) -> bool {
        self.organization_id.is_some()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn empty_outside_scope() {
        assert_eq!(get(), None);
        set(5);
        assert_eq!(get(), None);
        assert_eq!(TenantContext::current(), TenantContext::none());
    }

    #[tokio::test]
    async fn set_get_clear_within_scope() {
        let seen = scope(async {
            assert_eq!(get(), None);
            set(7);
            set(9);
            let during = get();
            clear();
            (during, get())
        })
        .await;
        assert_eq!(seen, (Some(9), None));
        assert_eq!(get(), None);
    }

    #[tokio::test]
    async fn scope_value_survives_awaits() {
        scope(async {
            set(3);
            tokio::time::sleep(Duration::from_millis(5)).await;
            tokio::task::yield_now().await;
            assert_eq!(TenantContext::current().organization_id(), Some(3));
        })
        .await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_scopes_are_isolated() {
        let handles: Vec<_> = (1..=64_i64)
            .map(|tenant| {
                tokio::spawn(scope(async move {
                    set(tenant);
                    for _ in 0..5 {
                        tokio::time::sleep(Duration::from_millis((tenant % 3) as u64)).await;
                        assert_eq!(get(), Some(tenant));
                    }
                    get()
                }))
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(i as i64 + 1));
        }
    }

    #[test]
    fn explicit_context_helpers() {
        let ctx = TenantContext::scoped(11);
        assert!(ctx.is_scoped());
        assert_eq!(ctx.organization_id(), Some(11));
        assert!(!TenantContext::none().is_scoped());
    }
}
