use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::tenant::context;

/// Resolves the request's tenant and holds it in the task-local context
/// while the rest of the stack runs.
///
/// Skip-listed paths pass straight through with no context at all. Otherwise
/// the handler runs inside a fresh context scope, which is cleared before the
/// response leaves, whether the handler succeeded or not. A malformed,
/// unknown or inactive tenant short-circuits with an error response and the
/// handler never runs.
pub async fn resolve_tenant_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let resolver = state.resolver.clone();
    let path = request.uri().path().to_string();

    if resolver.should_skip(&path) {
        debug!(%path, "tenant resolution skipped");
        return next.run(request).await;
    }

    context::scope(async move {
        let response = match resolver.candidate(request.headers(), request.uri()) {
            Err(err) => {
                warn!(%path, error = %err, "rejected tenant id");
                ApiError::from(err).into_response()
            }
            Ok(None) => next.run(request).await,
            Ok(Some((id, source))) => match resolver.resolve(&state.organizations, id).await {
                Ok(organization) => {
                    context::set(organization.id);
                    debug!(%path, organization_id = organization.id, ?source, "tenant context set");
                    next.run(request).await
                }
                Err(err) => {
                    warn!(%path, organization_id = id, error = %err, "tenant unavailable");
                    ApiError::from(err).into_response()
                }
            },
        };
        context::clear();
        response
    })
    .await
}
