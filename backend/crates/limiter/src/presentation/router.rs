//! Rate Limit Router

use crate::domain::repository::CounterStore;
use crate::presentation::handlers::{self, RateLimitState};
use crate::presentation::middleware::enforce_rate_limit;
use axum::{Router, middleware, routing::get};

/// Status endpoint. Not itself rate limited.
pub fn rate_limit_router<S>(state: RateLimitState<S>) -> Router
where
    S: CounterStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/status", get(handlers::rate_limit_status::<S>))
        .with_state(state)
}

/// Put every route already on `router` behind the limiter.
///
/// Uses `route_layer`, so unmatched paths still 404 without spending a
/// request from the caller's window.
pub fn with_rate_limit<S>(router: Router, state: RateLimitState<S>) -> Router
where
    S: CounterStore + Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(
        state,
        enforce_rate_limit::<S>,
    ))
}
