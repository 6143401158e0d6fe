//! Rate Limit Middleware

use crate::application::check_rate_limit::CheckRateLimitUseCase;
use crate::application::config::StoreErrorPolicy;
use crate::domain::repository::CounterStore;
use crate::error::LimiterError;
use crate::presentation::handlers::RateLimitState;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use platform::client::caller_from_extensions;

/// Middleware that counts the request against the caller's window.
///
/// * allowed - the inner handler runs and its response carries the
///   `RateLimit-*` headers
/// * rejected - 429 with the headers plus `Retry-After`; the handler is
///   never invoked
/// * store failure - `on_store_error` decides: `Allow` runs the handler
///   with no rate limit headers, `Deny` answers 503
pub async fn enforce_rate_limit<S>(
    State(state): State<RateLimitState<S>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    S: CounterStore + Clone + Send + Sync + 'static,
{
    let Some(caller) = caller_from_extensions(req.extensions()).cloned() else {
        return LimiterError::MissingIdentity.into_response();
    };

    let now_ms = state.clock.now_ms();
    let use_case = CheckRateLimitUseCase::with_policy(
        state.store.clone(),
        state.config.clone(),
        state.policy.clone(),
    );

    match use_case.execute(&caller.identity, &caller.roles, now_ms).await {
        Ok(result) if result.allowed => {
            let mut response = next.run(req).await;
            result.apply_headers(response.headers_mut());
            response
        }
        Ok(result) => {
            let retry_after = result.retry_after_secs.unwrap_or_default();
            let mut response = AppError::too_many_requests("Rate limit exceeded")
                .with_code("RATE_LIMITED")
                .with_action(format!("Retry after {retry_after} seconds"))
                .into_response();
            result.apply_headers(response.headers_mut());
            response
        }
        Err(e) if e.is_store_error() => match state.config.on_store_error {
            StoreErrorPolicy::Allow => {
                e.log();
                tracing::warn!(
                    identity = %caller.identity,
                    "Rate limit indeterminate, failing open"
                );
                next.run(req).await
            }
            StoreErrorPolicy::Deny => e.into_response(),
        },
        Err(e) => e.into_response(),
    }
}
