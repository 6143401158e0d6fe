//! HTTP Handlers

use crate::application::config::RateLimitConfig;
use crate::application::rate_limit_status::GetRateLimitStatusUseCase;
use crate::domain::repository::CounterStore;
use crate::domain::services::{LimitPolicy, derive_window_key};
use crate::error::{LimiterError, LimiterResult};
use crate::presentation::dto::StatusResponse;
use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use platform::client::caller_from_extensions;
use platform::clock::Clock;
use std::sync::Arc;

/// Shared state for the rate limit middleware and handlers
#[derive(Clone)]
pub struct RateLimitState<S>
where
    S: CounterStore + Clone + Send + Sync + 'static,
{
    pub store: Arc<S>,
    pub config: Arc<RateLimitConfig>,
    /// Built once from `config`
    pub policy: Arc<LimitPolicy>,
    pub clock: Arc<dyn Clock>,
}

impl<S> RateLimitState<S>
where
    S: CounterStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: S, config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            policy: Arc::new(config.policy()),
            config: Arc::new(config),
            clock,
        }
    }
}

/// GET /status
///
/// Reports the caller's current window without counting a request.
pub async fn rate_limit_status<S>(
    State(state): State<RateLimitState<S>>,
    req: Request<Body>,
) -> LimiterResult<Json<StatusResponse>>
where
    S: CounterStore + Clone + Send + Sync + 'static,
{
    let caller = caller_from_extensions(req.extensions())
        .cloned()
        .ok_or(LimiterError::MissingIdentity)?;
    let now_ms = state.clock.now_ms();

    let use_case = GetRateLimitStatusUseCase::new(state.store.clone(), state.config.clone());

    let response = match use_case.execute(&caller.identity, now_ms).await {
        Some(record) => StatusResponse {
            identity: record.identity_key.clone(),
            limit: record.limit,
            request_count: record.request_count,
            remaining: record.remaining(),
            window_start: record.window_start,
            window_end: record.window_end,
            reset_at_ms: record.reset_at_ms(),
            tracked: true,
        },
        None => {
            let window_key =
                derive_window_key(&caller.identity, now_ms, state.config.window_size_secs());
            let limit = state.policy.limit_for(&caller.roles);
            StatusResponse {
                identity: caller.identity,
                limit,
                request_count: 0,
                remaining: limit,
                window_start: window_key.window.start,
                window_end: window_key.window.end,
                reset_at_ms: window_key.window.end_ms(),
                tracked: false,
            }
        }
    };

    Ok(Json(response))
}
