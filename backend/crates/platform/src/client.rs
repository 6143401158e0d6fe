//! Caller identification utilities
//!
//! The limiter never authenticates anyone. An upstream layer resolves the
//! caller and leaves an [`AuthenticatedCaller`] in the request extensions;
//! everything downstream reads it from there.

use axum::body::Body;
use axum::http::{Extensions, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Header carrying the authenticated user id, set by a trusted gateway.
pub const AUTHENTICATED_USER_HEADER: &str = "x-authenticated-user";
/// Header carrying the comma-separated role list, set by a trusted gateway.
pub const AUTHENTICATED_ROLES_HEADER: &str = "x-authenticated-roles";

/// Pre-authenticated caller context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    /// Opaque identity key (derived from the authenticated user id)
    pub identity: String,
    /// Role codes, e.g. `user`, `admin`
    pub roles: Vec<String>,
}

impl AuthenticatedCaller {
    pub fn new(identity: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            identity: identity.into(),
            roles,
        }
    }
}

/// Error when extracting the caller from request headers
#[derive(Debug, Clone, thiserror::Error)]
pub enum CallerError {
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}

/// Caller left in the request extensions by the authentication layer.
pub fn caller_from_extensions(extensions: &Extensions) -> Option<&AuthenticatedCaller> {
    extensions.get::<AuthenticatedCaller>()
}

/// Read the caller from gateway-supplied headers.
///
/// Only meaningful behind a gateway that strips these headers from client
/// traffic. A missing or blank role header yields an empty role set.
///
/// ## Returns
/// * `Ok(AuthenticatedCaller)` - identity header present and non-blank
/// * `Err(CallerError)` - identity header missing
pub fn extract_trusted_caller(headers: &HeaderMap) -> Result<AuthenticatedCaller, CallerError> {
    let identity = headers
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CallerError::MissingHeader("X-Authenticated-User".to_string()))?;

    let roles = headers
        .get(AUTHENTICATED_ROLES_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    Ok(AuthenticatedCaller::new(identity, roles))
}

/// Middleware that copies a gateway-authenticated caller into extensions.
///
/// Never rejects: requests without the headers pass through untouched and
/// whoever needs an identity decides what to do about its absence.
pub async fn attach_trusted_caller(mut req: Request<Body>, next: Next) -> Response {
    match extract_trusted_caller(req.headers()) {
        Ok(caller) => {
            tracing::debug!(identity = %caller.identity, roles = ?caller.roles, "Trusted caller attached");
            req.extensions_mut().insert(caller);
        }
        Err(e) => {
            tracing::debug!(error = %e, "No trusted caller on request");
        }
    }

    next.run(req).await
}
