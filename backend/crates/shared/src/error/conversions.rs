//! Error conversions - rendering [`AppError`] at the HTTP boundary
//!
//! With the `axum` feature enabled, [`AppError`] becomes an axum response
//! carrying an RFC 7807 problem-details body.

#[cfg(feature = "axum")]
use super::app_error::AppError;

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl AppError {
    /// RFC 7807 Problem Details body for this error.
    pub fn problem_details(&self) -> serde_json::Value {
        serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "code": self.code().map(str::to_owned).unwrap_or_else(|| {
                serde_json::to_value(self.kind())
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_owned))
                    .unwrap_or_default()
            }),
            "detail": self.message(),
            "action": self.action(),
        })
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.problem_details())).into_response()
    }
}
