//! API DTOs (Data Transfer Objects)

use serde::Serialize;

/// Response for GET /status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub identity: String,
    pub limit: u32,
    pub request_count: u32,
    pub remaining: u32,
    /// Epoch seconds
    pub window_start: i64,
    /// Epoch seconds
    pub window_end: i64,
    pub reset_at_ms: i64,
    /// `false` when no request has been counted in the current window yet
    pub tracked: bool,
}
