//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to HTTP status codes.

use serde::Serialize;

/// Error classification shared by every crate in the workspace.
///
/// Each variant maps onto exactly one HTTP status code (RFC 9110).
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::TooManyRequests;
/// assert_eq!(kind.status_code(), 429);
/// assert_eq!(kind.as_str(), "Too Many Requests");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - Bad Request
    BadRequest,
    /// 401 - Unauthorized: the caller could not be identified
    Unauthorized,
    /// 403 - Forbidden
    Forbidden,
    /// 404 - Not Found
    NotFound,
    /// 429 - Too Many Requests: quota for the current window is spent
    TooManyRequests,
    /// 500 - Internal Server Error
    InternalServerError,
    /// 503 - Service Unavailable: a backing store could not be reached
    ServiceUnavailable,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::InternalServerError => 500,
            ErrorKind::ServiceUnavailable => 503,
        }
    }

    /// Standard reason phrase for the status code.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::InternalServerError => "Internal Server Error",
            ErrorKind::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// 5xx kinds; these should always reach the error log.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
        assert_eq!(ErrorKind::InternalServerError.status_code(), 500);
        assert_eq!(ErrorKind::ServiceUnavailable.status_code(), 503);
    }

    #[test]
    fn test_error_classes() {
        assert!(ErrorKind::TooManyRequests.is_client_error());
        assert!(!ErrorKind::TooManyRequests.is_server_error());
        assert!(ErrorKind::ServiceUnavailable.is_server_error());
        assert!(!ErrorKind::ServiceUnavailable.is_client_error());
    }

    #[test]
    fn test_serialized_code() {
        let json = serde_json::to_string(&ErrorKind::TooManyRequests).unwrap();
        assert_eq!(json, r#""TOO_MANY_REQUESTS""#);
    }
}
