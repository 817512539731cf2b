//! Standardized API error bodies.

use serde::{Deserialize, Serialize};

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

/// Body of a `429 Too Many Requests` response.
///
/// Clients and load balancers parse this shape, so field names are fixed:
/// `{ "statusCode": 429, "error": "Too Many Requests", "message": ..., "retryAfter": n }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitExceededBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    /// Seconds until the violated window resets.
    pub retry_after: u64,
}

impl RateLimitExceededBody {
    pub const STATUS_CODE: u16 = 429;
    pub const ERROR: &'static str = "Too Many Requests";

    pub fn new(message: impl Into<String>, retry_after: u64) -> Self {
        Self {
            status_code: Self::STATUS_CODE,
            error: Self::ERROR.to_string(),
            message: message.into(),
            retry_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_body_field_names() {
        let body = RateLimitExceededBody::new("Slow down", 42);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "statusCode": 429,
                "error": "Too Many Requests",
                "message": "Slow down",
                "retryAfter": 42
            })
        );
    }

    #[test]
    fn test_problem_details_omit_empty_detail() {
        let json = serde_json::to_value(ErrorResponse::new(404, "Not Found")).unwrap();
        assert_eq!(json["type"], "about:blank");
        assert!(json.get("detail").is_none());
    }
}
