use std::fmt;

use serde_json::Value;

/// Errors from talking to the backend or the auth endpoint.
/// Variants carry enough info to decide whether the next candidate host is worth trying.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client misconfigured (no candidate URLs, bad URL). Not retryable.
    Config(String),
    /// Transport failure (timeout, DNS, connection refused). Next host is tried.
    Network(String),
    /// Backend answered with a non-success status. Surfaced as-is.
    Api { status: u16, message: String },
    /// Success status but a body that isn't JSON. Next host is tried.
    Parse(String),
}

impl ApiError {
    /// Whether another candidate base URL should be tried after this failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Parse(_))
    }

    /// Human-readable text for the transcript.
    ///
    /// For `Api` this is exactly the message extracted from the error body
    /// (or `HTTP <status>`), with no prefix.
    pub fn message(&self) -> String {
        match self {
            ApiError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { message, .. } => write!(f, "{message}"),
            ApiError::Parse(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Separator used when a validation error lists several messages.
const DETAIL_SEPARATOR: &str = "; ";

/// Turns a non-success body into one readable message.
///
/// `detail` as a string is used verbatim. `detail` as a list contributes the
/// `msg` of each object that has one. Everything else (no JSON, no detail,
/// empty detail) falls back to `HTTP <status>`.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let fallback = || format!("HTTP {status}");

    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    match json.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .filter(|msg| !msg.is_empty())
                .collect();
            if messages.is_empty() {
                fallback()
            } else {
                messages.join(DETAIL_SEPARATOR)
            }
        }
        _ => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_validation_message_is_surfaced_verbatim() {
        let body = r#"{"detail": [{"loc": ["body", "message"], "msg": "too long", "type": "value_error"}]}"#;
        assert_eq!(extract_error_message(422, body), "too long");
    }

    #[test]
    fn multiple_validation_messages_are_joined() {
        let body = r#"{"detail": [{"msg": "too long"}, {"loc": []}, {"msg": "bad id"}]}"#;
        assert_eq!(extract_error_message(422, body), "too long; bad id");
    }

    #[test]
    fn string_detail_is_used_verbatim() {
        let body = r#"{"detail": "Question is outside NDT's scope (science/education only)"}"#;
        assert_eq!(
            extract_error_message(400, body),
            "Question is outside NDT's scope (science/education only)"
        );
    }

    #[test]
    fn missing_detail_falls_back_to_status() {
        assert_eq!(extract_error_message(503, r#"{"error": "down"}"#), "HTTP 503");
        assert_eq!(extract_error_message(500, "<html>oops</html>"), "HTTP 500");
        assert_eq!(extract_error_message(502, ""), "HTTP 502");
    }

    #[test]
    fn empty_detail_list_falls_back_to_status() {
        assert_eq!(extract_error_message(422, r#"{"detail": []}"#), "HTTP 422");
        assert_eq!(extract_error_message(400, r#"{"detail": "  "}"#), "HTTP 400");
    }

    #[test]
    fn api_error_message_has_no_prefix() {
        let err = ApiError::Api {
            status: 422,
            message: "too long".to_string(),
        };
        assert_eq!(err.message(), "too long");
        assert_eq!(err.to_string(), "too long");
        assert!(!err.is_transport());
    }

    #[test]
    fn transport_errors_are_retryable() {
        assert!(ApiError::Network("refused".into()).is_transport());
        assert!(ApiError::Parse("not json".into()).is_transport());
        assert!(!ApiError::Config("no hosts".into()).is_transport());
    }
}
