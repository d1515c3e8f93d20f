//! Wire types for the RAG backend and the platform auth endpoint.
//!
//! Request bodies are strict `Serialize` structs. Response bodies are read
//! leniently from `serde_json::Value`: a backend that returns an odd shape
//! gets its fields coerced or replaced with placeholders instead of failing
//! the whole turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown as the assistant turn when a success body carries no `response`.
pub const MISSING_RESPONSE_PLACEHOLDER: &str = "(no response)";

/// Body of `POST <base>/chat`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    /// Per-process id so backend logs can be correlated. The backend keeps
    /// no conversation state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// A successful answer from `POST <base>/chat`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    pub response: String,
    pub sources: Vec<String>,
    pub metadata: Option<Value>,
}

impl ChatReply {
    /// Builds a reply from a decoded success body.
    ///
    /// - `response` that is not a string is stringified; missing or null
    ///   becomes [`MISSING_RESPONSE_PLACEHOLDER`].
    /// - `sources` keeps only string entries; anything else is empty.
    /// - A bare JSON string body is taken as the response itself.
    pub fn from_value(body: &Value) -> Self {
        if let Value::String(text) = body {
            return Self {
                response: text.clone(),
                ..Default::default()
            };
        }

        let response = match body.get("response") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => MISSING_RESPONSE_PLACEHOLDER.to_string(),
            Some(other) => other.to_string(),
        };

        Self {
            response,
            sources: string_list(body.get("sources")),
            metadata: body.get("metadata").filter(|m| !m.is_null()).cloned(),
        }
    }
}

/// Per-origin counts reported by `GET <base>/sources`.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    #[serde(default)]
    pub training: usize,
    #[serde(default)]
    pub indexed: usize,
    #[serde(default)]
    pub combined: usize,
}

/// Body of `GET <base>/sources`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcesListing {
    pub sources: Vec<String>,
    pub counts: Option<SourceCounts>,
}

impl SourcesListing {
    pub fn from_value(body: &Value) -> Self {
        Self {
            sources: string_list(body.get("sources")),
            counts: body
                .get("counts")
                .and_then(|c| serde_json::from_value(c.clone()).ok()),
        }
    }
}

/// Body of `GET <base>/health`.
#[derive(Deserialize, Debug)]
pub(crate) struct HealthBody {
    #[serde(default)]
    pub status: String,
}

/// The signed-in principal, passed through from the platform untouched.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub identity_provider: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_details: String,
    #[serde(default)]
    pub user_roles: Vec<String>,
}

/// Body of `GET /.auth/me`.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthMe {
    #[serde(default)]
    pub client_principal: Option<UserInfo>,
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
