//! HTTP client for the RAG backend.
//!
//! Every call walks an ordered list of candidate base URLs (the configured
//! primary first, then fallbacks). The first success wins. Transport and
//! parse failures move on to the next candidate; an HTTP error status is a
//! real answer from a live backend and is surfaced straight away. When every
//! candidate fails, the last failure is returned.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;

use super::error::{ApiError, extract_error_message};
use super::types::{ChatReply, ChatRequest, HealthBody, SourcesListing};

/// Everything the TUI needs from the backend.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Sends one question and waits for the whole answer.
    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError>;

    /// Lists the reference URLs the backend knows about.
    async fn fetch_sources(&self, indexed_only: bool) -> Result<SourcesListing, ApiError>;

    /// Returns true when the backend reports itself healthy.
    async fn health(&self) -> Result<bool, ApiError>;
}

/// Normalizes a list of base URLs: trims whitespace and trailing slashes,
/// drops blanks and repeats (first occurrence wins).
pub fn candidate_endpoints<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for url in urls {
        let url = url.as_ref().trim().trim_end_matches('/');
        if url.is_empty() || out.iter().any(|existing| existing == url) {
            continue;
        }
        out.push(url.to_string());
    }
    out
}

/// Tries `attempt` against each base URL in order.
async fn first_success<T, F, Fut>(
    endpoints: &[String],
    operation: &str,
    mut attempt: F,
) -> Result<T, ApiError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut last_error: Option<ApiError> = None;

    for (i, base) in endpoints.iter().enumerate() {
        match attempt(base.clone()).await {
            Ok(value) => {
                if i > 0 {
                    info!("{} succeeded on fallback {}", operation, base);
                }
                return Ok(value);
            }
            Err(e) if e.is_transport() => {
                warn!("{} failed against {}: {}", operation, base, e);
                last_error = Some(e);
            }
            Err(e) => {
                warn!("{} rejected by {}: {}", operation, base, e);
                return Err(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ApiError::Config("no API base URL configured".to_string())))
}

/// Reads a response as JSON, mapping error statuses to `ApiError::Api`.
async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(ApiError::from)?;
    debug!("Backend response status={} body_len={}", status, body.len());

    if !status.is_success() {
        let message = extract_error_message(status.as_u16(), &body);
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Backend client over one or more candidate base URLs.
pub struct RagClient {
    endpoints: Vec<String>,
    conversation_id: Option<String>,
    client: reqwest::Client,
}

impl RagClient {
    /// Builds a client. `endpoints` is normalized with [`candidate_endpoints`];
    /// at least one must survive.
    pub fn new<I, S>(endpoints: I, timeout: Duration) -> Result<Self, ApiError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let endpoints = candidate_endpoints(endpoints);
        if endpoints.is_empty() {
            return Err(ApiError::Config("no API base URL configured".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            endpoints,
            conversation_id: None,
            client,
        })
    }

    /// Tags every chat request with this id.
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    async fn post_chat(&self, base: String, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        info!(
            "POST {}/chat (message_len={})",
            base,
            request.message.chars().count()
        );
        let response = self
            .client
            .post(format!("{base}/chat"))
            .json(request)
            .send()
            .await
            .map_err(ApiError::from)?;

        let body = read_json(response).await?;
        let reply = ChatReply::from_value(&body);
        debug!(
            "Chat reply: response_len={} sources={} metadata={:?}",
            reply.response.len(),
            reply.sources.len(),
            reply.metadata
        );
        Ok(reply)
    }

    async fn get_sources(&self, base: String, indexed_only: bool) -> Result<SourcesListing, ApiError> {
        info!("GET {}/sources (indexed_only={})", base, indexed_only);
        let mut request = self.client.get(format!("{base}/sources"));
        if indexed_only {
            request = request.query(&[("indexed_only", "1")]);
        }
        let response = request.send().await.map_err(ApiError::from)?;
        let body = read_json(response).await?;
        Ok(SourcesListing::from_value(&body))
    }

    async fn get_health(&self, base: String) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(format!("{base}/health"))
            .send()
            .await
            .map_err(ApiError::from)?;
        let body = read_json(response).await?;
        let health: HealthBody =
            serde_json::from_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(matches!(health.status.as_str(), "ok" | "healthy"))
    }
}

#[async_trait]
impl ChatBackend for RagClient {
    async fn send_message(&self, message: &str) -> Result<ChatReply, ApiError> {
        let request = ChatRequest {
            message: message.to_string(),
            conversation_id: self.conversation_id.clone(),
        };
        first_success(&self.endpoints, "chat", |base| self.post_chat(base, &request)).await
    }

    async fn fetch_sources(&self, indexed_only: bool) -> Result<SourcesListing, ApiError> {
        first_success(&self.endpoints, "sources", |base| {
            self.get_sources(base, indexed_only)
        })
        .await
    }

    async fn health(&self) -> Result<bool, ApiError> {
        first_success(&self.endpoints, "health", |base| self.get_health(base)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_trim_and_dedupe() {
        let urls = candidate_endpoints([
            "http://localhost:8000/api/",
            "  ",
            "http://localhost:8000/api",
            "https://backup.example/api",
        ]);
        assert_eq!(
            urls,
            vec!["http://localhost:8000/api", "https://backup.example/api"]
        );
    }

    #[test]
    fn client_requires_an_endpoint() {
        let result = RagClient::new(Vec::<String>::new(), Duration::from_secs(1));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let endpoints = vec!["a".to_string(), "b".to_string()];
        let mut seen = Vec::new();
        let result = first_success(&endpoints, "test", |base| {
            seen.push(base.clone());
            async move { Ok::<_, ApiError>(base) }
        })
        .await;
        assert_eq!(result, Ok("a".to_string()));
        assert_eq!(seen, vec!["a"]);
    }

    #[tokio::test]
    async fn first_success_surfaces_last_transport_failure() {
        let endpoints = vec!["a".to_string(), "b".to_string()];
        let result: Result<(), ApiError> = first_success(&endpoints, "test", |base| async move {
            Err(ApiError::Network(format!("{base} down")))
        })
        .await;
        assert_eq!(result, Err(ApiError::Network("b down".to_string())));
    }

    #[tokio::test]
    async fn first_success_stops_on_api_error() {
        let endpoints = vec!["a".to_string(), "b".to_string()];
        let mut attempts = 0;
        let result: Result<(), ApiError> = first_success(&endpoints, "test", |_| {
            attempts += 1;
            async {
                Err(ApiError::Api {
                    status: 400,
                    message: "nope".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(ApiError::Api { status: 400, .. })));
        assert_eq!(attempts, 1);
    }
}
