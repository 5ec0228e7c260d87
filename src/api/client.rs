//! # Backend Client
//!
//! The HTTP adapter for the external chat service. Three operations, one
//! shared [`reqwest::Client`], and a small error taxonomy.
//!
//! The adapter returns `Result` and the *controller* decides what the user
//! sees. The default mapping ([`ApiError::user_facing_reply`]) collapses
//! every failure kind into a fixed fallback string, so a dead backend reads
//! like an ordinary (if apologetic) reply while the kinds stay
//! distinguishable for anything that wants to treat them differently.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;

use super::types::{
    ChatEntry, HistoryResponse, SendMessageRequest, SendMessageResponse, SessionSummary,
    SessionsResponse,
};

/// Default backend location when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Requests that outlive this are reported as network failures rather than
/// leaving the loading flag set forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shown in place of a reply when the backend cannot be reached at all.
pub const FALLBACK_UNREACHABLE: &str = "⚠️ Failed to connect to backend.";

/// Shown in place of a reply when the backend answers with an error status.
pub const FALLBACK_SERVER_ERROR: &str =
    "Sorry, something went wrong. Please try again later.";

/// Shown when the backend answers 200 but without a usable `response` field.
pub const FALLBACK_NO_RESPONSE: &str = "No response from backend.";

/// Errors that can occur talking to the backend.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection refused, timeout).
    Network(String),
    /// The backend answered with a non-success status.
    Api { status: u16, message: String },
    /// The backend answered, but the payload was malformed or missing
    /// required fields.
    Parse(String),
}

impl ApiError {
    /// The fallback text the UI displays in place of a reply for this
    /// error.
    pub fn user_facing_reply(&self) -> &'static str {
        match self {
            ApiError::Network(_) => FALLBACK_UNREACHABLE,
            ApiError::Api { .. } => FALLBACK_SERVER_ERROR,
            ApiError::Parse(_) => FALLBACK_NO_RESPONSE,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } => {
                write!(f, "backend error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// The seam between the controller and the wire.
///
/// Production uses [`HttpBackend`]; tests substitute a canned
/// implementation so the controller can be exercised without a server.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// POST the prompt and return the reply text.
    async fn send_message(
        &self,
        prompt: &str,
        session_id: &str,
        user_id: &str,
        language: &str,
    ) -> Result<String, ApiError>;

    /// Fetch the ordered history for one session.
    async fn fetch_history(&self, session_id: &str) -> Result<Vec<ChatEntry>, ApiError>;

    /// Fetch all sessions belonging to one user.
    async fn fetch_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, ApiError>;
}

/// Real backend over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client against the given base URL (trailing slash tolerated).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        HttpBackend {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read the body of a response, mapping a non-success status to
    /// `ApiError::Api` and a malformed payload to `ApiError::Parse`.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_message(
        &self,
        prompt: &str,
        session_id: &str,
        user_id: &str,
        language: &str,
    ) -> Result<String, ApiError> {
        debug!("POST /api/chat (session={session_id})");
        let request = SendMessageRequest {
            prompt,
            language,
            session_id,
            user_id,
        };
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let reply: SendMessageResponse = Self::decode(response).await?;
        match reply.response {
            Some(text) if !text.is_empty() => Ok(text),
            _ => {
                warn!("backend replied without a response field");
                Err(ApiError::Parse("missing response field".to_string()))
            }
        }
    }

    async fn fetch_history(&self, session_id: &str) -> Result<Vec<ChatEntry>, ApiError> {
        debug!("GET /api/chat/history (session={session_id})");
        let response = self
            .client
            .get(format!("{}/api/chat/history", self.base_url))
            .query(&[("session_id", session_id)])
            .send()
            .await?;

        let history: HistoryResponse = Self::decode(response).await?;
        Ok(history.history)
    }

    async fn fetch_sessions(&self, user_id: &str) -> Result<Vec<SessionSummary>, ApiError> {
        debug!("GET /api/chat/sessions (user={user_id})");
        let response = self
            .client
            .get(format!("{}/api/chat/sessions", self.base_url))
            .query(&[("user_id", user_id)])
            .send()
            .await?;

        let sessions: SessionsResponse = Self::decode(response).await?;
        Ok(sessions.sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let backend = HttpBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_fallback_mapping_per_error_kind() {
        let network = ApiError::Network("connection refused".to_string());
        assert_eq!(network.user_facing_reply(), "⚠️ Failed to connect to backend.");

        let api = ApiError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(
            api.user_facing_reply(),
            "Sorry, something went wrong. Please try again later."
        );

        let parse = ApiError::Parse("missing response field".to_string());
        assert_eq!(parse.user_facing_reply(), "No response from backend.");
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "backend error (HTTP 503): unavailable");
    }
}
