//! # Wire Types
//!
//! Explicit records for everything the backend sends or receives.
//!
//! The backend owns all durable chat state; these shapes only describe the
//! three endpoints the client consumes. Required fields are enforced at
//! deserialization time — a payload missing `user`, `ai`, `id`, or `title`
//! is rejected at the adapter boundary instead of leaking a half-formed
//! value into the controller.

use serde::{Deserialize, Serialize};

/// One exchange: a user message paired with its AI reply.
///
/// `ai` is empty immediately after submission and is filled either by the
/// committed final response or, transiently on screen, by the partially
/// revealed typed text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub user: String,
    pub ai: String,
}

impl ChatEntry {
    /// A just-submitted exchange: user text present, reply still pending.
    pub fn pending(user: String) -> Self {
        ChatEntry {
            user,
            ai: String::new(),
        }
    }
}

/// A server-owned conversation thread, as listed by `/api/chat/sessions`.
///
/// `created_at` and `messages` are optional on the wire: older backend
/// versions omit them, and the session list endpoint may send summaries
/// without bodies.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatEntry>,
}

impl SessionSummary {
    /// Display title for the session list, with a fallback for unnamed
    /// threads.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled Chat"
        } else {
            &self.title
        }
    }
}

/// Request body for `POST /api/chat`.
#[derive(Serialize, Debug)]
pub struct SendMessageRequest<'a> {
    pub prompt: &'a str,
    pub language: &'a str,
    pub session_id: &'a str,
    pub user_id: &'a str,
}

/// Response body for `POST /api/chat`. A backend that answers without a
/// `response` field is treated as a parse failure upstream.
#[derive(Deserialize, Debug)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Response body for `GET /api/chat/history`.
#[derive(Deserialize, Debug)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<ChatEntry>,
}

/// Response body for `GET /api/chat/sessions`.
#[derive(Deserialize, Debug)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Contract test: the send request must serialize with the exact field
    /// names the backend's request model declares.
    #[test]
    fn test_send_request_serialization() {
        let req = SendMessageRequest {
            prompt: "hello",
            language: "en",
            session_id: "s-1",
            user_id: "u-1",
        };
        let serialized = serde_json::to_string(&req).unwrap();
        let expected =
            r#"{"prompt":"hello","language":"en","session_id":"s-1","user_id":"u-1"}"#;
        assert_eq!(serialized, expected);
    }

    #[test]
    fn test_history_response_parses() {
        let json = r#"{"history":[{"user":"hi","ai":"hello there"}]}"#;
        let parsed: HistoryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.history.len(), 1);
        assert_eq!(parsed.history[0].user, "hi");
        assert_eq!(parsed.history[0].ai, "hello there");
    }

    #[test]
    fn test_history_entry_requires_both_fields() {
        // A history row without `ai` is malformed, not "half an entry".
        let json = r#"{"history":[{"user":"hi"}]}"#;
        assert!(serde_json::from_str::<HistoryResponse>(json).is_err());
    }

    #[test]
    fn test_session_summary_defaults() {
        let json = r#"{"sessions":[{"id":"s-1","title":"Trip planning"}]}"#;
        let parsed: SessionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.sessions.len(), 1);
        let session = &parsed.sessions[0];
        assert_eq!(session.id, "s-1");
        assert_eq!(session.created_at, None);
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_session_summary_with_messages() {
        let json = r#"{
            "sessions": [{
                "id": "s-2",
                "title": "Recipes",
                "created_at": "2025-03-01T12:00:00",
                "messages": [{"user":"pasta?","ai":"carbonara"}]
            }]
        }"#;
        let parsed: SessionsResponse = serde_json::from_str(json).unwrap();
        let session = &parsed.sessions[0];
        assert_eq!(session.created_at.as_deref(), Some("2025-03-01T12:00:00"));
        assert_eq!(session.messages[0].ai, "carbonara");
    }

    #[test]
    fn test_display_title_fallback() {
        let untitled = SessionSummary {
            id: "s-3".to_string(),
            title: "  ".to_string(),
            created_at: None,
            messages: vec![],
        };
        assert_eq!(untitled.display_title(), "Untitled Chat");

        let titled = SessionSummary {
            title: "Groceries".to_string(),
            ..untitled
        };
        assert_eq!(titled.display_title(), "Groceries");
    }

    #[test]
    fn test_missing_response_field_is_none() {
        let parsed: SendMessageResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(parsed.response.is_none());
    }
}
