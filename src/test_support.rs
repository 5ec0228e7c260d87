//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crate::api::SessionSummary;
use crate::core::state::App;

/// Creates a test App with fixed identity tokens.
pub fn test_app() -> App {
    App::new(
        "test-user".to_string(),
        "test-session".to_string(),
        "en".to_string(),
    )
}

/// Creates a titled session summary with no messages.
pub fn test_session(id: &str) -> SessionSummary {
    SessionSummary {
        id: id.to_string(),
        title: format!("Session {id}"),
        created_at: None,
        messages: Vec::new(),
    }
}
