//! # Application State
//!
//! Core conversation state for Coze. This module contains domain data only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── user_id: String               // browser-profile analogue, persisted
//! ├── session_id: String            // active conversation, persisted
//! ├── language: String              // sent with every prompt
//! ├── chat_history: Vec<ChatEntry>  // exchanges for the active session
//! ├── sessions: Vec<SessionSummary> // server-owned session list
//! ├── active_session: Option<usize> // highlighted index in `sessions`
//! ├── is_loading: bool              // send request in flight
//! ├── typing: Option<TypingState>   // reply being revealed
//! └── status_message: String        // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use crate::api::{ChatEntry, SessionSummary};

/// Characters revealed per animation tick.
pub const TYPE_CHUNK_CHARS: usize = 40;

/// Milliseconds between animation ticks.
pub const TYPE_TICK_MS: u64 = 60;

/// The typewriter buffer for a reply that has fully arrived but is still
/// being revealed on screen.
///
/// Invariant: `typed` is always a prefix of `full`, and grows by at most
/// [`TYPE_CHUNK_CHARS`] characters per tick until the two are equal.
/// Chunks land on `char` boundaries, so multi-byte text never splits
/// mid-character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingState {
    /// The complete reply text. Write-once per exchange.
    pub full: String,
    /// The revealed prefix.
    pub typed: String,
    offset_chars: usize,
    total_chars: usize,
}

impl TypingState {
    pub fn new(full: String) -> Self {
        let total_chars = full.chars().count();
        TypingState {
            full,
            typed: String::new(),
            offset_chars: 0,
            total_chars,
        }
    }

    /// Reveal the next chunk. Returns `true` once the whole reply is shown.
    pub fn advance(&mut self) -> bool {
        let chunk: String = self
            .full
            .chars()
            .skip(self.offset_chars)
            .take(TYPE_CHUNK_CHARS)
            .collect();
        self.offset_chars += chunk.chars().count();
        self.typed.push_str(&chunk);
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.offset_chars >= self.total_chars
    }
}

pub struct App {
    pub user_id: String,
    pub session_id: String,
    pub language: String,
    pub chat_history: Vec<ChatEntry>,
    pub sessions: Vec<SessionSummary>,
    /// Index into `sessions` highlighted in the panel. `None` until the
    /// first session list arrives or after creating a fresh session.
    pub active_session: Option<usize>,
    pub is_loading: bool,
    /// `Some` while a reply is being revealed.
    pub typing: Option<TypingState>,
    pub status_message: String,
}

impl App {
    pub fn new(user_id: String, session_id: String, language: String) -> Self {
        Self {
            user_id,
            session_id,
            language,
            chat_history: Vec::new(),
            sessions: Vec::new(),
            active_session: None,
            is_loading: false,
            typing: None,
            status_message: String::from("Welcome to Coze!"),
        }
    }

    /// The text to display for an entry's reply: the typing prefix for the
    /// last entry while animating, the committed text otherwise.
    pub fn displayed_reply<'a>(&'a self, index: usize) -> &'a str {
        if index + 1 == self.chat_history.len() {
            if let Some(typing) = &self.typing {
                return &typing.typed;
            }
        }
        &self.chat_history[index].ai
    }
}
