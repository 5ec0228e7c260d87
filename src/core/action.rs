//! # Actions
//!
//! Everything that can happen in Coze becomes an `Action`.
//! User presses Enter? That's `Action::Submit`.
//! The backend replies? That's `Action::ResponseReceived`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the one piece of I/O the
//! shell must perform next. No I/O happens here.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! This makes everything testable: feed actions, assert on state. The
//! submit → response → typing → commit cycle lives entirely in this file.

use log::{debug, warn};

use crate::api::{ChatEntry, SessionSummary};
use crate::core::identity;
use crate::core::state::{App, TypingState};

/// Every event the conversation controller reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The user submitted input text (not yet trimmed or validated).
    Submit(String),
    /// A send completed. Carries the session the request was born under so
    /// stale replies can be recognized.
    ResponseReceived { session_id: String, text: String },
    /// One typewriter tick.
    TypingTick,
    /// History fetch completed for the given session.
    HistoryLoaded {
        session_id: String,
        entries: Vec<ChatEntry>,
    },
    /// Session list fetch completed.
    SessionsLoaded(Vec<SessionSummary>),
    /// The user picked a session in the panel.
    SelectSession(String),
    /// The user asked for a fresh conversation.
    NewSession,
    Quit,
}

/// I/O the shell performs after an `update()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Spawn the send task for the entry just appended. Any live typing
    /// ticker is stopped first — the buffer was already cleared here.
    SpawnRequest,
    /// Start the typewriter ticker, replacing any previous one.
    StartTyping,
    /// Stop the typewriter ticker.
    StopTyping,
    /// Write `app.session_id` to the identity store.
    PersistSession,
    Quit,
}

/// The single entry point for state transitions.
pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Submit(text) => {
            if text.trim().is_empty() {
                return Effect::None;
            }
            // Optimistic append: the user text shows immediately, the
            // reply slot stays empty until the animation commits it.
            app.typing = None;
            app.chat_history.push(ChatEntry::pending(text));
            app.is_loading = true;
            app.status_message = String::from("Thinking...");
            Effect::SpawnRequest
        }

        Action::ResponseReceived { session_id, text } => {
            app.is_loading = false;
            app.status_message.clear();
            if session_id != app.session_id {
                // The user switched sessions while the request was in
                // flight. The backend already stored the exchange under its
                // original session; committing it here would corrupt the
                // now-active history.
                warn!("discarding reply for inactive session {session_id}");
                return Effect::None;
            }
            debug!("reply received ({} chars), starting reveal", text.len());
            app.typing = Some(TypingState::new(text));
            Effect::StartTyping
        }

        Action::TypingTick => {
            let Some(typing) = app.typing.as_mut() else {
                // A tick can arrive after the ticker was aborted.
                return Effect::None;
            };
            if !typing.advance() {
                return Effect::None;
            }
            // Reveal finished: the full untruncated text becomes the
            // permanent record.
            let full = std::mem::take(&mut typing.full);
            app.typing = None;
            if let Some(last) = app.chat_history.last_mut() {
                last.ai = full;
            }
            Effect::StopTyping
        }

        Action::HistoryLoaded {
            session_id,
            entries,
        } => {
            if session_id == app.session_id {
                debug!("history loaded: {} entries", entries.len());
                app.chat_history = entries;
            } else {
                warn!("discarding history for inactive session {session_id}");
            }
            Effect::None
        }

        Action::SessionsLoaded(sessions) => {
            debug!("sessions loaded: {}", sessions.len());
            app.sessions = sessions;
            // Highlight the first session when nothing is active yet. The
            // highlight does not switch history; it only marks the row.
            if app.active_session.is_none() && !app.sessions.is_empty() {
                app.active_session = Some(0);
            }
            Effect::None
        }

        Action::SelectSession(id) => {
            // A reveal in progress belongs to the history being replaced;
            // drop it rather than let it commit across sessions.
            app.typing = None;
            match app.sessions.iter().position(|s| s.id == id) {
                Some(index) => {
                    app.chat_history = app.sessions[index].messages.clone();
                    app.active_session = Some(index);
                }
                None => {
                    // Unknown id: adopt it, leave the displayed history alone.
                    app.active_session = None;
                }
            }
            app.session_id = id;
            Effect::PersistSession
        }

        Action::NewSession => {
            app.typing = None;
            app.session_id = identity::new_token();
            app.chat_history.clear();
            app.active_session = None;
            Effect::PersistSession
        }

        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatEntry;
    use crate::test_support::{test_app, test_session};

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    #[test]
    fn test_submit_appends_pending_entry() {
        let mut app = test_app();
        let effect = update(&mut app, Action::Submit("  hello world ".to_string()));

        assert_eq!(effect, Effect::SpawnRequest);
        assert_eq!(app.chat_history.len(), 1);
        // The original text is displayed as typed, untrimmed.
        assert_eq!(app.chat_history[0].user, "  hello world ");
        assert_eq!(app.chat_history[0].ai, "");
        assert!(app.is_loading);
    }

    #[test]
    fn test_submit_whitespace_is_noop() {
        let mut app = test_app();
        for input in ["", "   ", "\t\n  "] {
            let effect = update(&mut app, Action::Submit(input.to_string()));
            assert_eq!(effect, Effect::None);
            assert!(app.chat_history.is_empty());
            assert!(!app.is_loading);
        }
    }

    #[test]
    fn test_submit_clears_stale_typing_buffer() {
        let mut app = test_app();
        update(&mut app, Action::Submit("first".to_string()));
        let session_id = app.session_id.clone();
        update(
            &mut app,
            Action::ResponseReceived {
                session_id,
                text: "a long reply that will not finish".to_string(),
            },
        );
        assert!(app.typing.is_some());

        update(&mut app, Action::Submit("second".to_string()));
        assert!(app.typing.is_none());
        assert_eq!(app.chat_history.len(), 2);
    }

    // ------------------------------------------------------------------
    // Response and typewriter
    // ------------------------------------------------------------------

    #[test]
    fn test_response_starts_typing() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".to_string()));

        let session_id = app.session_id.clone();
        let effect = update(
            &mut app,
            Action::ResponseReceived {
                session_id,
                text: "hello!".to_string(),
            },
        );
        assert_eq!(effect, Effect::StartTyping);
        assert!(!app.is_loading);
        // Not yet committed into the history entry.
        assert_eq!(app.chat_history[0].ai, "");
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".to_string()));
        let born_under = app.session_id.clone();

        update(&mut app, Action::NewSession);
        let effect = update(
            &mut app,
            Action::ResponseReceived {
                session_id: born_under,
                text: "too late".to_string(),
            },
        );
        assert_eq!(effect, Effect::None);
        assert!(app.typing.is_none());
        assert!(app.chat_history.is_empty());
    }

    #[test]
    fn test_short_reply_commits_in_one_tick() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".to_string()));
        let session_id = app.session_id.clone();
        update(
            &mut app,
            Action::ResponseReceived {
                session_id,
                text: "ABCDEFGHIJ".to_string(),
            },
        );

        let effect = update(&mut app, Action::TypingTick);
        assert_eq!(effect, Effect::StopTyping);
        assert!(app.typing.is_none());
        assert_eq!(app.chat_history[0].ai, "ABCDEFGHIJ");
    }

    #[test]
    fn test_long_reply_commits_exactly_once_complete() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".to_string()));
        let reply = "abcdefghij".repeat(13); // 130 chars → 4 ticks of 40
        let session_id = app.session_id.clone();
        update(
            &mut app,
            Action::ResponseReceived {
                session_id,
                text: reply.clone(),
            },
        );

        let mut ticks = 0;
        loop {
            ticks += 1;
            let typing_before = app.typing.clone().unwrap();
            let effect = update(&mut app, Action::TypingTick);
            if effect == Effect::StopTyping {
                break;
            }
            let typing_after = app.typing.as_ref().unwrap();
            // Prefix invariant, strictly growing.
            assert!(typing_after.full.starts_with(&typing_after.typed));
            assert!(typing_after.typed.len() > typing_before.typed.len());
            // Nothing committed until the reveal completes.
            assert_eq!(app.chat_history[0].ai, "");
        }
        assert_eq!(ticks, 4);
        assert_eq!(app.chat_history[0].ai, reply);
    }

    #[test]
    fn test_tick_without_typing_is_noop() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::TypingTick), Effect::None);
    }

    #[test]
    fn test_fallback_reply_is_animated_like_any_other() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".to_string()));
        let session_id = app.session_id.clone();
        let effect = update(
            &mut app,
            Action::ResponseReceived {
                session_id,
                text: crate::api::FALLBACK_UNREACHABLE.to_string(),
            },
        );
        assert_eq!(effect, Effect::StartTyping);

        while update(&mut app, Action::TypingTick) != Effect::StopTyping {}
        assert_eq!(app.chat_history[0].ai, crate::api::FALLBACK_UNREACHABLE);
    }

    // ------------------------------------------------------------------
    // Loads
    // ------------------------------------------------------------------

    #[test]
    fn test_history_loaded_replaces_current() {
        let mut app = test_app();
        let entries = vec![ChatEntry {
            user: "old".to_string(),
            ai: "answer".to_string(),
        }];
        let session_id = app.session_id.clone();
        update(
            &mut app,
            Action::HistoryLoaded {
                session_id,
                entries: entries.clone(),
            },
        );
        assert_eq!(app.chat_history, entries);
    }

    #[test]
    fn test_history_for_other_session_discarded() {
        let mut app = test_app();
        update(
            &mut app,
            Action::HistoryLoaded {
                session_id: "someone-else".to_string(),
                entries: vec![ChatEntry::pending("x".to_string())],
            },
        );
        assert!(app.chat_history.is_empty());
    }

    #[test]
    fn test_sessions_loaded_selects_first() {
        let mut app = test_app();
        update(
            &mut app,
            Action::SessionsLoaded(vec![test_session("s-1"), test_session("s-2")]),
        );
        assert_eq!(app.active_session, Some(0));
        // History is untouched by the highlight.
        assert!(app.chat_history.is_empty());
    }

    #[test]
    fn test_sessions_loaded_keeps_existing_selection() {
        let mut app = test_app();
        app.active_session = Some(1);
        update(&mut app, Action::SessionsLoaded(vec![test_session("s-1")]));
        assert_eq!(app.active_session, Some(1));
    }

    // ------------------------------------------------------------------
    // Session switching
    // ------------------------------------------------------------------

    #[test]
    fn test_select_session_installs_stored_messages() {
        let mut app = test_app();
        let mut target = test_session("s-2");
        target.messages = vec![ChatEntry {
            user: "earlier".to_string(),
            ai: "reply".to_string(),
        }];
        update(
            &mut app,
            Action::SessionsLoaded(vec![test_session("s-1"), target.clone()]),
        );

        let effect = update(&mut app, Action::SelectSession("s-2".to_string()));
        assert_eq!(effect, Effect::PersistSession);
        assert_eq!(app.session_id, "s-2");
        assert_eq!(app.active_session, Some(1));
        assert_eq!(app.chat_history, target.messages);
    }

    #[test]
    fn test_select_unknown_session_keeps_history() {
        let mut app = test_app();
        app.chat_history.push(ChatEntry::pending("kept".to_string()));
        let effect = update(&mut app, Action::SelectSession("ghost".to_string()));
        assert_eq!(effect, Effect::PersistSession);
        assert_eq!(app.session_id, "ghost");
        assert_eq!(app.active_session, None);
        assert_eq!(app.chat_history.len(), 1);
    }

    #[test]
    fn test_select_session_cancels_reveal() {
        let mut app = test_app();
        update(&mut app, Action::SessionsLoaded(vec![test_session("s-1")]));
        update(&mut app, Action::Submit("hi".to_string()));
        let session_id = app.session_id.clone();
        update(
            &mut app,
            Action::ResponseReceived {
                session_id,
                text: "a reply that will never finish revealing".to_string(),
            },
        );
        assert!(app.typing.is_some());

        update(&mut app, Action::SelectSession("s-1".to_string()));
        assert!(app.typing.is_none());
        // The abandoned reply is not committed anywhere.
        assert!(app.chat_history.is_empty());
    }

    #[test]
    fn test_new_session_clears_and_generates_distinct_id() {
        let mut app = test_app();
        app.chat_history.push(ChatEntry::pending("x".to_string()));
        app.active_session = Some(0);
        let previous = app.session_id.clone();

        let effect = update(&mut app, Action::NewSession);
        assert_eq!(effect, Effect::PersistSession);
        assert!(app.chat_history.is_empty());
        assert_eq!(app.active_session, None);
        assert_ne!(app.session_id, previous);
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }
}
