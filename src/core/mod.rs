//! # Core Application Logic
//!
//! This module contains Coze's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • App (state)          │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI.         │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │    TUI     │      │    API     │      │  Identity  │
//!     │  Adapter   │      │  Adapter   │      │   Store    │
//!     │ (ratatui)  │      │ (reqwest)  │      │  (~/.coze) │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct — all conversation state in one place
//! - [`action`]: The `Action` enum and `update()` — every state transition
//! - [`identity`]: Persisted `user_id` / `session_id` tokens
//! - [`config`]: TOML config with defaults → file → env → CLI overrides

pub mod action;
pub mod config;
pub mod identity;
pub mod state;
