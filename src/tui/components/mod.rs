//! # TUI Components
//!
//! All UI pieces for the terminal interface, one file per component.
//!
//! Two patterns are used:
//!
//! - **Stateless, props-based**: the component is created each frame from
//!   borrowed application data (`MessageList`, `SessionPanel` render
//!   wrappers).
//! - **Stateful, event-driven**: the component owns local state that
//!   outlives a frame and emits high-level events (`InputBox`,
//!   `SessionPanelState`, `MessageListState`).
//!
//! Each file co-locates its state type, event enum, rendering, event
//! handling, and tests, so one file tells the whole story of a component.

pub mod input_box;
pub mod message_list;
pub mod session_panel;

pub use input_box::{InputBox, InputEvent};
pub use message_list::{MessageList, MessageListState};
pub use session_panel::{PanelEvent, SessionPanel, SessionPanelState};
