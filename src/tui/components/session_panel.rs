//! # Session Panel Component
//!
//! Sidebar listing recent prompts and the user's sessions, with a
//! "+ New Chat" action at the top. Collapsible with Ctrl+B.
//!
//! Purely presentational: the panel never mutates shared state itself. It
//! tracks only its own open/closed flag and selection cursor, and emits
//! [`PanelEvent`]s for the shell to act on.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SessionPanelState` lives in `TuiState`
//! - `SessionPanel` is created each frame with borrowed state and props

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding};

use crate::api::{ChatEntry, SessionSummary};
use crate::tui::event::TuiEvent;

/// Events emitted by the panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// A session row was chosen.
    Select(String),
    /// A recent-prompt row was chosen; scroll the conversation to it.
    /// (Recents have no id of their own to switch to.)
    JumpToEntry(usize),
    /// The "+ New Chat" row was chosen (or `n` pressed).
    CreateNew,
}

/// One selectable row, independent of the headers drawn around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PanelRow {
    NewChat,
    Recent(usize),
    Session(usize),
}

/// Persistent sidebar state.
pub struct SessionPanelState {
    /// Collapsed or expanded (Ctrl+B).
    pub open: bool,
    selected: usize,
    list_state: ListState,
}

impl SessionPanelState {
    pub fn new() -> Self {
        Self {
            open: true,
            selected: 0,
            list_state: ListState::default(),
        }
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    /// Selectable rows for the given data, in display order.
    fn rows(history_len: usize, session_count: usize) -> Vec<PanelRow> {
        let mut rows = vec![PanelRow::NewChat];
        rows.extend((0..history_len).map(PanelRow::Recent));
        rows.extend((0..session_count).map(PanelRow::Session));
        rows
    }

    /// Handle a key event, returning a PanelEvent if the shell should act.
    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        history: &[ChatEntry],
        sessions: &[SessionSummary],
    ) -> Option<PanelEvent> {
        let rows = Self::rows(history.len(), sessions.len());
        self.selected = self.selected.min(rows.len() - 1);

        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.selected = (self.selected + 1).min(rows.len() - 1);
                None
            }
            TuiEvent::Submit => match rows[self.selected] {
                PanelRow::NewChat => Some(PanelEvent::CreateNew),
                PanelRow::Recent(i) => Some(PanelEvent::JumpToEntry(i)),
                PanelRow::Session(i) => Some(PanelEvent::Select(sessions[i].id.clone())),
            },
            TuiEvent::InputChar('n') => Some(PanelEvent::CreateNew),
            _ => None,
        }
    }
}

impl Default for SessionPanelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Transient render wrapper for the sidebar.
pub struct SessionPanel<'a> {
    state: &'a mut SessionPanelState,
    history: &'a [ChatEntry],
    sessions: &'a [SessionSummary],
    active_session: Option<usize>,
    focused: bool,
}

impl<'a> SessionPanel<'a> {
    pub fn new(
        state: &'a mut SessionPanelState,
        history: &'a [ChatEntry],
        sessions: &'a [SessionSummary],
        active_session: Option<usize>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            history,
            sessions,
            active_session,
            focused,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Blue)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Chats ")
            .title_bottom(Line::from(" n New  Enter Open ").centered())
            .padding(Padding::horizontal(1));

        let rows = SessionPanelState::rows(self.history.len(), self.sessions.len());
        self.state.selected = self.state.selected.min(rows.len() - 1);

        let inner_width = area.width.saturating_sub(4) as usize;
        let mut items: Vec<ListItem> = Vec::new();
        let mut display_index_of_selected = 0;

        for (row_index, row) in rows.iter().enumerate() {
            let selected = row_index == self.state.selected;

            // Section headers are drawn before the first row of each group.
            match row {
                PanelRow::Recent(0) => items.push(header("Recent Prompts")),
                PanelRow::Session(0) => items.push(header("Sessions")),
                _ => {}
            }

            let (label, is_active) = match *row {
                PanelRow::NewChat => ("+ New Chat".to_string(), false),
                PanelRow::Recent(i) => (recent_label(&self.history[i], i), false),
                PanelRow::Session(i) => {
                    let session = &self.sessions[i];
                    let date = session
                        .created_at
                        .as_deref()
                        .and_then(format_created)
                        .map(|d| format!("  {d}"))
                        .unwrap_or_default();
                    let title = truncate_str(
                        session.display_title(),
                        inner_width.saturating_sub(date.len()),
                    );
                    (
                        format!("{title}{date}"),
                        self.active_session == Some(i),
                    )
                }
            };

            let style = if selected && self.focused {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if is_active {
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };

            if selected {
                display_index_of_selected = items.len();
            }
            items.push(ListItem::new(Line::from(Span::styled(
                truncate_str(&label, inner_width),
                style,
            ))));
        }

        // ListState tracks the display index (headers included) so the
        // selected row stays scrolled into view.
        self.state.list_state.select(Some(display_index_of_selected));
        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

fn header(text: &str) -> ListItem<'_> {
    ListItem::new(Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )))
}

/// Label for a recent-prompt row: the user text, or a synthetic title when
/// the entry has none.
fn recent_label(entry: &ChatEntry, index: usize) -> String {
    let first_line = entry.user.lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        format!("Chat {}", index + 1)
    } else {
        first_line.to_string()
    }
}

/// Format a backend `created_at` timestamp as a "Mar 01" style date.
/// Returns None when the string doesn't parse.
fn format_created(raw: &str) -> Option<String> {
    use chrono::NaiveDateTime;
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Some(parsed.format("%b %d").to_string())
}

/// Truncate a string to fit within `max_width` chars, adding "..." if needed.
fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        ".".repeat(max_width)
    } else {
        let cut: String = s.chars().take(max_width - 3).collect();
        format!("{cut}...")
    }
}
