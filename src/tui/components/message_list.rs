//! # MessageList Component
//!
//! Scrollable view of the active session's exchanges.
//!
//! ## Responsibilities
//!
//! - Render each exchange as a user block and a reply block
//! - Show the typewriter prefix (plus a block cursor) for the last entry
//!   while a reply is being revealed
//! - Stick to the bottom on new content until the user scrolls away
//!
//! ## Architecture
//!
//! `MessageList` is a transient wrapper (created each frame) around
//! `&mut MessageListState` (persistent scroll state) and `&App` (props).

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Scroll state for the message list. Must be persisted in `TuiState`.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Cumulative height after each entry, for jump targets
    prefix_heights: Vec<u16>,
    total_height: u16,
    viewport_height: u16,
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            stick_to_bottom: true, // Start attached to bottom
            prefix_heights: Vec::new(),
            total_height: 0,
            viewport_height: 0,
        }
    }

    fn max_scroll(&self) -> u16 {
        self.total_height.saturating_sub(self.viewport_height)
    }

    fn set_scroll(&mut self, y: u16) {
        let y = y.min(self.max_scroll());
        self.scroll_state.set_offset(Position { x: 0, y });
        // Re-pin only when the user lands back at the very bottom.
        self.stick_to_bottom = y >= self.max_scroll();
    }

    fn scroll_by(&mut self, delta: i32) {
        let current = self.scroll_state.offset().y as i32;
        self.set_scroll((current + delta).max(0) as u16);
    }

    /// Scroll so the given entry's first line is at the top of the view.
    pub fn jump_to_entry(&mut self, index: usize) {
        let top = if index == 0 {
            0
        } else {
            self.prefix_heights
                .get(index - 1)
                .copied()
                .unwrap_or_default()
        };
        self.set_scroll(top);
    }
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<()> {
        let page = self.viewport_height.max(1) as i32;
        match event {
            TuiEvent::ScrollUp | TuiEvent::CursorUp => self.scroll_by(-1),
            TuiEvent::ScrollDown | TuiEvent::CursorDown => self.scroll_by(1),
            TuiEvent::ScrollPageUp => self.scroll_by(-page),
            TuiEvent::ScrollPageDown => self.scroll_by(page),
            _ => return None,
        }
        Some(())
    }
}

/// Transient render wrapper.
pub struct MessageList<'a> {
    state: &'a mut MessageListState,
    app: &'a App,
    spinner_frame: usize,
}

struct RenderedBlock<'a> {
    paragraph: Paragraph<'a>,
    height: u16,
}

impl<'a> RenderedBlock<'a> {
    fn new(
        title: &'static str,
        text: impl Into<ratatui::text::Text<'a>>,
        style: Style,
        content_width: u16,
    ) -> Self {
        let paragraph = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(title)
                    .border_style(style.add_modifier(Modifier::DIM))
                    .title_style(style),
            )
            .style(style)
            .wrap(Wrap { trim: true });
        let inner_width = content_width.saturating_sub(2);
        let height = paragraph.line_count(inner_width) as u16;
        RenderedBlock { paragraph, height }
    }
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, app: &'a App, spinner_frame: usize) -> Self {
        Self {
            state,
            app,
            spinner_frame,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.viewport_height = area.height;

        if self.app.chat_history.is_empty() {
            let landing = Paragraph::new("Start a conversation — messages stay in this session.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            let y = area.y + area.height / 2;
            frame.render_widget(landing, Rect { y, height: area.height.min(1), ..area });
            return;
        }

        let content_width = area.width.saturating_sub(1); // scrollbar column
        let typing = self.app.typing.as_ref();
        let last = self.app.chat_history.len() - 1;

        // Build blocks and record per-entry heights for jump targets.
        let mut blocks: Vec<RenderedBlock> = Vec::new();
        let mut prefix_heights: Vec<u16> = Vec::new();
        let reply_style = Style::default().fg(Color::Green);

        for (index, entry) in self.app.chat_history.iter().enumerate() {
            let mut entry_height = 0;

            let user = RenderedBlock::new(
                "you",
                entry.user.trim(),
                Style::default().fg(Color::Cyan),
                content_width,
            );
            entry_height += user.height;
            blocks.push(user);

            let is_last = index == last;
            let reply_text = self.app.displayed_reply(index);

            let reply = if is_last && typing.is_some() {
                // Typing prefix plus a block cursor, rebuilt every frame.
                Some(RenderedBlock::new(
                    "coze",
                    format!("{reply_text}▌"),
                    reply_style,
                    content_width,
                ))
            } else if is_last && self.app.is_loading {
                let spinner = SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()];
                Some(RenderedBlock::new(
                    "coze",
                    format!("{spinner} Thinking..."),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    content_width,
                ))
            } else if !reply_text.is_empty() || is_last {
                Some(RenderedBlock::new(
                    "coze",
                    reply_text,
                    reply_style,
                    content_width,
                ))
            } else {
                None
            };
            if let Some(reply) = reply {
                entry_height += reply.height;
                blocks.push(reply);
            }

            let previous = prefix_heights.last().copied().unwrap_or(0);
            prefix_heights.push(previous + entry_height);
        }

        let total_height: u16 = prefix_heights.last().copied().unwrap_or(0);
        self.state.prefix_heights = prefix_heights;
        self.state.total_height = total_height;

        if self.state.stick_to_bottom {
            let y = total_height.saturating_sub(area.height);
            self.state.scroll_state.set_offset(Position { x: 0, y });
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = 0;
        for block in &blocks {
            let rect = Rect::new(0, y_offset, content_width, block.height);
            scroll_view.render_widget(block.paragraph.clone(), rect);
            y_offset += block.height;
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatEntry;
    use crate::core::state::TypingState;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, state: &mut MessageListState) -> String {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| MessageList::new(state, app, 0).render(f, f.area()))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_render_empty_history_shows_landing() {
        let app = test_app();
        let mut state = MessageListState::new();
        let text = draw(&app, &mut state);
        assert!(text.contains("Start a conversation"));
    }

    #[test]
    fn test_render_committed_exchange() {
        let mut app = test_app();
        app.chat_history.push(ChatEntry {
            user: "what is rust".to_string(),
            ai: "a systems language".to_string(),
        });
        let mut state = MessageListState::new();
        let text = draw(&app, &mut state);
        assert!(text.contains("what is rust"));
        assert!(text.contains("a systems language"));
    }

    #[test]
    fn test_render_typing_prefix_not_full_text() {
        let mut app = test_app();
        app.chat_history.push(ChatEntry::pending("hi".to_string()));
        let mut typing = TypingState::new("a".repeat(60));
        typing.advance(); // reveal the first 40 chars
        app.typing = Some(typing);

        let mut state = MessageListState::new();
        let text = draw(&app, &mut state);
        assert!(text.contains(&"a".repeat(40)));
        assert!(!text.contains(&"a".repeat(41)));
        assert!(text.contains('▌'));
    }

    #[test]
    fn test_render_thinking_while_loading() {
        let mut app = test_app();
        app.chat_history.push(ChatEntry::pending("hi".to_string()));
        app.is_loading = true;
        let mut state = MessageListState::new();
        let text = draw(&app, &mut state);
        assert!(text.contains("Thinking..."));
    }

    #[test]
    fn test_scroll_unsticks_and_resticks() {
        let mut state = MessageListState::new();
        state.total_height = 50;
        state.viewport_height = 10;
        state.scroll_state.set_offset(Position { x: 0, y: 40 });

        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        assert_eq!(state.scroll_state.offset().y, 39);

        state.handle_event(&TuiEvent::ScrollDown);
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn test_jump_to_entry_uses_prefix_heights() {
        let mut state = MessageListState::new();
        state.prefix_heights = vec![6, 12, 20];
        state.total_height = 20;
        state.viewport_height = 5;

        state.jump_to_entry(0);
        assert_eq!(state.scroll_state.offset().y, 0);

        state.jump_to_entry(2);
        assert_eq!(state.scroll_state.offset().y, 12);
        assert!(!state.stick_to_bottom);
    }
}
