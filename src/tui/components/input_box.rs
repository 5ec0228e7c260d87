//! # InputBox Component
//!
//! Single-line message entry.
//!
//! ## Responsibilities
//!
//! - Capture text input and basic editing (backspace, delete, cursor
//!   movement, paste)
//! - Validate on submit: empty-after-trim is rejected, the emitted value is
//!   the original untrimmed text
//! - Clear itself after an accepted submission
//!
//! The box is focused on startup and stays focused after each submission;
//! there is no multi-line entry and no draft persistence.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted the text (Enter pressed, non-empty after trim)
    Submit(String),
    /// Text content changed
    ContentChanged,
}

const PLACEHOLDER: &str = "Ask something...";

/// Single-line text input.
///
/// # Props
///
/// - `focused`: whether keystrokes currently route here (set by the parent
///   each frame; controls cursor visibility and border emphasis)
///
/// # State
///
/// - `buffer`: current text
/// - `cursor`: byte offset of the edit position
/// - `scroll_cols`: leftmost visible display column
pub struct InputBox {
    pub buffer: String,
    pub focused: bool,
    cursor: usize,
    scroll_cols: usize,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            focused: true,
            cursor: 0,
            scroll_cols: 0,
        }
    }

    fn prev_char_boundary(&self, pos: usize) -> usize {
        self.buffer[..pos]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_char_boundary(&self, pos: usize) -> usize {
        self.buffer[pos..]
            .chars()
            .next()
            .map(|c| pos + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }

    /// Keep the cursor inside the visible window of `inner_width` columns.
    fn update_scroll(&mut self, inner_width: usize) {
        if inner_width == 0 {
            return;
        }
        let cursor_col = self.buffer[..self.cursor].width();
        if cursor_col < self.scroll_cols {
            self.scroll_cols = cursor_col;
        } else if cursor_col >= self.scroll_cols + inner_width {
            self.scroll_cols = cursor_col + 1 - inner_width;
        }
    }

    /// The slice of the buffer visible from `scroll_cols`, at most
    /// `inner_width` columns wide.
    fn visible_text(&self, inner_width: usize) -> String {
        let mut col = 0usize;
        let mut out = String::new();
        for c in self.buffer.chars() {
            let w = c.width().unwrap_or(0);
            if col + w > self.scroll_cols + inner_width {
                break;
            }
            if col >= self.scroll_cols {
                out.push(c);
            }
            col += w;
        }
        out
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = area.width.saturating_sub(2) as usize;
        self.update_scroll(inner_width);

        let border_style = if self.focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(" Message ");

        let input = if self.buffer.is_empty() {
            Paragraph::new(PLACEHOLDER)
                .block(block)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM))
        } else {
            Paragraph::new(self.visible_text(inner_width))
                .block(block)
                .style(Style::default().fg(Color::Green))
        };
        frame.render_widget(input, area);

        if self.focused {
            let cursor_col = self.buffer[..self.cursor].width();
            let x = area.x + 1 + (cursor_col - self.scroll_cols) as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                // Single-line control: pasted newlines become spaces.
                let flat = text.replace(['\r', '\n'], " ");
                self.buffer.insert_str(self.cursor, &flat);
                self.cursor += flat.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor > 0 {
                    let prev = self.prev_char_boundary(self.cursor);
                    self.buffer.drain(prev..self.cursor);
                    self.cursor = prev;
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::Delete => {
                if self.cursor < self.buffer.len() {
                    let next = self.next_char_boundary(self.cursor);
                    self.buffer.drain(self.cursor..next);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorLeft => {
                if self.cursor > 0 {
                    self.cursor = self.prev_char_boundary(self.cursor);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorRight => {
                if self.cursor < self.buffer.len() {
                    self.cursor = self.next_char_boundary(self.cursor);
                    Some(InputEvent::ContentChanged)
                } else {
                    None
                }
            }
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                if self.buffer.trim().is_empty() {
                    None
                } else {
                    let text = std::mem::take(&mut self.buffer);
                    self.cursor = 0;
                    self.scroll_cols = 0;
                    Some(InputEvent::Submit(text))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_input_box_new() {
        let input = InputBox::new();
        assert!(input.buffer.is_empty());
        assert!(input.focused);
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();

        let res = input.handle_event(&TuiEvent::InputChar('a'));
        assert_eq!(res, Some(InputEvent::ContentChanged));
        assert_eq!(input.buffer, "a");

        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.buffer, "ab");

        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "a");
    }

    #[test]
    fn test_submit_emits_original_text() {
        let mut input = InputBox::new();
        input.buffer = "  hello ".to_string();

        match input.handle_event(&TuiEvent::Submit) {
            // Untrimmed: what the user typed is what the controller gets.
            Some(InputEvent::Submit(text)) => assert_eq!(text, "  hello "),
            other => panic!("expected Submit, got {other:?}"),
        }
        assert!(input.buffer.is_empty(), "buffer clears after submit");
    }

    #[test]
    fn test_submit_rejects_whitespace() {
        let mut input = InputBox::new();
        input.buffer = "   ".to_string();
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.buffer, "   ");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste("one\ntwo".to_string()));
        assert_eq!(input.buffer, "one two");
    }

    #[test]
    fn test_cursor_editing_multibyte() {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::InputChar('é'));
        input.handle_event(&TuiEvent::InputChar('x'));
        input.handle_event(&TuiEvent::CursorLeft);
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.buffer, "x");
    }

    #[test]
    fn test_render_placeholder_when_empty() {
        let backend = TestBackend::new(40, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut input = InputBox::new();

        terminal.draw(|f| input.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let text = buffer.content().iter().map(|c| c.symbol()).collect::<String>();
        assert!(text.contains("Ask something..."));
    }
}
