//! Frame composition: sidebar, title bar, conversation, input.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, SessionPanel};
use crate::tui::{Focus, TuiState};

/// Sidebar width when expanded.
const SIDEBAR_WIDTH: u16 = 32;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let sidebar_width = if tui.session_panel.open {
        SIDEBAR_WIDTH
    } else {
        0
    };
    let [sidebar_area, content_area] =
        Layout::horizontal([Length(sidebar_width), Min(0)]).areas(frame.area());

    if tui.session_panel.open {
        SessionPanel::new(
            &mut tui.session_panel,
            &app.chat_history,
            &app.sessions,
            app.active_session,
            matches!(tui.focus, Focus::Sidebar),
        )
        .render(frame, sidebar_area);
    }

    let [title_area, chat_area, input_area] =
        Layout::vertical([Length(1), Min(0), Length(3)]).areas(content_area);

    // Title bar
    let title_text = if app.status_message.is_empty() {
        format!("Coze ({})", tui.backend_label)
    } else {
        format!("Coze ({}) | {}", tui.backend_label, app.status_message)
    };
    frame.render_widget(
        Span::styled(
            title_text,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        title_area,
    );

    MessageList::new(&mut tui.message_list, app, spinner_frame).render(frame, chat_area);

    tui.input_box.focused = matches!(tui.focus, Focus::Input);
    tui.input_box.render(frame, input_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_draw_ui_smoke() {
        let app = test_app();
        let mut tui = TuiState::new("http://localhost:8000".to_string());
        let text = draw(&app, &mut tui);
        assert!(text.contains("Coze (http://localhost:8000)"));
        assert!(text.contains("Chats"));
        assert!(text.contains("+ New Chat"));
    }

    #[test]
    fn test_draw_ui_with_collapsed_sidebar() {
        let app = test_app();
        let mut tui = TuiState::new("backend".to_string());
        tui.session_panel.toggle_open();
        let text = draw(&app, &mut tui);
        assert!(!text.contains("+ New Chat"));
    }

    #[test]
    fn test_status_message_in_title() {
        let mut app = test_app();
        app.status_message = String::from("Thinking...");
        let mut tui = TuiState::new("backend".to_string());
        let text = draw(&app, &mut tui);
        assert!(text.contains("Thinking..."));
    }
}
