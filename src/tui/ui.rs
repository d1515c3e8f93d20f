//! Page shell: header, active view, input (chat only) and footer.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{App, AuthState, View};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{LandingPage, MessageList, SourcesView, TitleBar};

pub const FOOTER_TEXT: &str =
    "🌌 Powered by RAG • All responses grounded in NDT's writings and interviews";

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let input_height = match app.view {
        View::Chat => tui.input_box.calculate_height(frame.area().width),
        View::Sources => 0,
    };
    let [header_area, _, main_area, input_area, footer_area] =
        Layout::vertical([Length(2), Length(1), Min(0), Length(input_height), Length(2)])
            .areas(frame.area());

    TitleBar::new(&app.auth, app.backend_status, &app.status_message, app.view)
        .render(frame, header_area);

    match app.view {
        View::Chat => {
            if app.messages.is_empty() && !app.is_loading {
                LandingPage::new(tui.last_example).render(frame, main_area);
            } else {
                MessageList::new(
                    &mut tui.message_list,
                    &app.messages,
                    app.is_loading,
                    spinner_frame,
                )
                .render(frame, main_area);
            }
            tui.input_box.render(frame, input_area);
        }
        View::Sources => {
            SourcesView::new(&mut tui.sources_view, app.sources.as_slice(), app.sources_loading)
                .render(frame, main_area);
        }
    }

    draw_footer(frame, footer_area, app);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let [credit, hints] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

    frame.render_widget(
        Paragraph::new(Line::styled(FOOTER_TEXT, Style::default().fg(Color::DarkGray)).centered()),
        credit,
    );
    frame.render_widget(Paragraph::new(key_hints(app).centered()), hints);
}

fn key_hints(app: &App) -> Line<'static> {
    let mut pairs: Vec<(&str, &str)> = match app.view {
        View::Chat => vec![("Ctrl+S", "Sources"), ("Enter", "Send"), ("Tab", "Example")],
        View::Sources => vec![("Ctrl+S", "Chat"), ("r", "Fetch"), ("Enter", "Open")],
    };
    match app.auth {
        AuthState::SignedIn(_) => pairs.push(("Ctrl+K", "Sign out")),
        AuthState::SignedOut => pairs.push(("Ctrl+L", "Sign in")),
        AuthState::Disabled | AuthState::Loading => {}
    }
    pairs.push(("Ctrl+C", "Quit"));

    let mut spans = Vec::new();
    for (i, (key, label)) in pairs.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(key, Style::default().fg(Color::Magenta)));
        spans.push(Span::styled(format!(" {label}"), Style::default().fg(Color::Gray)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserInfo;
    use crate::core::message::ChatMessage;
    use crate::test_support::test_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui, 0)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_empty_chat_shows_welcome_and_footer() {
        let app = test_app();
        let mut tui = TuiState::new(app.max_message_chars);
        let text = draw(&app, &mut tui);
        assert!(text.contains("Neil deGrasse Tyson AI"));
        assert!(text.contains("Welcome to the Cosmos!"));
        assert!(text.contains("What happens inside a black hole?"));
        assert!(text.contains("Tab to try an example question"));
        assert!(text.contains("Powered by RAG"));
        assert!(text.contains("Ask a question..."));
    }

    #[test]
    fn test_transcript_replaces_welcome() {
        let mut app = test_app();
        app.messages.push(ChatMessage::user("Why are we made of stardust?"));
        app.is_loading = true;
        let mut tui = TuiState::new(app.max_message_chars);
        let text = draw(&app, &mut tui);
        assert!(!text.contains("Welcome to the Cosmos!"));
        assert!(!text.contains("Tab to try an example question"));
        assert!(!text.contains("What happens inside a black hole?"));
        assert!(text.contains("Why are we made of stardust?"));
        assert!(text.contains("Thinking..."));
    }

    #[test]
    fn test_sources_view_hides_input() {
        let mut app = test_app();
        app.view = View::Sources;
        let mut tui = TuiState::new(app.max_message_chars);
        let text = draw(&app, &mut tui);
        assert!(text.contains("No sources collected yet."));
        assert!(!text.contains("Ask a question..."));
    }

    #[test]
    fn test_key_hints_follow_auth_state() {
        let mut app = test_app();
        let hints = |app: &App| -> String {
            key_hints(app).spans.iter().map(|s| s.content.as_ref()).collect()
        };
        assert!(!hints(&app).contains("Sign"));

        app.auth = AuthState::SignedOut;
        assert!(hints(&app).contains("Sign in"));

        app.auth = AuthState::SignedIn(UserInfo::default());
        assert!(hints(&app).contains("Sign out"));
    }
}
