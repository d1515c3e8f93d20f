//! # TitleBar Component
//!
//! Two-line page header.
//!
//! ```text
//! Neil deGrasse Tyson AI                         Signed in as carl@example.com
//! "The universe is under no obligation..."             ● online │ Ready
//! ```
//!
//! Stateless: every field is a prop filled in from `App` each frame.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::state::{AuthState, BackendStatus, View};
use crate::tui::component::Component;

pub const TITLE: &str = "Neil deGrasse Tyson AI";
pub const QUOTE: &str = "\"The universe is under no obligation to make sense to you.\"";

pub struct TitleBar<'a> {
    pub auth: &'a AuthState,
    pub backend_status: BackendStatus,
    pub status_message: &'a str,
    pub view: View,
}

impl<'a> TitleBar<'a> {
    pub fn new(
        auth: &'a AuthState,
        backend_status: BackendStatus,
        status_message: &'a str,
        view: View,
    ) -> Self {
        Self {
            auth,
            backend_status,
            status_message,
            view,
        }
    }

    /// Auth status text; `None` when auth is not configured.
    pub fn auth_label(auth: &AuthState) -> Option<String> {
        match auth {
            AuthState::Disabled => None,
            AuthState::Loading => Some("Loading...".to_string()),
            AuthState::SignedOut => Some("Not signed in".to_string()),
            AuthState::SignedIn(user) => Some(format!("Signed in as {}", user.user_details)),
        }
    }

    fn backend_span(&self) -> Span<'static> {
        match self.backend_status {
            BackendStatus::Unknown => Span::styled("● checking", Style::default().fg(Color::DarkGray)),
            BackendStatus::Online => Span::styled("● online", Style::default().fg(Color::Green)),
            BackendStatus::Offline => Span::styled("● offline", Style::default().fg(Color::Red)),
        }
    }
}

impl<'a> Component for TitleBar<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [top, bottom] = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

        let page = match self.view {
            View::Chat => "Chat",
            View::Sources => "Sources",
        };
        let title = Line::from(vec![
            Span::styled(
                TITLE,
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  › {page}"), Style::default().fg(Color::DarkGray)),
        ]);
        frame.render_widget(Paragraph::new(title), top);

        if let Some(label) = Self::auth_label(self.auth) {
            let style = match self.auth {
                AuthState::SignedIn(_) => Style::default().fg(Color::Green),
                _ => Style::default().fg(Color::Gray),
            };
            frame.render_widget(Paragraph::new(Line::styled(label, style).right_aligned()), top);
        }

        frame.render_widget(
            Paragraph::new(Line::styled(
                QUOTE,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )),
            bottom,
        );

        let mut status = vec![self.backend_span()];
        if !self.status_message.is_empty() {
            status.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
            status.push(Span::raw(self.status_message.to_string()));
        }
        frame.render_widget(Paragraph::new(Line::from(status).right_aligned()), bottom);
    }
}
