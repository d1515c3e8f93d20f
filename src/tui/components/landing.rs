//! # Landing Page Component
//!
//! Welcome screen shown while the transcript is empty: a greeting, a short
//! blurb and a few example questions. Tab cycles through the questions and
//! copies one into the input box; `highlighted` marks the last one copied.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::tui::component::Component;

pub const EXAMPLE_QUESTIONS: [(&str, &str); 4] = [
    ("⭐", "Why are we made of stardust?"),
    ("🕳", "What happens inside a black hole?"),
    ("🚀", "Should humans colonize Mars?"),
    ("🌌", "What is the cosmic perspective?"),
];

const BLURB: &str = "Ask me anything about astronomy, physics, space exploration, or the \
universe. I'm here to share the wonder of science with you!";

pub struct LandingPage {
    pub highlighted: Option<usize>,
}

impl LandingPage {
    pub fn new(highlighted: Option<usize>) -> Self {
        Self { highlighted }
    }

    fn question_lines(&self) -> Vec<Line<'static>> {
        EXAMPLE_QUESTIONS
            .iter()
            .enumerate()
            .map(|(i, (icon, question))| {
                let style = if self.highlighted == Some(i) {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                Line::from(vec![
                    Span::raw(format!("{icon} ")),
                    Span::styled(*question, style),
                ])
            })
            .collect()
    }
}

impl Component for LandingPage {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(72);
        let blurb_lines = textwrap::wrap(BLURB, usize::from(width.max(1))).len() as u16;

        let questions = self.question_lines();
        let [greeting_area, blurb_area, _, questions_area, _, hint_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(blurb_lines + 1),
            Constraint::Length(1),
            Constraint::Length(questions.len() as u16),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(area);

        let center = |r: Rect| {
            let [c] = Layout::horizontal([Constraint::Length(width)])
                .flex(Flex::Center)
                .areas(r);
            c
        };

        frame.render_widget(
            Paragraph::new(Line::styled(
                "👋 Welcome to the Cosmos!",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            center(greeting_area),
        );

        frame.render_widget(
            Paragraph::new(BLURB)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true }),
            center(blurb_area),
        );

        let question_width = EXAMPLE_QUESTIONS
            .iter()
            .map(|(_, q)| q.len() as u16 + 3)
            .max()
            .unwrap_or(0)
            .min(width);
        let [questions_rect] = Layout::horizontal([Constraint::Length(question_width)])
            .flex(Flex::Center)
            .areas(questions_area);
        frame.render_widget(Paragraph::new(questions), questions_rect);

        frame.render_widget(
            Paragraph::new(Line::styled(
                "Tab to try an example question",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center),
            center(hint_area),
        );
    }
}
