use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::core::message::{ChatMessage, Role};
use crate::tui::component::Component;
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

const USER_COLOR: Color = Color::Magenta;
const ASSISTANT_COLOR: Color = Color::Cyan;
const BADGE_PREFIX: &str = "📚 ";

/// Renders one transcript turn.
///
/// User turns are plain text. Assistant turns are markdown. When the turn
/// carries inline sources, each URL is listed under the answer as a badge.
///
/// Created fresh each frame; holds no state of its own.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
    pub is_latest: bool,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage, is_latest: bool) -> Self {
        Self { message, is_latest }
    }

    /// Height of the rendered turn at `width`, borders included.
    ///
    /// Uses the same `Paragraph` the widget renders, so the estimate and the
    /// output can't drift apart.
    pub fn calculate_height(message: &ChatMessage, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        let lines = body(message, content_width).line_count(content_width);
        // very long answers clamp to the largest drawable height
        u16::try_from(lines)
            .unwrap_or(u16::MAX)
            .max(1)
            .saturating_add(VERTICAL_OVERHEAD)
    }
}

/// Builds the paragraph shown inside the border.
fn body(message: &ChatMessage, content_width: u16) -> Paragraph<'static> {
    let mut text = match message.role {
        Role::User => Text::styled(
            message.content.trim().to_string(),
            Style::default().fg(Color::White),
        ),
        Role::Assistant => markdown::render(message.content.trim(), Color::White),
    };

    if let Some(sources) = message.sources.as_deref().filter(|s| !s.is_empty()) {
        text.lines.push(Line::default());
        for url in sources {
            for (i, piece) in wrap_url(url, content_width).into_iter().enumerate() {
                let lead = if i == 0 { BADGE_PREFIX } else { "   " };
                text.lines.push(Line::from(vec![
                    Span::styled(lead, Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        piece,
                        Style::default()
                            .fg(Color::Blue)
                            .add_modifier(Modifier::UNDERLINED),
                    ),
                ]));
            }
        }
    }

    Paragraph::new(text).wrap(Wrap { trim: false })
}

/// Splits a URL into pieces that fit after the badge prefix. URLs have no
/// spaces, so word wrapping would leave them overflowing.
fn wrap_url(url: &str, content_width: u16) -> Vec<String> {
    let width = usize::from(content_width).saturating_sub(3).max(1);
    let options = textwrap::Options::new(width)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    textwrap::wrap(url, options)
        .into_iter()
        .map(|piece| piece.into_owned())
        .collect()
}

fn title(message: &ChatMessage) -> String {
    let who = match message.role {
        Role::User => "You",
        Role::Assistant => "Neil deGrasse Tyson",
    };
    format!(" {} · {} ", who, message.sent_at.format("%H:%M"))
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let color = match self.message.role {
            Role::User => USER_COLOR,
            Role::Assistant => ASSISTANT_COLOR,
        };
        let border_style = if self.is_latest {
            Style::default().fg(color)
        } else {
            Style::default().fg(color).add_modifier(Modifier::DIM)
        };

        let block = Block::bordered()
            .title(title(self.message))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style.add_modifier(Modifier::BOLD))
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);
        body(self.message, inner.width).render(inner, buf);
    }
}

impl<'a> Component for Message<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render_to_string(message: &ChatMessage, width: u16) -> String {
        let height = Message::calculate_height(message, width);
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| f.render_widget(Message::new(message, true), f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn calculate_height_single_line() {
        let message = ChatMessage::user("Hello");
        assert_eq!(Message::calculate_height(&message, 80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_zero_width_returns_minimum() {
        let message = ChatMessage::user("Hello world");
        assert_eq!(Message::calculate_height(&message, 0), 1);
        assert_eq!(Message::calculate_height(&message, HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn calculate_height_breaks_long_words() {
        let message = ChatMessage::user("abcdefghij");
        // content width 4: "abcd" | "efgh" | "ij"
        assert_eq!(Message::calculate_height(&message, 8), 3 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn calculate_height_tracks_long_replies() {
        let message = ChatMessage::assistant("line\n\n".repeat(30_000), None);
        // blank-separated paragraphs: 30,000 text rows plus 29,999 gaps
        assert_eq!(
            Message::calculate_height(&message, 80),
            59_999 + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn calculate_height_saturates_instead_of_wrapping() {
        let message = ChatMessage::user("line\n".repeat(70_000));
        assert_eq!(Message::calculate_height(&message, 80), u16::MAX);
    }

    #[test]
    fn calculate_height_counts_source_badges() {
        let plain = ChatMessage::assistant("Answer", None);
        let badged = ChatMessage::assistant(
            "Answer",
            Some(vec!["https://a.example".into(), "https://b.example".into()]),
        );
        // blank separator + one line per badge
        assert_eq!(
            Message::calculate_height(&badged, 80),
            Message::calculate_height(&plain, 80) + 3
        );
    }

    #[test]
    fn empty_source_list_renders_no_badges() {
        let message = ChatMessage::assistant("Answer", Some(vec![]));
        assert!(!render_to_string(&message, 60).contains(BADGE_PREFIX.trim()));
    }

    #[test]
    fn user_turn_is_titled_you() {
        let text = render_to_string(&ChatMessage::user("Why is the sky dark?"), 60);
        assert!(text.contains("You"));
        assert!(text.contains("Why is the sky dark?"));
    }

    #[test]
    fn assistant_turn_renders_markdown_and_badges() {
        let message = ChatMessage::assistant(
            "We are **star stuff**.",
            Some(vec!["https://haydenplanetarium.org/tyson".into()]),
        );
        let text = render_to_string(&message, 60);
        assert!(text.contains("Neil deGrasse Tyson"));
        assert!(text.contains("star stuff"));
        assert!(!text.contains("**"));
        assert!(text.contains("haydenplanetarium.org/tyson"));
    }

    #[test]
    fn long_urls_are_broken_to_fit() {
        let pieces = wrap_url("https://example.com/a/very/long/path", 14);
        assert!(pieces.len() > 1);
        assert!(pieces.iter().all(|p| p.chars().count() <= 11));
        assert_eq!(pieces.concat(), "https://example.com/a/very/long/path");
    }
}
