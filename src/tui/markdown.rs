//! Markdown → ratatui `Text` for assistant answers.
//!
//! Walks `pulldown_cmark` events and builds styled lines. Supports the GFM
//! subset answers actually use: headings, emphasis, strikethrough, inline
//! and fenced code (highlighted with syntect), lists, task lists, block
//! quotes, links, rules and tables.

use std::sync::LazyLock;

use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, LinkType, Options, Parser, Tag, TagEnd,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use unicode_width::UnicodeWidthStr;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME: LazyLock<Option<Theme>> = LazyLock::new(|| {
    ThemeSet::load_defaults()
        .themes
        .remove("base16-ocean.dark")
});

const MUTED: Color = Color::DarkGray;
const LINK: Color = Color::Blue;

/// Renders `content` as styled text with `base_fg` as the body color.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES;
    let mut renderer = Renderer::new(base_fg);
    for event in Parser::new_ext(content, options) {
        renderer.event(event);
    }
    renderer.finish()
}

/// Where text events are going right now.
enum Sink {
    Flow,
    /// Fenced or indented code; `None` when the language is unknown.
    Code(Option<HighlightLines<'static>>),
    Table(TableBuilder),
}

struct Link {
    url: String,
    /// Bare `<https://...>` autolinks already show their URL as text.
    show_url: bool,
}

struct Renderer {
    lines: Vec<Line<'static>>,
    base: Style,
    inline: Vec<Style>,
    /// Prepended to every new line (quote bars, code gutters)
    gutters: Vec<Span<'static>>,
    /// One entry per open list: next number, or `None` for bullets
    lists: Vec<Option<u64>>,
    link: Option<Link>,
    sink: Sink,
    pending_gap: bool,
    item_fresh: bool,
}

impl Renderer {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base: Style::default().fg(base_fg),
            inline: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            link: None,
            sink: Sink::Flow,
            pending_gap: false,
            item_fresh: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn style(&self) -> Style {
        self.inline.last().copied().unwrap_or(self.base)
    }

    fn push_inline(&mut self, overlay: Style) {
        let next = self.style().patch(overlay);
        self.inline.push(next);
    }

    fn new_line(&mut self, mut line: Line<'static>) {
        for gutter in self.gutters.iter().rev() {
            line.spans.insert(0, gutter.clone());
        }
        self.lines.push(line);
    }

    fn append(&mut self, span: Span<'static>) {
        match self.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(Line::from(span)),
        }
    }

    /// Separates block elements with a single blank line.
    fn start_block(&mut self) {
        if self.pending_gap {
            self.new_line(Line::default());
            self.pending_gap = false;
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if !matches!(event, Event::Start(Tag::Paragraph)) {
            self.item_fresh = false;
        }
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(text),
            Event::Code(code) => {
                let span = Span::styled(
                    code.to_string(),
                    Style::default().fg(Color::Yellow).bg(Color::Black),
                );
                match &mut self.sink {
                    Sink::Table(table) => table.push(span),
                    _ => self.append(span),
                }
            }
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(Line::default()),
            Event::Rule => {
                self.start_block();
                self.new_line(Line::styled("─".repeat(32), Style::default().fg(MUTED)));
                self.pending_gap = true;
            }
            Event::TaskListMarker(done) => {
                let mark = if done { "☑ " } else { "☐ " };
                self.append(Span::styled(mark, Style::default().fg(MUTED)));
            }
            // raw HTML, footnotes and math are dropped
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // loose list items: first paragraph continues the bullet line
                if self.item_fresh {
                    self.item_fresh = false;
                    self.pending_gap = false;
                } else {
                    self.start_block();
                    self.new_line(Line::default());
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                let style = heading_style(level).fg(self.base.fg.unwrap_or(Color::Reset));
                self.new_line(Line::default());
                self.inline.push(style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.gutters.push(Span::styled("▎ ", Style::default().fg(MUTED)));
                self.push_inline(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.split_whitespace().next().unwrap_or("").to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let label = if lang.is_empty() { "code".to_string() } else { lang.clone() };
                self.new_line(Line::styled(format!("┌ {label}"), Style::default().fg(MUTED)));
                self.gutters.push(Span::styled("│ ", Style::default().fg(MUTED)));
                self.sink = Sink::Code(highlighter_for(&lang));
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.new_line(Line::from(Span::styled(marker, Style::default().fg(MUTED))));
                self.item_fresh = true;
            }
            Tag::Table(_) => {
                self.start_block();
                self.sink = Sink::Table(TableBuilder::default());
            }
            Tag::TableRow | Tag::TableHead => {
                if let Sink::Table(table) = &mut self.sink {
                    table.rows.push(Vec::new());
                }
            }
            Tag::TableCell => {
                if let Sink::Table(table) = &mut self.sink
                    && let Some(row) = table.rows.last_mut()
                {
                    row.push(Vec::new());
                }
            }
            Tag::Emphasis => self.push_inline(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_inline(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                self.link = Some(Link {
                    url: dest_url.to_string(),
                    show_url: !matches!(link_type, LinkType::Autolink | LinkType::Email),
                });
                self.push_inline(Style::default().fg(LINK).add_modifier(Modifier::UNDERLINED));
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.pending_gap = true,
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.inline.pop();
                self.pending_gap = true;
            }
            TagEnd::CodeBlock => {
                self.sink = Sink::Flow;
                self.gutters.pop();
                self.new_line(Line::styled("└", Style::default().fg(MUTED)));
                self.pending_gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.pending_gap = true;
                }
            }
            TagEnd::Table => {
                if let Sink::Table(table) = std::mem::replace(&mut self.sink, Sink::Flow) {
                    for line in table.into_lines() {
                        self.new_line(line);
                    }
                }
                self.pending_gap = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(link) = self.link.take()
                    && link.show_url
                {
                    self.append(Span::styled(
                        format!(" ({})", link.url),
                        Style::default().fg(MUTED),
                    ));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        let text = text.replace('\t', "    ");
        let style = self.style();

        match &mut self.sink {
            Sink::Flow => self.append(Span::styled(text, style)),
            Sink::Table(table) => table.push(Span::styled(text, style)),
            Sink::Code(highlighter) => {
                let lines: Vec<Line<'static>> = match highlighter {
                    Some(h) => LinesWithEndings::from(&text)
                        .map(|line| highlight(h, line))
                        .collect(),
                    None => text
                        .lines()
                        .map(|line| Line::styled(line.to_string(), Style::default().fg(Color::Gray)))
                        .collect(),
                };
                for line in lines {
                    self.new_line(line);
                }
            }
        }
    }
}

fn highlighter_for(lang: &str) -> Option<HighlightLines<'static>> {
    if lang.is_empty() {
        return None;
    }
    let syntax = SYNTAX_SET.find_syntax_by_token(lang)?;
    let theme = THEME.as_ref()?;
    Some(HighlightLines::new(syntax, theme))
}

fn highlight(highlighter: &mut HighlightLines<'static>, line: &str) -> Line<'static> {
    match highlighter.highlight_line(line, &SYNTAX_SET) {
        Ok(ranges) => Line::from(
            ranges
                .into_iter()
                .map(|(style, piece)| {
                    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
                    Span::styled(piece.trim_end_matches('\n').to_string(), Style::default().fg(fg))
                })
                .filter(|span| !span.content.is_empty())
                .collect::<Vec<_>>(),
        ),
        Err(e) => {
            log::debug!("Highlighting failed: {}", e);
            Line::raw(line.trim_end_matches('\n').to_string())
        }
    }
}

/// Collects table cells, then lays them out in padded columns.
#[derive(Default)]
struct TableBuilder {
    /// rows → cells → spans; the first row is the header
    rows: Vec<Vec<Vec<Span<'static>>>>,
}

impl TableBuilder {
    fn push(&mut self, span: Span<'static>) {
        if let Some(cell) = self.rows.last_mut().and_then(|row| row.last_mut()) {
            cell.push(span);
        }
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let cell_width = |cell: &[Span<'static>]| -> usize {
            cell.iter().map(|s| s.content.width()).sum()
        };
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell_width(cell))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let bar = || Span::styled(" │ ", Style::default().fg(MUTED));
        let mut lines = Vec::new();
        for (r, row) in self.rows.into_iter().enumerate() {
            let mut spans = Vec::new();
            for (c, width) in widths.iter().enumerate() {
                if c > 0 {
                    spans.push(bar());
                }
                let cell = row.get(c).cloned().unwrap_or_default();
                let used = cell_width(&cell);
                for span in cell {
                    spans.push(if r == 0 {
                        span.patch_style(Style::default().add_modifier(Modifier::BOLD))
                    } else {
                        span
                    });
                }
                spans.push(Span::raw(" ".repeat(width.saturating_sub(used))));
            }
            lines.push(Line::from(spans));
            if r == 0 {
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                lines.push(Line::styled(rule, Style::default().fg(MUTED)));
            }
        }
        lines
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    match level {
        HeadingLevel::H1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        HeadingLevel::H2 => Style::default().add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn plain_paragraph_is_one_line_in_base_color() {
        let text = render("hello", Color::Green);
        assert_eq!(plain(&text), vec!["hello"]);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        let text = render("first\n\nsecond", Color::White);
        assert_eq!(plain(&text), vec!["first", "", "second"]);
    }

    #[test]
    fn heading_text_is_bold_without_hash_marks() {
        let text = render("## Cosmic Perspective", Color::White);
        let line = &text.lines[0];
        assert_eq!(plain(&text)[0], "Cosmic Perspective");
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn strong_and_emphasis_are_styled() {
        let text = render("We are **star** *stuff*", Color::White);
        let spans = &text.lines[0].spans;
        let star = spans.iter().find(|s| s.content == "star").unwrap();
        let stuff = spans.iter().find(|s| s.content == "stuff").unwrap();
        assert!(star.style.add_modifier.contains(Modifier::BOLD));
        assert!(stuff.style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn ordered_list_numbers_items() {
        let text = render("1. Sun\n2. Moon", Color::White);
        assert_eq!(plain(&text), vec!["1. Sun", "2. Moon"]);
    }

    #[test]
    fn named_link_shows_url_but_autolink_does_not_repeat_it() {
        let named = plain(&render("[Hayden](https://haydenplanetarium.org)", Color::White));
        assert_eq!(named[0], "Hayden (https://haydenplanetarium.org)");

        let auto = plain(&render("<https://haydenplanetarium.org>", Color::White));
        assert_eq!(auto[0], "https://haydenplanetarium.org");
    }

    #[test]
    fn code_block_is_framed_and_tabs_expanded() {
        let text = render("```\n\tlet x = 1;\n```", Color::White);
        let lines = plain(&text);
        assert!(lines[0].starts_with('┌'));
        assert_eq!(lines[1], "│     let x = 1;");
        assert_eq!(lines.last().map(String::as_str), Some("└"));
    }

    #[test]
    fn table_columns_are_aligned() {
        let text = render("| Planet | Moons |\n|---|---|\n| Mars | 2 |\n| Jupiter | 95 |", Color::White);
        let lines = plain(&text);
        assert_eq!(lines.len(), 4);
        let bar = lines[0].find('│').unwrap();
        assert_eq!(lines[2].find('│'), Some(bar));
        assert_eq!(lines[3].find('│'), Some(bar));
        assert!(lines[1].contains('┼'));
    }

    #[test]
    fn block_quote_has_gutter() {
        let lines = plain(&render("> The universe is under no obligation", Color::White));
        assert!(lines[0].starts_with("▎ "));
    }
}
