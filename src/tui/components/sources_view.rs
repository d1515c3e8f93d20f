//! # Sources View Component
//!
//! Full-page list of reference URLs, toggled with Ctrl+S.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `SourcesViewState` lives in `TuiState` (selection survives view switches)
//! - `SourcesView` is created each frame with the current URL list as a prop

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph, Wrap};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub const EMPTY_TEXT: &str =
    "No sources collected yet. Ask questions to build the knowledge reference list.";
const HEADER_TEXT: &str = "The chatbot draws from these URLs (interviews, transcripts, \
articles). They are aggregated from responses.";

/// Events emitted by the sources view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcesEvent {
    /// Open the entry at this index in the browser
    Open(usize),
    /// Ask the backend for its source listing
    Refresh,
}

#[derive(Default)]
pub struct SourcesViewState {
    pub list_state: ListState,
    /// Entry count from the last render, used to clamp navigation
    len: usize,
}

impl SourcesViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    fn sync_len(&mut self, len: usize) {
        self.len = len;
        match self.list_state.selected() {
            _ if len == 0 => self.list_state.select(None),
            None => self.list_state.select(Some(0)),
            Some(i) if i >= len => self.list_state.select(Some(len - 1)),
            Some(_) => {}
        }
    }
}

impl EventHandler for SourcesViewState {
    type Event = SourcesEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar('r') => Some(SourcesEvent::Refresh),
            TuiEvent::CursorUp | TuiEvent::ScrollUp | TuiEvent::InputChar('k') => {
                if self.len > 0 {
                    let i = self.selected().unwrap_or(0).saturating_sub(1);
                    self.list_state.select(Some(i));
                }
                None
            }
            TuiEvent::CursorDown | TuiEvent::ScrollDown | TuiEvent::InputChar('j') => {
                if self.len > 0 {
                    let i = self.selected().map_or(0, |i| (i + 1).min(self.len - 1));
                    self.list_state.select(Some(i));
                }
                None
            }
            TuiEvent::Submit => self.selected().filter(|&i| i < self.len).map(SourcesEvent::Open),
            _ => None,
        }
    }
}

pub struct SourcesView<'a> {
    state: &'a mut SourcesViewState,
    sources: &'a [String],
    loading: bool,
}

impl<'a> SourcesView<'a> {
    pub fn new(state: &'a mut SourcesViewState, sources: &'a [String], loading: bool) -> Self {
        Self {
            state,
            sources,
            loading,
        }
    }
}

impl<'a> Component for SourcesView<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync_len(self.sources.len());

        let title = if self.loading {
            " 📚 Sources (loading...) ".to_string()
        } else if self.sources.is_empty() {
            " 📚 Sources ".to_string()
        } else {
            format!(" 📚 Referenced Sources ({}) ", self.sources.len())
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_bottom(Line::from(" ↑↓ Select  Enter Open  r Fetch from backend ").centered())
            .padding(Padding::horizontal(1));

        if self.sources.is_empty() {
            let empty = Paragraph::new(EMPTY_TEXT)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header_area, list_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(inner);

        frame.render_widget(
            Paragraph::new(HEADER_TEXT)
                .style(Style::default().fg(Color::Gray))
                .wrap(Wrap { trim: true }),
            header_area,
        );

        let items: Vec<ListItem> = self
            .sources
            .iter()
            .map(|url| {
                ListItem::new(Line::from(vec![
                    Span::raw("• "),
                    Span::styled(url.as_str(), Style::default().fg(Color::Blue)),
                ]))
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );

        frame.render_stateful_widget(list, list_area, &mut self.state.list_state);
    }
}
