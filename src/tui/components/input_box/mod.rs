//! # InputBox Component
//!
//! The question field at the bottom of the chat view.
//!
//! ## Responsibilities
//!
//! - Capture and edit text (cursor movement, paste, multi-byte safe)
//! - Show a live character counter against the ceiling
//! - Show inline validation text handed down from the app
//! - Emit `Submit` on Enter without clearing; the event loop clears the
//!   buffer only once the submission is accepted
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. `max_chars`, `error` and `busy`
//! are props synced from `App` each frame.

mod layout;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use layout::{
    CONTENT_OFFSET_X, CONTENT_OFFSET_Y, MAX_VISIBLE_ROWS, VERTICAL_OVERHEAD, cursor_cell,
    inner_width, layout_rows, next_char_boundary, offset_at_column, prev_char_boundary,
};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with non-blank text
    Submit(String),
    /// Buffer content changed
    Edited,
    /// Cursor moved without editing
    Moved,
}

pub struct InputBox {
    buffer: String,
    /// Cursor as a byte offset into `buffer`
    cursor: usize,
    /// First visible row when the text is taller than the box
    scroll: u16,
    /// Inner width from the last render, used for vertical movement
    last_width: u16,
    /// Character ceiling (Prop)
    pub max_chars: usize,
    /// Inline validation text (Prop)
    pub error: Option<String>,
    /// A request is in flight (Prop)
    pub busy: bool,
}

impl InputBox {
    pub fn new(max_chars: usize) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            scroll: 0,
            last_width: 76,
            max_chars,
            error: None,
            busy: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    /// Replaces the buffer and puts the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.buffer = text.to_string();
        self.cursor = self.buffer.len();
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Height for the current content at `area_width`, borders included.
    pub fn calculate_height(&self, area_width: u16) -> u16 {
        let rows = layout_rows(&self.buffer, inner_width(area_width)).len() as u16;
        rows.clamp(1, MAX_VISIBLE_ROWS) + VERTICAL_OVERHEAD
    }

    fn insert(&mut self, text: &str) -> InputEvent {
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
        InputEvent::Edited
    }

    fn move_vertically(&mut self, down: bool) -> bool {
        let rows = layout_rows(&self.buffer, self.last_width);
        let (column, row) = cursor_cell(&self.buffer, &rows, self.cursor);
        let target = if down {
            usize::from(row) + 1
        } else if row == 0 {
            return false;
        } else {
            usize::from(row) - 1
        };
        match rows.get(target) {
            Some(&target_row) => {
                self.cursor = offset_at_column(&self.buffer, target_row, column);
                true
            }
            None => false,
        }
    }

    fn keep_cursor_visible(&mut self, cursor_row: u16, visible_rows: u16) {
        if cursor_row < self.scroll {
            self.scroll = cursor_row;
        } else if cursor_row >= self.scroll + visible_rows {
            self.scroll = cursor_row + 1 - visible_rows;
        }
    }

    fn counter_line(&self) -> Line<'static> {
        let count = self.char_count();
        let style = if count > self.max_chars {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::styled(format!(" {}/{} ", count, self.max_chars), style).right_aligned()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = inner_width(area.width);
        self.last_width = width;

        let rows = layout_rows(&self.buffer, width);
        let visible_rows = area.height.saturating_sub(VERTICAL_OVERHEAD).max(1);
        let (cursor_col, cursor_row) = cursor_cell(&self.buffer, &rows, self.cursor);
        self.keep_cursor_visible(cursor_row, visible_rows);

        let lines: Vec<Line> = rows
            .iter()
            .skip(usize::from(self.scroll))
            .take(usize::from(visible_rows))
            .map(|row| Line::raw(&self.buffer[row.start..row.end]))
            .collect();

        let border_style = if self.error.is_some() {
            Style::default().fg(Color::Red)
        } else if self.busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Magenta)
        };

        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .padding(Padding::horizontal(1))
            .title(" Ask a question... ")
            .title_bottom(self.counter_line());
        if let Some(error) = &self.error {
            block = block.title_bottom(
                Line::styled(format!(" {error} "), Style::default().fg(Color::Red))
                    .left_aligned(),
            );
        }

        let text_style = if self.busy {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        frame.render_widget(Paragraph::new(lines).style(text_style).block(block), area);

        if !self.busy {
            frame.set_cursor_position((
                area.x + CONTENT_OFFSET_X + cursor_col,
                area.y + CONTENT_OFFSET_Y + cursor_row.saturating_sub(self.scroll),
            ));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        // locked while a question is in flight
        if self.busy {
            return None;
        }
        match event {
            TuiEvent::InputChar(c) => {
                let mut encoded = [0u8; 4];
                Some(self.insert(c.encode_utf8(&mut encoded)))
            }
            TuiEvent::Paste(text) => Some(self.insert(&text.replace('\r', ""))),
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::Edited
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::Edited
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::Moved
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::Moved
            }),
            TuiEvent::CursorHome => {
                let start = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                (self.cursor != start).then(|| {
                    self.cursor = start;
                    InputEvent::Moved
                })
            }
            TuiEvent::CursorEnd => {
                let end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |i| self.cursor + i);
                (self.cursor != end).then(|| {
                    self.cursor = end;
                    InputEvent::Moved
                })
            }
            TuiEvent::CursorUp => self.move_vertically(false).then_some(InputEvent::Moved),
            TuiEvent::CursorDown => self.move_vertically(true).then_some(InputEvent::Moved),
            TuiEvent::Submit => {
                (!self.buffer.trim().is_empty()).then(|| InputEvent::Submit(self.buffer.clone()))
            }
            _ => None,
        }
    }
}
