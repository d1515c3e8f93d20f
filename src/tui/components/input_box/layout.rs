//! Row layout for the input box.
//!
//! The buffer is broken into display rows by hand (hard wrap at the inner
//! width, plus explicit newlines) so that the cursor cell and the rendered
//! text always agree. Positions are byte offsets into the buffer.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Rows shown before the box starts scrolling internally
pub(super) const MAX_VISIBLE_ROWS: u16 = 4;
/// Border plus padding on the left edge
pub(super) const CONTENT_OFFSET_X: u16 = 2;
pub(super) const CONTENT_OFFSET_Y: u16 = 1;

/// One display row: `text[start..end]`. `ends_line` marks the last row of a
/// logical line (the next byte, if any, is a newline).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Row {
    pub start: usize,
    pub end: usize,
    pub ends_line: bool,
}

pub(super) fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Splits `text` into rows no wider than `width` columns. Always returns at
/// least one row.
pub(super) fn layout_rows(text: &str, width: u16) -> Vec<Row> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut line_start = 0;

    for line in text.split('\n') {
        let mut row_start = line_start;
        let mut used = 0;
        for (offset, ch) in line.char_indices() {
            let w = ch.width().unwrap_or(0);
            if used > 0 && used + w > width {
                rows.push(Row {
                    start: row_start,
                    end: line_start + offset,
                    ends_line: false,
                });
                row_start = line_start + offset;
                used = 0;
            }
            used += w;
        }
        let line_end = line_start + line.len();
        rows.push(Row {
            start: row_start,
            end: line_end,
            ends_line: true,
        });
        line_start = line_end + 1;
    }

    rows
}

/// `(column, row)` of byte offset `pos`.
pub(super) fn cursor_cell(text: &str, rows: &[Row], pos: usize) -> (u16, u16) {
    for (i, row) in rows.iter().enumerate() {
        let inside = pos >= row.start && (pos < row.end || (pos == row.end && row.ends_line));
        if inside {
            return (text[row.start..pos].width() as u16, i as u16);
        }
    }
    (0, rows.len().saturating_sub(1) as u16)
}

/// Byte offset in `row` closest to display `column` without passing it.
pub(super) fn offset_at_column(text: &str, row: Row, column: u16) -> usize {
    let mut used = 0;
    for (offset, ch) in text[row.start..row.end].char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > usize::from(column) {
            return row.start + offset;
        }
        used += w;
    }
    row.end
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}
