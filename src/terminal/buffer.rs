//! Bounded line buffer with a cursor.

use std::collections::VecDeque;

/// Widest line the buffer will hold.
///
/// The cursor never moves past column `MAX_COLS - 1`; writing there
/// overwrites the last cell, like a terminal with autowrap off.
pub const MAX_COLS: usize = 4096;

fn clamp_col(col: usize) -> usize {
    col.min(MAX_COLS - 1)
}

/// Reconstructed screen: an ordered run of lines plus a write cursor.
///
/// The buffer never holds more than `max_lines` lines. When a line feed
/// would exceed that, the oldest line is evicted and the cursor row shifts
/// up with the content so it keeps pointing at the same line.
#[derive(Debug, Clone)]
pub struct ScreenBuffer {
    lines: VecDeque<Vec<char>>,
    cursor_row: usize,
    cursor_col: usize,
    max_lines: usize,
}

impl ScreenBuffer {
    /// Create a buffer holding one empty line with the cursor at (0, 0).
    ///
    /// A capacity of zero is treated as one; a screen always has a line
    /// for the cursor to sit on.
    pub fn new(max_lines: usize) -> Self {
        let mut lines = VecDeque::new();
        lines.push_back(Vec::new());
        Self {
            lines,
            cursor_row: 0,
            cursor_col: 0,
            max_lines: max_lines.max(1),
        }
    }

    /// Restore the initial single-empty-line state.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_lines);
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Always false; the buffer holds at least one line.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Cursor position as (row, col), both 0-based.
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// Line `index` as a string, or `None` past the end.
    pub fn line(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(|l| l.iter().collect())
    }

    /// All retained lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().map(|l| l.iter().collect()).collect()
    }

    /// The last `count` lines, oldest first. Fewer if the buffer is shorter.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(count);
        self.lines
            .iter()
            .skip(skip)
            .map(|l| l.iter().collect())
            .collect()
    }

    fn last_index(&self) -> usize {
        self.lines.len() - 1
    }

    fn current_line(&mut self) -> &mut Vec<char> {
        let row = self.cursor_row.min(self.last_index());
        &mut self.lines[row]
    }

    /// Append an empty line, evicting from the front when over capacity.
    fn push_line(&mut self) {
        self.lines.push_back(Vec::new());
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
            self.cursor_row = self.cursor_row.saturating_sub(1);
        }
    }

    /// Write one visible character at the cursor and advance the column.
    ///
    /// At the right margin the column stays put.
    pub(crate) fn put_char(&mut self, c: char) {
        let col = self.cursor_col;
        let line = self.current_line();
        if line.len() < col {
            line.resize(col, ' ');
        }
        if col < line.len() {
            line[col] = c;
        } else {
            line.push(c);
        }
        self.cursor_col = clamp_col(col + 1);
    }

    /// Move down one row, creating the row if the cursor is on the last line.
    pub(crate) fn line_feed(&mut self) {
        self.cursor_row += 1;
        if self.cursor_row > self.last_index() {
            self.push_line();
        }
    }

    pub(crate) fn carriage_return(&mut self) {
        self.cursor_col = 0;
    }

    pub(crate) fn backspace(&mut self) {
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    /// Advance to the next multiple-of-eight column.
    pub(crate) fn tab(&mut self) {
        self.cursor_col = clamp_col((self.cursor_col / 8 + 1) * 8);
    }

    pub(crate) fn cursor_up(&mut self, n: usize) {
        self.cursor_row = self.cursor_row.saturating_sub(n);
    }

    pub(crate) fn cursor_down(&mut self, n: usize) {
        self.cursor_row = self.cursor_row.saturating_add(n).min(self.last_index());
    }

    pub(crate) fn cursor_forward(&mut self, n: usize) {
        self.cursor_col = clamp_col(self.cursor_col.saturating_add(n));
    }

    pub(crate) fn cursor_back(&mut self, n: usize) {
        self.cursor_col = self.cursor_col.saturating_sub(n);
    }

    /// Absolute move to a 0-based (row, col), growing the buffer down to `row`.
    ///
    /// Rows past capacity land on the last row the buffer can hold, and
    /// columns past [`MAX_COLS`] on the last column.
    pub(crate) fn set_position(&mut self, row: usize, col: usize) {
        let row = row.min(self.max_lines - 1);
        while self.lines.len() <= row {
            self.lines.push_back(Vec::new());
        }
        self.cursor_row = row;
        self.cursor_col = clamp_col(col);
    }

    /// Erase the whole display: one empty line, cursor home.
    pub(crate) fn clear_all(&mut self) {
        self.reset();
    }

    /// Truncate the current line at the cursor column.
    pub(crate) fn erase_to_end(&mut self) {
        let col = self.cursor_col;
        self.current_line().truncate(col);
    }

    /// Blank from the start of the line through the cursor column.
    pub(crate) fn erase_to_start(&mut self) {
        let col = self.cursor_col;
        let line = self.current_line();
        if line.len() <= col {
            line.resize(col + 1, ' ');
        }
        line[..=col].fill(' ');
    }

    pub(crate) fn erase_line(&mut self) {
        self.current_line().clear();
    }
}

impl Default for ScreenBuffer {
    fn default() -> Self {
        Self::new(super::DEFAULT_MAX_LINES)
    }
}
