//! CEA-608 caption memory.
//!
//! A [`Memory`] is a 15x32 grid of [`Cell`]s with one guard row above and
//! below and one guard column on each side. The guard columns give the
//! background padding of a row somewhere to land.

use super::code::{Cea608Color, Pac, StyleCode, TRANSPARENT_SPACE};
use crate::types::{Color, StyledText, TextStyle};

/// Number of displayable rows.
pub const MAX_ROWS: usize = 15;

/// Number of displayable columns.
pub const MAX_COLS: usize = 32;

/// Columns per line including the two guard columns.
pub const LINE_WIDTH: usize = MAX_COLS + 2;

/// Composed display, row 1 first.
pub type DisplayRows = [Option<StyledRow>; MAX_ROWS];

/// A single grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    /// Style change that starts at this cell.
    pub mid_row: Option<StyleCode>,
    /// PAC that addressed this cell.
    pub pac: Option<Pac>,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: TRANSPARENT_SPACE,
            mid_row: None,
            pac: None,
        }
    }
}

impl Cell {
    fn is_visible(&self) -> bool {
        self.ch != TRANSPARENT_SPACE
    }
}

/// One row of caption memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    cells: [Cell; LINE_WIDTH],
}

impl Default for Line {
    fn default() -> Self {
        Line {
            cells: [Cell::default(); LINE_WIDTH],
        }
    }
}

impl Line {
    /// Cell at a column, including guard columns.
    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    /// Write a character. Clears any mid-row code stored in the cell.
    pub fn set_char(&mut self, col: usize, ch: char) {
        if let Some(cell) = self.cells.get_mut(col) {
            cell.ch = ch;
            cell.mid_row = None;
        }
    }

    /// Store a mid-row code, displayed as a space.
    pub fn set_mid_row(&mut self, col: usize, style: StyleCode) {
        if let Some(cell) = self.cells.get_mut(col) {
            cell.ch = ' ';
            cell.mid_row = Some(style);
        }
    }

    pub fn set_pac(&mut self, col: usize, pac: Pac) {
        if let Some(cell) = self.cells.get_mut(col) {
            cell.pac = Some(pac);
        }
    }

    /// True if the line was never written or has been cleared.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| *cell == Cell::default())
    }

    /// Row characters, transparent spaces included.
    pub fn text(&self) -> String {
        self.cells.iter().map(|cell| cell.ch).collect()
    }

    /// Compose the line into text plus style spans.
    ///
    /// Background spans cover each run of visible cells, widened by one
    /// column on a side whose edge cell is not a plain space. A run that
    /// touches column 1 or column 32 is not widened.
    pub fn styled_row(&self, background: Color) -> StyledRow {
        let mut spans = Vec::new();
        let mut run_start: Option<usize> = None;
        let mut style_start: Option<usize> = None;
        let mut current: Option<StyleCode> = None;

        for (col, cell) in self.cells.iter().enumerate() {
            let new_style = match (cell.mid_row, cell.pac) {
                (Some(style), _) => Some(style),
                (None, Some(pac)) if style_start.is_none() || run_start.is_none() => {
                    Some(pac.style)
                }
                _ => None,
            };

            if let Some(style) = new_style {
                if let (Some(start), Some(_), Some(prev)) = (style_start, run_start, current) {
                    push_style_spans(&mut spans, prev, start, col);
                }
                current = Some(style);
                style_start = Some(col);
            }

            if cell.is_visible() {
                run_start.get_or_insert(col);
            } else if let Some(start) = run_start.take() {
                let at_edge = start <= 1 || col > MAX_COLS;
                let expanded_start = if at_edge || self.cells[start].ch == ' ' {
                    start
                } else {
                    start - 1
                };
                let expanded_end = if at_edge || self.cells[col - 1].ch == ' ' {
                    col
                } else {
                    col + 1
                };
                spans.push(Span::new(
                    expanded_start,
                    expanded_end,
                    SpanKind::Background(background),
                ));
                if let (Some(start), Some(style)) = (style_start, current) {
                    push_style_spans(&mut spans, style, start, expanded_end);
                    style_start = Some(expanded_end);
                }
            }
        }

        StyledRow {
            text: self.text(),
            spans,
        }
    }
}

fn push_style_spans(spans: &mut Vec<Span>, style: StyleCode, start: usize, end: usize) {
    if start >= end {
        return;
    }
    if style.italics {
        spans.push(Span::new(start, end, SpanKind::Italic));
    }
    if style.underline {
        spans.push(Span::new(start, end, SpanKind::Underline));
    }
    if style.color != Cea608Color::White {
        spans.push(Span::new(start, end, SpanKind::Foreground(style.color)));
    }
}

/// Kind of styling a span applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpanKind {
    Italic,
    Underline,
    Foreground(Cea608Color),
    Background(Color),
}

/// Styling over the half-open column range `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

impl Span {
    pub fn new(start: usize, end: usize, kind: SpanKind) -> Self {
        Span { start, end, kind }
    }

    fn covers(&self, col: usize) -> bool {
        (self.start..self.end).contains(&col)
    }
}

/// A composed caption row.
///
/// `text` holds one character per column including both guard columns, so
/// span bounds are column indices into it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyledRow {
    pub text: String,
    pub spans: Vec<Span>,
}

impl StyledRow {
    /// Row text with transparent-space padding removed from both ends.
    pub fn trimmed_text(&self) -> String {
        self.text
            .trim_matches(TRANSPARENT_SPACE)
            .to_string()
    }

    /// Style in effect at a column.
    pub fn style_at(&self, col: usize) -> TextStyle {
        let mut style = TextStyle::default();
        for span in self.spans.iter().filter(|span| span.covers(col)) {
            match span.kind {
                SpanKind::Italic => style.italic = true,
                SpanKind::Underline => style.underline = true,
                SpanKind::Foreground(color) => style.color = Some(color.to_color()),
                SpanKind::Background(color) => style.background_color = Some(color),
            }
        }
        style
    }

    /// Flatten the row into styled segments over its trimmed text.
    pub fn to_styled_text(&self) -> Vec<StyledText> {
        let chars: Vec<char> = self.text.chars().collect();
        let Some(first) = chars.iter().position(|&c| c != TRANSPARENT_SPACE) else {
            return Vec::new();
        };
        let last = chars
            .iter()
            .rposition(|&c| c != TRANSPARENT_SPACE)
            .unwrap_or(first);

        let mut segments: Vec<StyledText> = Vec::new();
        for (col, &c) in chars.iter().enumerate().take(last + 1).skip(first) {
            let style = self.style_at(col);
            match segments.last_mut() {
                Some(segment) if segment.style == style => segment.text.push(c),
                _ => segments.push(StyledText::new(c.to_string(), style)),
            }
        }
        segments
    }
}

/// Cursor position, always within the displayable grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::clamped(MAX_ROWS as isize, 1)
    }
}

impl Cursor {
    /// Cursor at the nearest valid position to `(row, col)`.
    pub fn clamped(row: isize, col: isize) -> Self {
        Cursor {
            row: row.clamp(1, MAX_ROWS as isize) as usize,
            col: col.clamp(1, MAX_COLS as isize) as usize,
        }
    }

    pub fn moved_to(self, row: usize, col: usize) -> Self {
        Cursor::clamped(row as isize, col as isize)
    }

    pub fn shifted_by(self, cols: isize) -> Self {
        Cursor::clamped(self.row as isize, self.col as isize + cols)
    }

    pub fn with_col(self, col: usize) -> Self {
        Cursor::clamped(self.row as isize, col as isize)
    }
}

/// One of the three caption memories.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Memory {
    lines: [Line; MAX_ROWS + 2],
    cursor: Cursor,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Line at a row, guard rows included.
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Clear every line and park the cursor at the start of the bottom row.
    pub fn erase(&mut self) {
        self.lines = Default::default();
        self.cursor = Cursor::default();
    }

    /// Delete to end of row.
    pub fn delete_to_end_of_row(&mut self) {
        let Cursor { row, col } = self.cursor;
        let line = &mut self.lines[row];
        let has_text_before = line.cells[..col].iter().any(Cell::is_visible);
        if has_text_before {
            for c in col..LINE_WIDTH {
                line.set_char(c, TRANSPARENT_SPACE);
            }
        } else {
            *line = Line::default();
        }
    }

    pub fn tab(&mut self, columns: u8) {
        self.cursor = self.cursor.shifted_by(columns as isize);
    }

    pub fn backspace(&mut self) {
        self.cursor = self.cursor.shifted_by(-1);
        let Cursor { row, col } = self.cursor;
        let line = &mut self.lines[row];
        line.set_char(col, TRANSPARENT_SPACE);
        // a character at column 32 is overwritten in place, so erase it too
        if col == MAX_COLS - 1 {
            line.set_char(MAX_COLS, TRANSPARENT_SPACE);
        }
    }

    /// Move to the start of the next row without scrolling.
    pub fn carriage_return(&mut self) {
        self.cursor = self.cursor.moved_to(self.cursor.row + 1, 1);
    }

    pub fn write_char(&mut self, ch: char) {
        let Cursor { row, col } = self.cursor;
        self.lines[row].set_char(col, ch);
        self.cursor = self.cursor.shifted_by(1);
    }

    pub fn write_mid_row(&mut self, style: StyleCode) {
        let Cursor { row, col } = self.cursor;
        self.lines[row].set_mid_row(col, style);
        self.cursor = self.cursor.shifted_by(1);
    }

    pub fn write_pac(&mut self, pac: Pac) {
        self.cursor = self
            .cursor
            .moved_to(pac.row as usize, pac.column() as usize);
        let Cursor { row, col } = self.cursor;
        self.lines[row].set_pac(col, pac);
    }

    /// Move the roll-up window so that it ends on `base_row`.
    ///
    /// Rows outside the moved window are cleared. The cursor is unchanged.
    pub fn move_baseline_to(&mut self, base_row: usize, window: usize) {
        let base_row = base_row.clamp(1, MAX_ROWS);
        let row = self.cursor.row;
        if row == base_row {
            return;
        }
        let size = window.min(base_row).min(row);

        let mut moved = [Line::default(); 4];
        for (i, slot) in moved.iter_mut().enumerate().take(size) {
            *slot = self.lines[row - i];
        }
        self.lines = Default::default();
        for (i, line) in moved.iter().enumerate().take(size) {
            self.lines[base_row - i] = *line;
        }
    }

    /// Scroll the roll-up window ending at the cursor row up by one row.
    pub fn roll_up(&mut self, window: usize) {
        let base = self.cursor.row;
        let top = (base + 1).saturating_sub(window).max(1);
        for line in &mut self.lines[..top] {
            *line = Line::default();
        }
        for r in top..base {
            self.lines[r] = self.lines[r + 1];
        }
        for line in &mut self.lines[base..] {
            *line = Line::default();
        }
        self.cursor = self.cursor.with_col(1);
    }

    /// Compose rows 1 to 15. Blank rows are `None`.
    pub fn styled_rows(&self, background: Color) -> DisplayRows {
        std::array::from_fn(|i| {
            let line = &self.lines[i + 1];
            (!line.is_blank()).then(|| line.styled_row(background))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pac(row: u8, indent: Option<u8>) -> Pac {
        Pac {
            style: StyleCode::default(),
            row,
            indent,
        }
    }

    fn write_text(memory: &mut Memory, text: &str) {
        for ch in text.chars() {
            memory.write_char(ch);
        }
    }

    fn row_text(memory: &Memory, row: usize) -> String {
        memory.styled_rows(Color::BLACK)[row - 1]
            .as_ref()
            .map(StyledRow::trimmed_text)
            .unwrap_or_default()
    }

    #[test]
    fn test_cursor_clamps() {
        assert_eq!(Cursor::clamped(0, 0), Cursor { row: 1, col: 1 });
        assert_eq!(Cursor::clamped(40, 40), Cursor { row: 15, col: 32 });
        let cursor = Cursor::clamped(3, 31);
        assert_eq!(cursor.shifted_by(5).col, 32);
        assert_eq!(cursor.shifted_by(-40).col, 1);
        assert_eq!(Cursor::default(), Cursor { row: 15, col: 1 });
    }

    #[test]
    fn test_write_and_compose() {
        let mut memory = Memory::new();
        memory.write_pac(pac(2, Some(4)));
        write_text(&mut memory, "Hi");

        assert_eq!(memory.cursor(), Cursor { row: 2, col: 7 });
        assert_eq!(row_text(&memory, 2), "Hi");
        assert!(memory.styled_rows(Color::BLACK)[0].is_none());
    }

    #[test]
    fn test_write_past_last_column_overwrites() {
        let mut memory = Memory::new();
        memory.write_pac(pac(1, Some(28)));
        write_text(&mut memory, "ABCDEF");
        // columns 29..=32 hold A, B, C then F overwrote D and E at column 32
        assert_eq!(row_text(&memory, 1), "ABCF");
        assert_eq!(memory.cursor().col, 32);
    }

    #[test]
    fn test_backspace() {
        let mut memory = Memory::new();
        memory.write_pac(pac(1, None));
        write_text(&mut memory, "ABC");
        memory.backspace();
        assert_eq!(row_text(&memory, 1), "AB");
        assert_eq!(memory.cursor().col, 3);
    }

    #[test]
    fn test_backspace_at_last_column_erases_both() {
        let mut memory = Memory::new();
        memory.write_pac(pac(1, Some(28)));
        write_text(&mut memory, "WXYZ");
        assert_eq!(memory.cursor().col, 32);
        memory.backspace();
        assert_eq!(row_text(&memory, 1), "WX");
        assert_eq!(memory.cursor().col, 31);
    }

    #[test]
    fn test_delete_to_end_of_row() {
        let mut memory = Memory::new();
        memory.write_pac(pac(4, None));
        write_text(&mut memory, "HELLO");
        memory.cursor = Cursor::clamped(4, 3);
        memory.delete_to_end_of_row();
        assert_eq!(row_text(&memory, 4), "HE");

        // nothing visible before the cursor clears the whole row
        memory.cursor = Cursor::clamped(4, 1);
        memory.delete_to_end_of_row();
        assert!(memory.line(4).unwrap().is_blank());
    }

    #[test]
    fn test_mid_row_is_space() {
        let mut memory = Memory::new();
        memory.write_pac(pac(1, None));
        write_text(&mut memory, "A");
        memory.write_mid_row(StyleCode::from_byte(0x2E));
        write_text(&mut memory, "B");
        assert_eq!(row_text(&memory, 1), "A B");
    }

    #[test]
    fn test_char_write_clears_mid_row() {
        let mut memory = Memory::new();
        memory.write_pac(pac(1, None));
        memory.write_mid_row(StyleCode::from_byte(0x2E));
        memory.cursor = Cursor::clamped(1, 1);
        write_text(&mut memory, "X");
        assert_eq!(memory.line(1).unwrap().cell(1).unwrap().mid_row, None);
    }

    #[test]
    fn test_roll_up() {
        let mut memory = Memory::new();
        for (i, text) in ["one", "two", "three"].iter().enumerate() {
            if i > 0 {
                memory.roll_up(2);
            }
            write_text(&mut memory, text);
        }
        assert_eq!(row_text(&memory, 14), "two");
        assert_eq!(row_text(&memory, 15), "three");
        assert!(memory.line(13).unwrap().is_blank());
        assert_eq!(memory.cursor().col, 1 + "three".len());
    }

    #[test]
    fn test_move_baseline() {
        let mut memory = Memory::new();
        write_text(&mut memory, "top");
        memory.roll_up(3);
        write_text(&mut memory, "bottom");

        memory.move_baseline_to(10, 3);
        assert_eq!(row_text(&memory, 9), "top");
        assert_eq!(row_text(&memory, 10), "bottom");
        assert!(memory.line(15).unwrap().is_blank());
        // cursor row is left for the PAC to move
        assert_eq!(memory.cursor().row, 15);
    }

    #[test]
    fn test_move_baseline_limited_by_target_row() {
        let mut memory = Memory::new();
        write_text(&mut memory, "a");
        memory.roll_up(4);
        write_text(&mut memory, "b");
        memory.roll_up(4);
        write_text(&mut memory, "c");

        memory.move_baseline_to(2, 4);
        assert_eq!(row_text(&memory, 1), "b");
        assert_eq!(row_text(&memory, 2), "c");
        assert!(memory.line(3).unwrap().is_blank());
    }

    #[test]
    fn test_background_span_single_char() {
        let mut line = Line::default();
        line.set_char(5, 'A');
        let row = line.styled_row(Color::BLACK);
        assert_eq!(
            row.spans,
            vec![Span::new(4, 7, SpanKind::Background(Color::BLACK))]
        );
    }

    #[test]
    fn test_background_span_space_edges() {
        let mut line = Line::default();
        line.set_char(5, ' ');
        line.set_char(6, 'A');
        line.set_char(7, ' ');
        let row = line.styled_row(Color::BLUE);
        assert_eq!(
            row.spans,
            vec![Span::new(5, 8, SpanKind::Background(Color::BLUE))]
        );
    }

    #[test]
    fn test_background_span_at_row_edges() {
        let mut line = Line::default();
        line.set_char(1, 'A');
        let row = line.styled_row(Color::BLACK);
        assert_eq!(
            row.spans,
            vec![Span::new(1, 2, SpanKind::Background(Color::BLACK))]
        );

        let mut line = Line::default();
        line.set_char(MAX_COLS, 'Z');
        let row = line.styled_row(Color::BLACK);
        assert_eq!(
            row.spans,
            vec![Span::new(32, 33, SpanKind::Background(Color::BLACK))]
        );

        // a run reaching either edge keeps its own width on both sides
        let mut line = Line::default();
        line.set_char(1, 'O');
        line.set_char(2, 'K');
        let row = line.styled_row(Color::BLACK);
        assert_eq!(row.spans[0], Span::new(1, 3, SpanKind::Background(Color::BLACK)));
    }

    #[test]
    fn test_style_spans() {
        let mut memory = Memory::new();
        memory.write_pac(Pac::from_bytes(0x11, 0x4E).unwrap());
        write_text(&mut memory, "AB");
        memory.write_mid_row(StyleCode::from_byte(0x29));
        write_text(&mut memory, "CD");

        let rows = memory.styled_rows(Color::BLACK);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.trimmed_text(), "AB CD");
        assert!(row.spans.contains(&Span::new(1, 3, SpanKind::Italic)));
        assert!(row.spans.contains(&Span::new(3, 6, SpanKind::Underline)));
        assert!(row
            .spans
            .contains(&Span::new(3, 6, SpanKind::Foreground(Cea608Color::Red))));
        assert!(!row.spans.iter().any(|s| s.kind == SpanKind::Italic && s.end > 3));
    }

    #[test]
    fn test_to_styled_text() {
        let mut memory = Memory::new();
        memory.write_pac(pac(1, None));
        write_text(&mut memory, "A");
        memory.write_mid_row(StyleCode::from_byte(0x2E));
        write_text(&mut memory, "B");

        let rows = memory.styled_rows(Color::BLACK);
        let segments = rows[0].as_ref().unwrap().to_styled_text();
        let text: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, "A B");
        assert_eq!(segments.len(), 2);
        assert!(!segments[0].style.italic);
        assert!(segments[1].style.italic);
        assert_eq!(segments[1].text, " B");
        assert!(segments
            .iter()
            .all(|s| s.style.background_color == Some(Color::BLACK)));
    }
}
