//! In-memory text grid.

use tracing::error;

/// Rows of fixed-width text cells.
///
/// Every cell always holds exactly `cell_width` ASCII characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    rows: usize,
    columns: usize,
    cell_width: usize,
    /// Adjacent cells a block covers.
    block_span: usize,
    cells: Vec<String>,
}

impl DisplayBuffer {
    pub fn new(rows: usize, columns: usize, cell_width: usize) -> Self {
        Self {
            rows,
            columns,
            cell_width,
            block_span: 2,
            cells: vec![" ".repeat(cell_width); rows * columns],
        }
    }

    pub fn with_block_span(mut self, span: usize) -> Self {
        self.block_span = span.max(1);
        self
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_width(&self) -> usize {
        self.cell_width
    }

    pub fn block_span(&self) -> usize {
        self.block_span
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        Some(&self.cells[row * self.columns + column])
    }

    /// All cells of a row concatenated.
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.rows {
            return String::new();
        }
        self.cells[row * self.columns..(row + 1) * self.columns].concat()
    }

    /// Out of range positions are logged and ignored.
    pub fn set_cell(&mut self, row: usize, column: usize, text: &str) {
        if row >= self.rows || column >= self.columns {
            error!(
                "Display cell ({}, {}) out of range ({}x{})",
                row, column, self.rows, self.columns
            );
            return;
        }
        self.cells[row * self.columns + column] = fit(text, self.cell_width);
    }

    /// Write `text` across the cells of block `block`, padded or cut to the block width.
    pub fn set_block(&mut self, row: usize, block: usize, text: &str) {
        let first = block * self.block_span;
        if row >= self.rows || first >= self.columns {
            error!("Display block ({}, {}) out of range", row, block);
            return;
        }
        let span = self.block_span.min(self.columns - first);
        let text = fit(text, span * self.cell_width);
        for offset in 0..span {
            let start = offset * self.cell_width;
            self.cells[row * self.columns + first + offset] =
                text[start..start + self.cell_width].to_string();
        }
    }

    pub fn clear_row(&mut self, row: usize) {
        if row >= self.rows {
            error!("Display row {} out of range", row);
            return;
        }
        let blank = " ".repeat(self.cell_width);
        for cell in &mut self.cells[row * self.columns..(row + 1) * self.columns] {
            cell.clone_from(&blank);
        }
    }

    pub fn clear(&mut self) {
        for row in 0..self.rows {
            self.clear_row(row);
        }
    }
}

/// Sanitize to printable ASCII, then pad or truncate to `width` characters.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let mut out: String = text
        .chars()
        .map(|c| match c {
            ' '..='~' => c,
            '\t' | '\n' | '\r' => ' ',
            _ => '?',
        })
        .take(width)
        .collect();
    while out.len() < width {
        out.push(' ');
    }
    out
}
