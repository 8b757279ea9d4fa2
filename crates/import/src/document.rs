//! The narrow view of a statement that extraction works against.
//!
//! PDF libraries hand back text and table shapes of their own; everything past
//! this module only sees lines in document order and cell grids in page order.

/// A detected table: rows of optional cells on one page.
pub trait TableGrid {
    fn page_index(&self) -> usize;
    fn row_count(&self) -> usize;
    fn column_count(&self, row: usize) -> usize;
    fn cell(&self, row: usize, col: usize) -> Option<&str>;
}

pub trait StatementDocument {
    type Table: TableGrid;

    /// Text lines across all pages, in document order.
    fn text_lines(&self) -> &[String];

    /// Tables in page order.
    fn tables(&self) -> &[Self::Table];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellGrid {
    page: usize,
    rows: Vec<Vec<Option<String>>>,
}

impl CellGrid {
    pub fn new(page: usize) -> Self {
        Self { page, rows: Vec::new() }
    }

    /// Convenience for literal grids; empty strings become empty cells.
    pub fn from_rows(page: usize, rows: &[&[&str]]) -> Self {
        let mut grid = Self::new(page);
        for row in rows {
            grid.push_row(
                row.iter()
                    .map(|c| (!c.is_empty()).then(|| c.to_string()))
                    .collect(),
            );
        }
        grid
    }

    pub fn push_row(&mut self, cells: Vec<Option<String>>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl TableGrid for CellGrid {
    fn page_index(&self) -> usize {
        self.page
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, Vec::len)
    }

    fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// In-memory statement: what the PDF reader produces and what tests build by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    lines: Vec<String>,
    tables: Vec<CellGrid>,
}

impl TextDocument {
    pub fn new(lines: Vec<String>, tables: Vec<CellGrid>) -> Self {
        Self { lines, tables }
    }

    /// Text-only document, one line per input line.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_string).collect(), Vec::new())
    }

    pub fn with_tables(mut self, tables: Vec<CellGrid>) -> Self {
        self.tables = tables;
        self
    }
}

impl StatementDocument for TextDocument {
    type Table = CellGrid;

    fn text_lines(&self) -> &[String] {
        &self.lines
    }

    fn tables(&self) -> &[CellGrid] {
        &self.tables
    }
}
