//! Stream table detection over extracted page text.
//!
//! lopdf gives no ruling lines or glyph positions worth clustering for bank
//! statements, so columns are recovered from runs of spacing instead. A table
//! opens at a section header and runs while lines keep a columnar shape.

use regex::Regex;
use std::sync::OnceLock;
use tally_import::classify::{classify, parse_entry_line, section_header, SectionState};
use tally_import::{CellGrid, LineClass};

fn re_column_gap() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\t+|\s{2,}").expect("invalid regex"))
}

/// Split a line into cells on tabs or runs of two or more spaces.
pub fn split_cells(line: &str) -> Vec<String> {
    re_column_gap()
        .split(line.trim())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

struct OpenTable {
    section: SectionState,
    grid: CellGrid,
    data_rows: usize,
}

fn close(open: &mut Option<OpenTable>, tables: &mut Vec<CellGrid>) {
    if let Some(table) = open.take() {
        // A header with nothing under it is not a table.
        if table.data_rows > 0 {
            tables.push(table.grid);
        }
    }
}

/// Tables on one page. `page` is zero-based.
pub fn detect_tables(page: usize, lines: &[String]) -> Vec<CellGrid> {
    let mut tables = Vec::new();
    let mut open: Option<OpenTable> = None;

    for line in lines {
        if let Some(kind) = section_header(line) {
            close(&mut open, &mut tables);
            let mut grid = CellGrid::new(page);
            grid.push_row(vec![Some(line.trim().to_string())]);
            open = Some(OpenTable {
                section: SectionState::In(kind),
                grid,
                data_rows: 0,
            });
            continue;
        }

        let Some(table) = open.as_mut() else { continue };
        if classify(line, table.section) == LineClass::SectionEnd {
            close(&mut open, &mut tables);
            continue;
        }

        let mut cells = split_cells(line);
        if cells.len() == 1 {
            // Single-spaced entries carry no gaps to split on.
            if let Some(entry) = parse_entry_line(line) {
                cells = vec![entry.date, entry.description, entry.amount];
                cells.extend(entry.balance);
            }
        }
        let wraps_previous = cells.len() == 1 && table.data_rows > 0;
        if cells.len() >= 2 || wraps_previous {
            table.grid.push_row(cells.into_iter().map(Some).collect());
            table.data_rows += 1;
        } else {
            close(&mut open, &mut tables);
        }
    }
    close(&mut open, &mut tables);

    if !tables.is_empty() {
        tracing::debug!(page = page + 1, tables = tables.len(), "Detected tables");
    }
    tables
}
