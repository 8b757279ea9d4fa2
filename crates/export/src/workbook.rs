use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tally_core::Transaction;
use tally_import::Aggregate;
use thiserror::Error;

use crate::sheet::SheetNames;

pub const STATEMENT_SHEET: &str = "Transactions";
pub const COMBINED_SHEET: &str = "combine_data";
pub const COMBINED_FILE: &str = "combine_all_xls.xlsx";

const MAX_COLUMN_WIDTH: usize = 50;
const HEADER_FILL: u32 = 0x366092;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workbook error: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub statement_files: Vec<PathBuf>,
    pub combined_file: Option<PathBuf>,
    /// Statements with no transactions; no file or tab is written for them.
    pub skipped_empty: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Date,
    Type,
    Description,
    Amount,
    Source,
    RawLine,
}

const STATEMENT_COLUMNS: [Column; 5] = [
    Column::Date,
    Column::Type,
    Column::Description,
    Column::Amount,
    Column::RawLine,
];

const COMBINED_COLUMNS: [Column; 6] = [
    Column::Date,
    Column::Type,
    Column::Description,
    Column::Amount,
    Column::Source,
    Column::RawLine,
];

impl Column {
    fn header(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Type => "Type",
            Column::Description => "Description",
            Column::Amount => "Amount",
            Column::Source => "Source",
            Column::RawLine => "Raw_Line",
        }
    }

    fn text(self, tx: &Transaction) -> String {
        match self {
            Column::Date => tx.date.format("%Y-%m-%d").to_string(),
            Column::Type => tx.kind.to_string(),
            Column::Description => tx.description.clone(),
            Column::Amount => tx.amount.to_string(),
            Column::Source => tx.source.clone().unwrap_or_default(),
            Column::RawLine => tx.raw_line.clone(),
        }
    }
}

struct Formats {
    header: Format,
    amount: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center),
            amount: Format::new().set_num_format("$#,##0.00;[Red]-$#,##0.00"),
        }
    }
}

fn fill_sheet(
    sheet: &mut Worksheet,
    columns: &[Column],
    transactions: &[Transaction],
    formats: &Formats,
) -> Result<(), XlsxError> {
    for (col, column) in columns.iter().copied().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, column.header(), &formats.header)?;

        let mut width = column.header().chars().count();
        for (i, tx) in transactions.iter().enumerate() {
            let row = i as u32 + 1;
            let text = column.text(tx);
            width = width.max(text.chars().count());
            // Dates stay text so spreadsheet locales cannot reinterpret them.
            if column == Column::Amount {
                sheet.write_number_with_format(row, col, tx.amount.to_f64(), &formats.amount)?;
            } else {
                sheet.write_string(row, col, &text)?;
            }
        }
        sheet.set_column_width(col, (width + 2).min(MAX_COLUMN_WIDTH) as f64)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// `{source}_transactions.xlsx`, with path separators in the source replaced.
pub fn statement_file_name(source: &str) -> String {
    let stem = source.replace(['/', '\\'], "_");
    format!("{stem}_transactions.xlsx")
}

/// Write `{source}_transactions.xlsx` into `dir`, replacing any existing file.
pub fn write_statement(
    dir: &Path,
    source: &str,
    transactions: &[Transaction],
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(statement_file_name(source));

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(STATEMENT_SHEET)?;
    fill_sheet(sheet, &STATEMENT_COLUMNS, transactions, &Formats::new())?;
    workbook.save(&path)?;

    tracing::info!(
        transactions = transactions.len(),
        "Wrote {}",
        path.display()
    );
    Ok(path)
}

/// Write the combined workbook: every record on `combine_data`, then one
/// sheet per non-empty statement in processing order.
pub fn write_combined(dir: &Path, aggregate: &Aggregate) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(COMBINED_FILE);
    let formats = Formats::new();
    let mut names = SheetNames::new();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(names.unique(COMBINED_SHEET))?;
    fill_sheet(sheet, &COMBINED_COLUMNS, &aggregate.combined, &formats)?;

    for statement in aggregate.statements.iter().filter(|s| !s.transactions.is_empty()) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(names.unique(&statement.source))?;
        fill_sheet(sheet, &STATEMENT_COLUMNS, &statement.transactions, &formats)?;
    }
    workbook.save(&path)?;

    tracing::info!(
        transactions = aggregate.combined.len(),
        statements = aggregate.statements.len(),
        "Wrote {}",
        path.display()
    );
    Ok(path)
}

/// Per-statement files plus the combined workbook.
pub fn export(aggregate: &Aggregate, dir: &Path) -> Result<ExportSummary, ExportError> {
    let mut summary = ExportSummary::default();

    for statement in &aggregate.statements {
        if statement.transactions.is_empty() {
            tracing::info!("No transactions in {}, nothing written", statement.source);
            summary.skipped_empty.push(statement.source.clone());
            continue;
        }
        let path = write_statement(dir, &statement.source, &statement.transactions)?;
        summary.statement_files.push(path);
    }

    if !aggregate.combined.is_empty() {
        summary.combined_file = Some(write_combined(dir, aggregate)?);
    }
    Ok(summary)
}
