pub mod sheet;
pub mod workbook;

pub use sheet::{sanitize_sheet_name, SheetNames};
pub use workbook::{
    export, statement_file_name, write_combined, write_statement, ExportError, ExportSummary,
    COMBINED_FILE, COMBINED_SHEET, STATEMENT_SHEET,
};
