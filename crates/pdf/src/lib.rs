pub mod reader;
pub mod tables;

pub use reader::{PdfError, PdfStatement};
pub use tables::{detect_tables, split_cells};
