use lopdf::Document;
use std::path::Path;
use tally_import::{CellGrid, TextDocument};
use thiserror::Error;

use crate::tables::detect_tables;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("No extractable text (scanned statement?)")]
    NoText,
}

/// Text of a statement PDF, page by page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfStatement {
    pages: Vec<Vec<String>>,
}

fn page_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

impl PdfStatement {
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;
        Self::load_mem(&bytes)
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self, PdfError> {
        let document = Document::load_mem(bytes)?;

        let mut pages = Vec::new();
        // BTreeMap keys: page numbers in order.
        for page_num in document.get_pages().into_keys() {
            match document.extract_text(&[page_num]) {
                Ok(text) => pages.push(page_lines(&text)),
                Err(e) => {
                    tracing::warn!("No text from page {page_num}: {e}");
                    pages.push(Vec::new());
                }
            }
        }

        if pages.iter().all(Vec::is_empty) {
            return Err(PdfError::NoText);
        }
        Ok(Self { pages })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&[String]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    /// Flatten into the extractor's view: all lines in order, plus the tables
    /// detected on each page.
    pub fn into_document(self) -> TextDocument {
        let tables: Vec<CellGrid> = self
            .pages
            .iter()
            .enumerate()
            .flat_map(|(i, lines)| detect_tables(i, lines))
            .collect();
        let lines = self.pages.into_iter().flatten().collect();
        TextDocument::new(lines, tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};
    use tally_import::StatementDocument;

    /// One Courier text object per line, one page per slice.
    fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
                operations.push(Operation::new("Td", vec![50.into(), (780 - 14 * i as i64).into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn reads_text_per_page() {
        let bytes = build_pdf(&[
            &["Deposits and other credits", "01/05 ACH DEPOSIT XYZ 100.00"],
            &["Withdrawals and other debits", "01/10 RENT JANUARY 900.00"],
        ]);
        let statement = PdfStatement::load_mem(&bytes).unwrap();
        assert_eq!(statement.page_count(), 2);
        assert!(statement.page(0).unwrap().iter().any(|l| l.contains("ACH DEPOSIT XYZ")));
        assert!(statement.page(1).unwrap().iter().any(|l| l.contains("RENT JANUARY")));
        assert!(statement.page(2).is_none());

        let doc = statement.into_document();
        let joined = doc.text_lines().join("\n");
        let deposit = joined.find("ACH DEPOSIT").unwrap();
        let rent = joined.find("RENT JANUARY").unwrap();
        assert!(deposit < rent);
    }

    #[test]
    fn open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jan.pdf");
        std::fs::write(&path, build_pdf(&[&["Deposits and other credits"]])).unwrap();
        assert_eq!(PdfStatement::open(&path).unwrap().page_count(), 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfStatement::open(&dir.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::Io(_)));
    }

    #[test]
    fn garbage_is_pdf_error() {
        let err = PdfStatement::load_mem(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, PdfError::Pdf(_)));
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(page_lines("A  \n\n   \nB"), vec!["A".to_string(), "B".to_string()]);
    }
}
