//! Two independent passes over a statement: one over detected table grids,
//! one over the raw text lines. They overlap on purpose; `normalize` removes
//! the duplicates.

use tally_core::{Money, Transaction, TransactionType};

use crate::classify::{classify, ContinuationShape, LineClass, SectionState};
use crate::date::DateToken;
use crate::document::{StatementDocument, TableGrid};
use crate::patterns::{collapse_whitespace, is_amount_token, is_date_token};
use crate::report::ParseIssue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Table,
    Text,
    /// Rebuilt from an already normalized transaction.
    Normalized,
}

/// One detected entry, date and amount still as printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransaction {
    pub date: String,
    pub kind: TransactionType,
    pub description: String,
    pub amount: String,
    pub raw_line: String,
    pub origin: Origin,
}

impl RawTransaction {
    fn append_continuation(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.description = collapse_whitespace(&format!("{} {}", self.description, text));
        self.raw_line.push_str(" | ");
        self.raw_line.push_str(text);
    }
}

impl From<&Transaction> for RawTransaction {
    fn from(tx: &Transaction) -> Self {
        RawTransaction {
            date: tx.date.format("%Y-%m-%d").to_string(),
            kind: tx.kind,
            description: tx.description.clone(),
            amount: tx.magnitude().to_string(),
            raw_line: tx.raw_line.clone(),
            origin: Origin::Normalized,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Table-pass entries first, then text-pass entries.
    pub entries: Vec<RawTransaction>,
    pub issues: Vec<ParseIssue>,
}

impl Extraction {
    fn record(&mut self, issue: ParseIssue) {
        tracing::warn!("{issue}");
        self.issues.push(issue);
    }

    /// Validates the printed tokens and pushes the entry, returning its index.
    fn push_entry(
        &mut self,
        date: &str,
        description: &str,
        amount: &str,
        kind: TransactionType,
        raw_line: &str,
        origin: Origin,
    ) -> Option<usize> {
        if DateToken::parse(date).is_none() {
            self.record(ParseIssue::unparseable(raw_line, format!("invalid date '{date}'")));
            return None;
        }
        if let Err(e) = Money::parse_statement_amount(amount) {
            self.record(ParseIssue::unparseable(raw_line, e.to_string()));
            return None;
        }

        self.entries.push(RawTransaction {
            date: date.trim().to_string(),
            kind,
            description: collapse_whitespace(description),
            amount: amount.trim().to_string(),
            raw_line: raw_line.trim().to_string(),
            origin,
        });
        Some(self.entries.len() - 1)
    }

    fn continue_entry(&mut self, current: Option<usize>, text: &str, shape: ContinuationShape) {
        if shape == ContinuationShape::LooksLikeEntry {
            self.record(ParseIssue::AmbiguousContinuation {
                line: text.trim().to_string(),
            });
        }
        match current.and_then(|i| self.entries.get_mut(i)) {
            Some(entry) => entry.append_continuation(text),
            None => tracing::debug!("Dropping continuation with no owning entry: {}", text.trim()),
        }
    }
}

pub fn extract<D: StatementDocument>(doc: &D) -> Extraction {
    let mut out = Extraction::default();
    table_pass(doc.tables(), &mut out);
    let from_tables = out.entries.len();
    text_pass(doc.text_lines(), &mut out);
    tracing::debug!(
        table = from_tables,
        text = out.entries.len() - from_tables,
        "Extraction passes finished"
    );
    out
}

// ── Text pass ─────────────────────────────────────────────────────────────────

fn text_pass(lines: &[String], out: &mut Extraction) {
    let mut section = SectionState::Outside;
    let mut current: Option<usize> = None;

    for line in lines {
        match classify(line, section) {
            LineClass::SectionHeader(kind) => {
                section = SectionState::In(kind);
                current = None;
            }
            LineClass::SectionEnd => {
                section = SectionState::Outside;
                current = None;
            }
            LineClass::Noise => {}
            LineClass::NewEntry(entry) => {
                let Some(kind) = section.kind() else { continue };
                current = out.push_entry(
                    &entry.date,
                    &entry.description,
                    &entry.amount,
                    kind,
                    line,
                    Origin::Text,
                );
            }
            LineClass::Continuation(shape) => out.continue_entry(current, line, shape),
        }
    }
}

// ── Table pass ────────────────────────────────────────────────────────────────

/// Positional reading of a row: date in the first cell, amount in the last
/// (second-to-last when a running balance follows), description in between.
fn entry_cells<'a>(cells: &[&'a str]) -> Option<(&'a str, String, Option<&'a str>)> {
    let (&first, rest) = cells.split_first()?;
    if !is_date_token(first) {
        return None;
    }

    let n = rest.len();
    let amount_idx = match n {
        0 => None,
        _ if n >= 2 && is_amount_token(rest[n - 1]) && is_amount_token(rest[n - 2]) => Some(n - 2),
        _ if is_amount_token(rest[n - 1]) => Some(n - 1),
        _ => None,
    };

    let desc_end = amount_idx.unwrap_or(n);
    let description = rest[..desc_end].join(" ");
    Some((first, description, amount_idx.map(|i| rest[i])))
}

fn table_pass<T: TableGrid>(tables: &[T], out: &mut Extraction) {
    // Sections run across tables and pages, so the state outlives each grid.
    let mut section = SectionState::Outside;

    for table in tables {
        let mut current: Option<usize> = None;

        for row in 0..table.row_count() {
            let cells: Vec<&str> = (0..table.column_count(row))
                .filter_map(|col| table.cell(row, col))
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .collect();
            if cells.is_empty() {
                continue;
            }
            let row_text = cells.join(" ");

            let (line_entry, shape) = match classify(&row_text, section) {
                LineClass::SectionHeader(kind) => {
                    section = SectionState::In(kind);
                    current = None;
                    continue;
                }
                LineClass::SectionEnd => {
                    section = SectionState::Outside;
                    current = None;
                    continue;
                }
                LineClass::Noise => continue,
                LineClass::NewEntry(entry) => (Some(entry), ContinuationShape::Plain),
                LineClass::Continuation(shape) => (None, shape),
            };
            let Some(kind) = section.kind() else { continue };

            match (entry_cells(&cells), line_entry) {
                (Some((date, description, Some(amount))), _) => {
                    current =
                        out.push_entry(date, &description, amount, kind, &row_text, Origin::Table);
                }
                // Columns merged or never split; the joined row still reads as
                // an entry line.
                (_, Some(entry)) => {
                    current = out.push_entry(
                        &entry.date,
                        &entry.description,
                        &entry.amount,
                        kind,
                        &row_text,
                        Origin::Table,
                    );
                }
                (Some((_, _, None)), None) => {
                    out.record(ParseIssue::unparseable(
                        &row_text,
                        format!("table row on page {} has no amount", table.page_index() + 1),
                    ));
                    current = None;
                }
                (None, None) => out.continue_entry(current, &row_text, shape),
            }
        }
    }
}
