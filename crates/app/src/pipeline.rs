use serde::Serialize;
use std::path::{Path, PathBuf};
use tally_core::Money;
use tally_export::{write_combined, write_statement, ExportError};
use tally_import::{aggregate, parse_statement, StatementReport, StatementTransactions, TextDocument};
use tally_pdf::{PdfError, PdfStatement};
use thiserror::Error;

use crate::config::{Config, ConfigError};

/// Per-statement failure. Logged and reported; the run moves on.
#[derive(Debug, Error)]
pub enum StatementError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: PdfError,
    },
    #[error("Could not write workbook for {name}: {source}")]
    Write {
        name: String,
        #[source]
        source: ExportError,
    },
}

/// Failures that stop a run before any statement is read.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Turns a statement file into the document the extractor reads.
pub trait StatementLoader {
    fn load(&self, path: &Path) -> Result<TextDocument, PdfError>;
}

/// Reads statement PDFs with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLoader;

impl StatementLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<TextDocument, PdfError> {
        Ok(PdfStatement::open(path)?.into_document())
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatementOutcome {
    Written { report: StatementReport, file: PathBuf },
    /// Parsed, but nothing survived; no file written.
    Empty { report: StatementReport },
    Failed { path: PathBuf, error: String },
}

impl StatementOutcome {
    pub fn report(&self) -> Option<&StatementReport> {
        match self {
            StatementOutcome::Written { report, .. } | StatementOutcome::Empty { report } => {
                Some(report)
            }
            StatementOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    pub outcomes: Vec<StatementOutcome>,
    pub combined_file: Option<PathBuf>,
    /// Set when `combine_all_xls.xlsx` could not be written.
    pub combined_error: Option<String>,
    pub deposit_total: Money,
    pub withdrawal_total: Money,
    pub net_total: Money,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn successful(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StatementOutcome::Written { .. }))
            .count()
    }

    /// Statements that produced no workbook: read failures and empty ones.
    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    /// True only when every statement hit an I/O failure.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty()
            && self
                .outcomes
                .iter()
                .all(|o| matches!(o, StatementOutcome::Failed { .. }))
    }
}

/// Statement name used for output files and sheet tabs: the file stem.
pub fn source_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub struct Pipeline<L: StatementLoader> {
    loader: L,
    config: Config,
}

impl<L: StatementLoader> Pipeline<L> {
    pub fn new(loader: L, config: Config) -> Self {
        Self { loader, config }
    }

    /// Parse one statement and write its workbook. The document is dropped
    /// before returning.
    fn process(
        &self,
        path: &Path,
    ) -> Result<(StatementTransactions, StatementOutcome), StatementError> {
        let name = source_name(path);
        let document = self.loader.load(path).map_err(|source| StatementError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = parse_statement(&name, &document, &self.config.normalize_options());
        let (statement, report) = parsed.into_statement_transactions();

        for (kind, count) in report.issue_counts() {
            tracing::warn!("{name}: {count} × {kind}");
        }

        if statement.transactions.is_empty() {
            tracing::warn!("No transactions were extracted from {name}");
            return Ok((statement, StatementOutcome::Empty { report }));
        }

        let file = write_statement(&self.config.output_dir, &name, &statement.transactions)
            .map_err(|source| StatementError::Write {
                name: name.clone(),
                source,
            })?;
        tracing::info!(
            kept = report.kept,
            duplicates = report.duplicates,
            skipped = report.skipped(),
            "Extracted {} transactions from {name}",
            report.kept
        );
        Ok((statement, StatementOutcome::Written { report, file }))
    }

    pub fn run(&self) -> Result<RunSummary, RunError> {
        let inputs = self.config.resolve_inputs()?;
        tracing::info!("Found {} statement file(s) to process", inputs.len());

        let mut summary = RunSummary {
            output_dir: self.config.output_dir.clone(),
            ..RunSummary::default()
        };
        let mut statements = Vec::new();

        for (i, path) in inputs.iter().enumerate() {
            tracing::info!("[{}/{}] Processing: {}", i + 1, inputs.len(), path.display());
            match self.process(path) {
                Ok((statement, outcome)) => {
                    statements.push(statement);
                    summary.outcomes.push(outcome);
                }
                Err(e) => {
                    tracing::error!("{e}");
                    summary.outcomes.push(StatementOutcome::Failed {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let aggregate = aggregate(statements);
        summary.deposit_total = aggregate.deposit_total();
        summary.withdrawal_total = aggregate.withdrawal_total();
        summary.net_total = aggregate.net_total();

        if self.config.combine && !aggregate.combined.is_empty() {
            match write_combined(&self.config.output_dir, &aggregate) {
                Ok(file) => summary.combined_file = Some(file),
                Err(e) => {
                    tracing::error!("Could not write combined workbook: {e}");
                    summary.combined_error = Some(e.to_string());
                }
            }
        }

        tracing::info!(
            successful = summary.successful(),
            failed = summary.failed(),
            total = summary.total(),
            "Processing complete"
        );
        Ok(summary)
    }
}

/// Run over real PDF files.
pub fn run(config: &Config) -> Result<RunSummary, RunError> {
    Pipeline::new(PdfLoader, config.clone()).run()
}
