use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tally_core::StatementPeriod;
use thiserror::Error;

use crate::patterns::collapse_whitespace;

/// A line-level problem. Recorded and logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseIssue {
    #[error("Unparseable line ({reason}): {line}")]
    UnparseableLine { line: String, reason: String },
    #[error("No year context for date '{date}': {line}")]
    MissingYearContext { line: String, date: String },
    #[error("Folded into previous description despite date and amount: {line}")]
    AmbiguousContinuation { line: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnparseableLine,
    MissingYearContext,
    AmbiguousContinuation,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::UnparseableLine => write!(f, "unparseable line"),
            IssueKind::MissingYearContext => write!(f, "missing year context"),
            IssueKind::AmbiguousContinuation => write!(f, "ambiguous continuation"),
        }
    }
}

impl ParseIssue {
    pub fn unparseable(line: &str, reason: impl Into<String>) -> Self {
        ParseIssue::UnparseableLine {
            line: line.trim().to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> IssueKind {
        match self {
            ParseIssue::UnparseableLine { .. } => IssueKind::UnparseableLine,
            ParseIssue::MissingYearContext { .. } => IssueKind::MissingYearContext,
            ParseIssue::AmbiguousContinuation { .. } => IssueKind::AmbiguousContinuation,
        }
    }

    /// The statement line the issue is about, as recorded.
    pub fn line(&self) -> &str {
        match self {
            ParseIssue::UnparseableLine { line, .. }
            | ParseIssue::MissingYearContext { line, .. }
            | ParseIssue::AmbiguousContinuation { line } => line,
        }
    }

    /// Same kind of problem on the same line, whichever pass saw it. Table
    /// rows are joined with single spaces, so spacing is ignored.
    pub fn same_as(&self, other: &ParseIssue) -> bool {
        self.kind() == other.kind()
            && collapse_whitespace(self.line()) == collapse_whitespace(other.line())
    }

    /// Whether the issue cost a transaction, as opposed to only flagging one.
    pub fn dropped_entry(&self) -> bool {
        !matches!(self, ParseIssue::AmbiguousContinuation { .. })
    }
}

/// What happened to one statement: counts plus every recorded issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementReport {
    pub source: String,
    pub period: Option<StatementPeriod>,
    /// Entries produced by both extraction passes, before normalization.
    pub extracted: usize,
    pub duplicates: usize,
    pub kept: usize,
    pub issues: Vec<ParseIssue>,
}

impl StatementReport {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Adds issues, skipping any already recorded for the same line.
    pub fn record_issues(&mut self, issues: impl IntoIterator<Item = ParseIssue>) {
        for issue in issues {
            if !self.issues.iter().any(|seen| seen.same_as(&issue)) {
                self.issues.push(issue);
            }
        }
    }

    pub fn skipped(&self) -> usize {
        self.issues.iter().filter(|i| i.dropped_entry()).count()
    }

    pub fn issue_counts(&self) -> BTreeMap<IssueKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.kind()).or_insert(0) += 1;
        }
        counts
    }
}
