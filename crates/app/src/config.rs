use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tally_core::StatementPeriod;
use tally_import::{DedupKey, NormalizeOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Input not found: {0}")]
    MissingInput(PathBuf),
    #[error("No PDF statements found in {0:?}")]
    NoStatements(Vec<PathBuf>),
}

/// Run settings. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Statement files or directories holding them.
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Year for month/day dates when no statement period is known.
    pub statement_year: Option<i32>,
    pub dedup: DedupKey,
    /// Also write `combine_all_xls.xlsx`.
    pub combine: bool,
    /// Forces the statement period instead of reading it from each statement.
    pub period: Option<StatementPeriod>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: vec![PathBuf::from("statements")],
            output_dir: PathBuf::from("statements/xlsx"),
            statement_year: None,
            dedup: DedupKey::default(),
            combine: true,
            period: None,
        }
    }
}

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub inputs: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub statement_year: Option<i32>,
    pub no_combine: bool,
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if !overrides.inputs.is_empty() {
            self.inputs = overrides.inputs;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if overrides.statement_year.is_some() {
            self.statement_year = overrides.statement_year;
        }
        if overrides.no_combine {
            self.combine = false;
        }
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            // Reversed bounds in the file are tolerated.
            period: self.period.map(|p| StatementPeriod::new(p.start, p.end)),
            year: self.statement_year,
            dedup: self.dedup,
        }
    }

    /// Expand directories to their `*.pdf` files (not recursive, sorted by
    /// name). Files given directly are kept as-is, in the order given.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let mut resolved = Vec::new();

        for input in &self.inputs {
            if input.is_dir() {
                let entries = std::fs::read_dir(input).map_err(|source| ConfigError::Io {
                    path: input.clone(),
                    source,
                })?;
                let mut pdfs: Vec<PathBuf> = entries
                    .filter_map(Result::ok)
                    .map(|e| e.path())
                    .filter(|p| p.is_file() && is_pdf(p))
                    .collect();
                pdfs.sort();
                resolved.extend(pdfs);
            } else if input.exists() {
                resolved.push(input.clone());
            } else {
                return Err(ConfigError::MissingInput(input.clone()));
            }
        }

        if resolved.is_empty() {
            return Err(ConfigError::NoStatements(self.inputs.clone()));
        }
        Ok(resolved)
    }
}
