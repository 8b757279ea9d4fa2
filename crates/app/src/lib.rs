pub mod config;
pub mod pipeline;

pub use config::{Config, ConfigError, Overrides};
pub use pipeline::{
    run, PdfLoader, Pipeline, RunError, RunSummary, StatementError, StatementLoader,
    StatementOutcome,
};
