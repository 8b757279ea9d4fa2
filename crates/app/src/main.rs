use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tally::{Config, Overrides, RunSummary, StatementOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Turn bank statement PDFs into spreadsheets", long_about = None)]
struct Cli {
    /// Statement PDFs, or directories holding them
    inputs: Vec<PathBuf>,

    /// Directory for the generated workbooks
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Year for dates printed without one, when the statement period is unknown
    #[arg(long)]
    year: Option<i32>,

    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip combine_all_xls.xlsx
    #[arg(long)]
    no_combine: bool,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn print_summary(summary: &RunSummary) {
    println!("{}", "=".repeat(80));
    for outcome in &summary.outcomes {
        match outcome {
            StatementOutcome::Written { report, file } => {
                println!(
                    "✓ {}: {} transactions ({} duplicates dropped) -> {}",
                    report.source,
                    report.kept,
                    report.duplicates,
                    file.display()
                );
            }
            StatementOutcome::Empty { report } => {
                println!("⚠ {}: no transactions extracted", report.source);
            }
            StatementOutcome::Failed { path, error } => {
                println!("✗ {}: {error}", path.display());
            }
        }
        if let Some(report) = outcome.report() {
            for (kind, count) in report.issue_counts() {
                println!("    {count} × {kind}");
            }
        }
    }

    println!("{}", "=".repeat(80));
    println!("  Successful: {}", summary.successful());
    println!("  Failed: {}", summary.failed());
    println!("  Total: {}", summary.total());
    println!(
        "  Deposits: {}  Withdrawals: {}  Net: {}",
        summary.deposit_total, summary.withdrawal_total, summary.net_total
    );
    if let Some(path) = &summary.combined_file {
        println!("  Combined workbook: {}", path.display());
    }
    if let Some(error) = &summary.combined_error {
        println!("  ✗ Combined workbook not written: {error}");
    }
    println!("\nOutput directory: {}", summary.output_dir.display());
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    config.apply(Overrides {
        inputs: cli.inputs,
        output_dir: cli.output,
        statement_year: cli.year,
        no_combine: cli.no_combine,
    });

    let summary = tally::run(&config).context("Statement run failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if summary.all_failed() {
        bail!("Every statement failed to process");
    }
    Ok(())
}
