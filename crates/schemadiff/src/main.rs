//! schemadiff CLI
//!
//! Prints the statements that migrate one SQLite schema to another, and
//! optionally applies them.

use clap::{Parser, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use schemadiff::DiffReport;

/// Declarative schema migrations for SQLite.
#[derive(Parser)]
#[command(name = "schemadiff")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Current schema: SQL text, a .sql file or an SQLite database.
    old: String,

    /// Desired schema: SQL text, a .sql file or an SQLite database.
    new: String,

    /// Execute the statements against the current schema.
    #[arg(short, long, env = "SCHEMADIFF_APPLY")]
    apply: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Sql)]
    format: OutputFormat,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One statement per line, terminated by `;`.
    Sql,
    /// A JSON object with the statements and whether they were applied.
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the statements.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let statements = schemadiff::diff(&cli.old, &cli.new, cli.apply).await?;

    match cli.format {
        OutputFormat::Sql => {
            for sql in &statements {
                if sql.starts_with("--") {
                    println!("{sql}");
                } else {
                    println!("{sql};");
                }
            }
        }
        OutputFormat::Json => {
            let report = DiffReport {
                statements,
                applied: cli.apply,
            };
            println!("{}", report.to_json()?);
        }
    }

    Ok(())
}
