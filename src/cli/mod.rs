use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Once;
use tracing::debug;

use crate::application::{AnalyticsReport, LedgerService};
use crate::domain::{
    format_money, parse_cents, parse_date, Transaction, TransactionKind, DATE_FORMAT,
};

static TRACING_INIT: Once = Once::new();

/// fintrack - Personal Finance Tracker
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Record income and expenses and see where the money goes")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "FINTRACK_DB",
        default_value = "finance_tracker.db",
        global = true
    )]
    pub database: String,

    /// Currency label used when printing amounts
    #[arg(long, env = "FINTRACK_CURRENCY", default_value = "Rs", global = true)]
    pub currency: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new income or expense
    Add {
        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Transaction type: income or expense
        #[arg(short = 't', long = "type")]
        kind: String,

        /// Category (e.g., Food, Rent, Salary)
        #[arg(short, long, default_value = "")]
        category: String,

        /// Optional note
        #[arg(short, long, default_value = "")]
        note: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// List all transactions, newest first
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show totals, balance and breakdowns by type and category
    Analytics {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Export the whole ledger
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },

    /// Import transactions from a CSV export
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Validate rows without recording them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        init_tracing(self.verbose);

        let service = LedgerService::open(&self.database)
            .await
            .with_context(|| format!("Could not open ledger {}", self.database))?;
        debug!(database = %self.database, "dispatching command");

        let result = self.dispatch(&service).await;
        service.close().await;
        result
    }

    async fn dispatch(&self, service: &LedgerService) -> Result<()> {
        match &self.command {
            Commands::Add {
                amount,
                kind,
                category,
                note,
                date,
            } => {
                let amount_cents =
                    parse_cents(amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let kind = kind
                    .parse::<TransactionKind>()
                    .map_err(|e| anyhow::anyhow!(e))?;
                let date = match date {
                    Some(date_str) => parse_date(date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => today(),
                };

                let tx = service
                    .record_transaction(date, kind, category.as_str(), amount_cents, note.as_str())
                    .await?;

                println!(
                    "Saved transaction #{}: {} {} ({})",
                    tx.id,
                    tx.kind,
                    format_money(tx.amount_cents, &self.currency),
                    tx.date.format(DATE_FORMAT)
                );
            }

            Commands::List { format } => {
                let transactions = service.list_transactions().await?;
                print_transactions(&transactions, *format, &self.currency)?;
            }

            Commands::Analytics { format } => {
                let report = service.analytics().await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                    OutputFormat::Csv => {
                        crate::io::write_analytics_csv(std::io::stdout(), &report)?
                    }
                    OutputFormat::Table => print_analytics(&report, &self.currency),
                }
            }

            Commands::Export { output, format } => {
                run_export_command(service, output.as_deref(), *format).await?;
            }

            Commands::Import { input, dry_run } => {
                run_import_command(service, input.as_deref(), *dry_run).await?;
            }
        }

        Ok(())
    }
}

/// Install the global tracing subscriber once. Logs go to stderr so that
/// exports written to stdout stay clean.
fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let default_level = if verbose { "fintrack=debug" } else { "fintrack=warn" };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn print_transactions(
    transactions: &[Transaction],
    format: OutputFormat,
    currency: &str,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(transactions)?);
        }
        OutputFormat::Csv => {
            crate::io::write_transactions_csv(std::io::stdout(), transactions)?;
        }
        OutputFormat::Table => {
            if transactions.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }

            println!(
                "{:>6} {:<10} {:<8} {:<20} {:>16}  {}",
                "ID", "DATE", "TYPE", "CATEGORY", "AMOUNT", "NOTE"
            );
            println!("{}", "-".repeat(80));
            for tx in transactions {
                println!(
                    "{:>6} {:<10} {:<8} {:<20} {:>16}  {}",
                    tx.id,
                    tx.date.format(DATE_FORMAT),
                    tx.kind,
                    truncate(&tx.category, 20),
                    format_money(tx.amount_cents, currency),
                    tx.note
                );
            }
        }
    }
    Ok(())
}

fn print_analytics(report: &AnalyticsReport, currency: &str) {
    if report.is_empty() {
        println!("No data available. Add some transactions first.");
        return;
    }

    let totals = &report.totals;
    println!("Analytics ({} transactions)", report.transaction_count);
    println!();
    println!("  Total Income:   {:>18}", format_money(totals.income, currency));
    println!("  Total Expense:  {:>18}", format_money(totals.expense, currency));
    println!("  Balance:        {:>18}", format_money(totals.balance, currency));
    println!();

    println!("{:<20} {:>18} {:>8}", "TYPE", "TOTAL", "SHARE");
    println!("{}", "-".repeat(48));
    for kind in &report.by_kind {
        println!(
            "{:<20} {:>18} {:>7.1}%",
            kind.kind,
            format_money(kind.total, currency),
            kind.percentage
        );
    }
    println!();

    println!(
        "{:<20} {:>18} {:>6} {:>8}",
        "CATEGORY", "TOTAL", "COUNT", "SHARE"
    );
    println!("{}", "-".repeat(55));
    for cat in &report.by_category {
        let name = if cat.category.is_empty() {
            "(none)".to_string()
        } else {
            truncate(&cat.category, 20)
        };
        println!(
            "{:<20} {:>18} {:>6} {:>7.1}%",
            name,
            format_money(cat.total, currency),
            cat.count,
            cat.percentage
        );
    }
}

async fn run_export_command(
    service: &LedgerService,
    output: Option<&str>,
    format: ExportFormat,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        ExportFormat::Csv => exporter.export_transactions_csv(writer).await?,
        ExportFormat::Json => exporter.export_full_json(writer).await?.transactions.len(),
    };

    if let Some(path) = output {
        eprintln!("Exported {} transactions to {}", count, path);
    }

    Ok(())
}

async fn run_import_command(
    service: &LedgerService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{stdin, Read};

    let importer = Importer::new(service);

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let result = importer
        .import_transactions_csv(reader, ImportOptions { dry_run })
        .await?;

    if dry_run {
        println!("Validation complete");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            let field = error
                .field
                .as_ref()
                .map(|f| format!("{}: ", f))
                .unwrap_or_default();
            println!("  Line {}: {}{}", error.line, field, error.error);
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

/// Shorten to at most `max_len` characters, marking the cut with "...".
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
