//! schemaflow CLI - declarative schema management for PostgreSQL.

use clap::{Parser, Subcommand};
use schemaflow::{Config, FlowError, Runner};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "schemaflow")]
#[command(about = "Reconcile SQL source files against a PostgreSQL database")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile all source files against the target database
    Run {
        /// Dry run: reconcile inside transactions that are rolled back
        #[arg(long)]
        dry_run: bool,

        /// Override the SQL source root directory
        #[arg(long)]
        sql_root: Option<PathBuf>,
    },

    /// Show recorded migrations and registered statements
    Status,

    /// Test the target database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), FlowError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| FlowError::Config(e.to_string()))?;

    let mut config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { dry_run, sql_root } => {
            if let Some(root) = sql_root {
                config.migration.sql_root = root;
            }

            let runner = Runner::new(config).await?;
            let summary = runner.run(dry_run).await?;

            if cli.output_json {
                println!("{}", summary.to_json()?);
            } else {
                let status_msg = if dry_run {
                    "Dry run completed!"
                } else {
                    "Reconciliation completed!"
                };
                println!("\n{}", status_msg);
                println!("  Duration: {:.2}s", summary.duration_seconds);
                println!(
                    "  Files: {} applied, {} skipped, {} total",
                    summary.files_applied, summary.files_skipped, summary.files_total
                );
                println!(
                    "  Statements: {} added, {} revised, {} unchanged",
                    summary.statements_added,
                    summary.statements_revised,
                    summary.statements_unchanged
                );
            }
        }

        Commands::Status => {
            let runner = Runner::new(config).await?;
            let report = runner.status().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Applied migrations: {}", report.migrations.len());
                for record in &report.migrations {
                    println!("  {}  {}", record.file_name, record.file_hash);
                }
                println!("\nRegistered statements: {}", report.statements.len());
                for stmt in &report.statements {
                    match &stmt.name {
                        Some(name) => println!("  {} {}  {}", stmt.kind, name, stmt.hash),
                        None => println!("  {}  {}", stmt.kind, stmt.hash),
                    }
                }
            }
        }

        Commands::HealthCheck => {
            let runner = Runner::new(config).await?;
            let report = runner.health_check().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Target (PostgreSQL): {} ({}ms)",
                    if report.connected { "OK" } else { "FAILED" },
                    report.latency_ms
                );
                if let Some(ref err) = report.error {
                    println!("  Error: {}", err);
                }
            }

            if !report.connected {
                return Err(FlowError::Config("Health check failed".to_string()));
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
