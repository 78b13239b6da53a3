//! Run coordinator - main reconciliation workflow.
//!
//! A run walks every `.sql` file under the configured root in sorted order.
//! Files whose content hash is already recorded in the ledger are skipped
//! outright. Each remaining file is parsed and reconciled statement by
//! statement inside one transaction: unchanged statements are skipped, added
//! and revised statements are executed against the target and registered,
//! and the file is recorded in the ledger just before commit. Any failure
//! rolls the transaction back, so the ledger still reports the file as not
//! applied and the next run retries it.

use crate::config::Config;
use crate::db::Db;
use crate::discover;
use crate::error::Result;
use crate::hash;
use crate::ledger::{MigrationLog, MigrationRecord, PgMigrationLedger};
use crate::parser;
use crate::reconcile::{reconcile, Reconciliation};
use crate::registry::{PgStatementRegistry, RegisteredStatement, StatementStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

/// Reconciliation run coordinator.
pub struct Runner {
    config: Config,
    db: Db,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Whether this was a dry run (all transactions rolled back).
    pub dry_run: bool,

    /// Source files discovered.
    pub files_total: usize,

    /// Files skipped because their hash was already recorded.
    pub files_skipped: usize,

    /// Files applied (or, on a dry run, that would be applied).
    pub files_applied: usize,

    /// Statements recognized as unchanged.
    pub statements_unchanged: usize,

    /// Statements newly registered.
    pub statements_added: usize,

    /// Named statements whose registry row was replaced.
    pub statements_revised: usize,
}

impl RunSummary {
    /// Serialize the summary as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Snapshot of the metadata tables.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Recorded migration files.
    pub migrations: Vec<MigrationRecord>,

    /// Registered statements.
    pub statements: Vec<RegisteredStatement>,
}

/// Target database connectivity report.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub connected: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl Runner {
    /// Create a new runner, connecting to the target database.
    pub async fn new(config: Config) -> Result<Self> {
        let db = Db::connect(&config).await?;
        Ok(Self { config, db })
    }

    /// Run a reconciliation pass over every discovered source file.
    ///
    /// With `dry_run` the full flow executes inside transactions that are
    /// rolled back instead of committed, and nothing is recorded.
    pub async fn run(&self, dry_run: bool) -> Result<RunSummary> {
        let started_at = Utc::now();

        info!("Phase 1: Preparing metadata schema");
        self.db.init_schema().await?;

        info!(
            "Phase 2: Discovering source files under {}",
            self.config.migration.sql_root.display()
        );
        let files = discover::sql_files(&self.config.migration.sql_root)?;
        info!("Found {} source files", files.len());

        info!("Phase 3: Reconciling statements");
        let mut files_skipped = 0;
        let mut files_applied = 0;
        let mut statements_unchanged = 0;
        let mut statements_added = 0;
        let mut statements_revised = 0;

        for path in &files {
            let name = discover::file_name(path);
            let content = std::fs::read_to_string(path)?;
            let file_hash = hash::hash_str(&content);

            let mut conn = self.db.client().await?;
            let tx = conn.transaction().await?;
            let ledger = PgMigrationLedger::new(&tx, self.db.schema());

            if ledger.is_applied(&name, &file_hash).await? {
                debug!("Skipping {} (already applied)", name);
                files_skipped += 1;
                continue;
            }

            let statements = parser::parse_sql(&content, &name)?;
            info!("Applying {} ({} statements)", name, statements.len());

            let registry = PgStatementRegistry::new(&tx, self.db.schema());
            for stmt in &statements {
                match reconcile(&registry, stmt).await? {
                    Reconciliation::Unchanged => {
                        debug!("Unchanged {} ({})", stmt.kind, stmt.hash);
                        statements_unchanged += 1;
                    }
                    Reconciliation::Added => {
                        tx.batch_execute(&stmt.text).await?;
                        statements_added += 1;
                    }
                    Reconciliation::Revised { .. } => {
                        debug!(
                            "Revising {} {}",
                            stmt.kind,
                            stmt.name.as_deref().unwrap_or_default()
                        );
                        tx.batch_execute(&stmt.text).await?;
                        statements_revised += 1;
                    }
                }
            }

            // Recorded inside the same transaction: a failed file never
            // reaches the ledger.
            ledger.record(&name, &file_hash).await?;

            if dry_run {
                tx.rollback().await?;
            } else {
                tx.commit().await?;
            }
            files_applied += 1;
        }

        let completed_at = Utc::now();
        let summary = RunSummary {
            started_at,
            completed_at,
            duration_seconds: (completed_at - started_at).num_milliseconds() as f64 / 1000.0,
            dry_run,
            files_total: files.len(),
            files_skipped,
            files_applied,
            statements_unchanged,
            statements_added,
            statements_revised,
        };

        info!(
            "Run complete: {}/{} files applied, {} skipped ({} added, {} revised, {} unchanged)",
            summary.files_applied,
            summary.files_total,
            summary.files_skipped,
            summary.statements_added,
            summary.statements_revised,
            summary.statements_unchanged,
        );

        Ok(summary)
    }

    /// Read the current contents of the metadata tables.
    pub async fn status(&self) -> Result<StatusReport> {
        self.db.init_schema().await?;

        let mut conn = self.db.client().await?;
        let tx = conn.transaction().await?;

        let migrations = PgMigrationLedger::new(&tx, self.db.schema())
            .list_applied()
            .await?;
        let statements = PgStatementRegistry::new(&tx, self.db.schema())
            .list()
            .await?;

        Ok(StatusReport {
            migrations,
            statements,
        })
    }

    /// Check target database connectivity.
    pub async fn health_check(&self) -> Result<HealthReport> {
        match self.db.ping().await {
            Ok(latency_ms) => Ok(HealthReport {
                connected: true,
                latency_ms,
                error: None,
            }),
            Err(e) => Ok(HealthReport {
                connected: false,
                latency_ms: 0,
                error: Some(e.to_string()),
            }),
        }
    }
}
