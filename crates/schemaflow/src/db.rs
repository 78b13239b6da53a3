//! PostgreSQL connection pool and metadata schema bootstrap.
//!
//! All registry and ledger state lives in two tables inside a dedicated
//! metadata schema on the target database:
//!
//! - `{schema}.statements`: every known statement, keyed by content hash
//! - `{schema}.migrations`: every executed source file, keyed by file name
//!
//! Bootstrap is idempotent; every run starts with `init_schema`.

use crate::config::{Config, TargetConfig};
use crate::error::{FlowError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::debug;

/// Handle to the target database carrying the connection pool and the
/// metadata schema name.
pub struct Db {
    pool: Pool,
    schema: String,
}

impl Db {
    /// Create a connection pool for the target database.
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = build_pool(&config.target, config.migration.pool_size)?;

        // Test connection
        let conn = pool
            .get()
            .await
            .map_err(|e| FlowError::pool(e.to_string(), "testing target connection"))?;
        conn.query_one("SELECT 1", &[]).await?;
        debug!("Connected to target database {}", config.target.database);

        Ok(Self {
            pool,
            schema: config.migration.metadata_schema.clone(),
        })
    }

    /// Metadata schema name.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Acquire a pooled connection.
    pub async fn client(&self) -> Result<Object> {
        self.pool
            .get()
            .await
            .map_err(|e| FlowError::pool(e.to_string(), "acquiring connection"))
    }

    /// Initialize the metadata schema and tables.
    ///
    /// Safe to call on every run.
    pub async fn init_schema(&self) -> Result<()> {
        let conn = self.client().await?;

        conn.execute(
            &format!("CREATE SCHEMA IF NOT EXISTS {}", self.schema),
            &[],
        )
        .await?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {}.statements (
                    stmt TEXT NOT NULL,
                    stmt_hash TEXT NOT NULL UNIQUE,
                    stmt_type INTEGER NOT NULL,
                    stmt_name TEXT
                )",
                self.schema
            ),
            &[],
        )
        .await?;

        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {}.migrations (
                    file_name TEXT NOT NULL UNIQUE,
                    file_hash TEXT NOT NULL
                )",
                self.schema
            ),
            &[],
        )
        .await?;

        // Index for current-version lookups on named statements
        conn.execute(
            &format!(
                "CREATE INDEX IF NOT EXISTS idx_statements_name_type
                    ON {}.statements(stmt_name, stmt_type)
                    WHERE stmt_name IS NOT NULL",
                self.schema
            ),
            &[],
        )
        .await?;

        Ok(())
    }

    /// Round-trip latency of a trivial query, in milliseconds.
    pub async fn ping(&self) -> Result<u64> {
        let conn = self.client().await?;
        let start = std::time::Instant::now();
        conn.query_one("SELECT 1", &[]).await?;
        Ok(start.elapsed().as_millis() as u64)
    }
}

fn build_pool(target: &TargetConfig, pool_size: usize) -> Result<Pool> {
    let mut pg_config = PgConfig::new();
    pg_config.host(&target.host);
    pg_config.port(target.port);
    pg_config.dbname(&target.database);
    pg_config.user(&target.user);
    pg_config.password(&target.password);

    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };

    let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
    Pool::builder(mgr)
        .max_size(pool_size)
        .build()
        .map_err(|e| FlowError::pool(e.to_string(), "creating target pool"))
}
