use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use crate::error::Result;

pub mod report;

/// Unified access layer for the report database.
///
/// All methods are `async fn` over SeaORM. One instance is shared across the
/// HTTP handlers and the sync orchestrator behind an `Arc`.
pub struct ReportStore {
    db: DatabaseConnection,
}

impl ReportStore {
    /// Connect and initialize the database.
    ///
    /// - `db_url`: full connection URL, e.g. `sqlite://data/nrega.db?mode=rwc`
    ///   or `sqlite::memory:` in tests.
    ///
    /// Runs all pending migrations so the schema is current before the first
    /// query.
    pub async fn new(db_url: &str) -> Result<Self> {
        let db = Database::connect(db_url).await?;

        // WAL mode is SQLite-only; it lets the read path proceed while a
        // sync is writing.
        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;
        tracing::info!(db_url = %db_url, "Initialized report store");

        Ok(Self { db })
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
