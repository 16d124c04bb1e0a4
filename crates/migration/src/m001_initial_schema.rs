use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m001_initial_schema"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(UP_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await?;
        Ok(())
    }
}

// The composite primary key on (state_name, district_name, fin_year) is the
// uniqueness guarantee: concurrent upserts for one triple serialize to a
// single surviving row at the schema level, not in application code.
const UP_SQL: &str = "
CREATE TABLE IF NOT EXISTS mgnrega_records (
    state_name TEXT NOT NULL,
    district_name TEXT NOT NULL,
    fin_year TEXT NOT NULL,
    families_given_work INTEGER NOT NULL DEFAULT 0,
    total_work_days INTEGER NOT NULL DEFAULT 0,
    total_wages_paid REAL NOT NULL DEFAULT 0,
    payments_on_time_percent REAL NOT NULL DEFAULT 0,
    raw_api_record TEXT NOT NULL DEFAULT '{}',
    last_updated_at TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (state_name, district_name, fin_year)
);
CREATE INDEX IF NOT EXISTS idx_mgnrega_records_state ON mgnrega_records(state_name);
CREATE INDEX IF NOT EXISTS idx_mgnrega_records_state_year ON mgnrega_records(state_name, fin_year);

CREATE TABLE IF NOT EXISTS sync_state (
    state_name TEXT NOT NULL,
    fin_year TEXT NOT NULL,
    last_synced_at TEXT NOT NULL,
    last_record_count INTEGER NOT NULL DEFAULT 0,
    last_error TEXT,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (state_name, fin_year)
);
";

const DOWN_SQL: &str = "
DROP TABLE IF EXISTS sync_state;
DROP TABLE IF EXISTS mgnrega_records;
";
