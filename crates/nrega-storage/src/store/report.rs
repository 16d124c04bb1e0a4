use chrono::{DateTime, Utc};
use nrega_common::types::{DistrictReport, SyncState};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::entities::mgnrega_record::{self, Column as RecCol, Entity as RecEntity};
use crate::entities::sync_state::{self, Column as StateCol, Entity as StateEntity};
use crate::error::{Result, StorageError};
use crate::store::ReportStore;

/// One stored district report row, with the raw upstream record parsed back
/// into JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub state_name: String,
    pub district_name: String,
    pub fin_year: String,
    pub families_given_work: i64,
    pub total_work_days: i64,
    pub total_wages_paid: f64,
    pub payments_on_time_percent: f64,
    pub raw_api_record: serde_json::Value,
    pub last_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

fn model_to_report(m: mgnrega_record::Model) -> ReportRow {
    // Rows are only ever written through upsert_report, so the column should
    // always hold valid JSON; fall back to Null rather than failing a read.
    let raw_api_record =
        serde_json::from_str(&m.raw_api_record).unwrap_or(serde_json::Value::Null);
    ReportRow {
        state_name: m.state_name,
        district_name: m.district_name,
        fin_year: m.fin_year,
        families_given_work: m.families_given_work,
        total_work_days: m.total_work_days,
        total_wages_paid: m.total_wages_paid,
        payments_on_time_percent: m.payments_on_time_percent,
        raw_api_record,
        last_updated_at: m.last_updated_at.with_timezone(&Utc),
        created_at: m.created_at.with_timezone(&Utc),
    }
}

impl ReportStore {
    // ---- mgnrega_records ----

    /// Atomically create-or-replace the unique row for the report's
    /// (state, district, fiscal year) triple.
    ///
    /// A conflict replaces every derived field and the raw record and
    /// advances `last_updated_at`; `created_at` keeps its original value.
    /// Returns the stored row.
    pub async fn upsert_report(&self, report: &DistrictReport) -> Result<ReportRow> {
        if report.state_name.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "state_name is empty",
            });
        }
        if report.district_name.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "district_name is empty",
            });
        }
        if report.fin_year.is_empty() {
            return Err(StorageError::InvalidKey {
                reason: "fin_year is empty",
            });
        }

        let now = Utc::now().fixed_offset();
        let raw_json = serde_json::to_string(&report.raw_api_record)?;
        let am = mgnrega_record::ActiveModel {
            state_name: Set(report.state_name.clone()),
            district_name: Set(report.district_name.clone()),
            fin_year: Set(report.fin_year.clone()),
            families_given_work: Set(report.families_given_work),
            total_work_days: Set(report.total_work_days),
            total_wages_paid: Set(report.total_wages_paid),
            payments_on_time_percent: Set(report.payments_on_time_percent),
            raw_api_record: Set(raw_json),
            last_updated_at: Set(now),
            created_at: Set(now),
        };

        RecEntity::insert(am)
            .on_conflict(
                OnConflict::columns([RecCol::StateName, RecCol::DistrictName, RecCol::FinYear])
                    .update_columns([
                        RecCol::FamiliesGivenWork,
                        RecCol::TotalWorkDays,
                        RecCol::TotalWagesPaid,
                        RecCol::PaymentsOnTimePercent,
                        RecCol::RawApiRecord,
                        RecCol::LastUpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db())
            .await?;

        self.find_report(&report.state_name, &report.district_name, &report.fin_year)
            .await?
            .ok_or(StorageError::UpsertReadback {
                entity: "mgnrega_record",
            })
    }

    /// Sorted, de-duplicated district names cached for a state. Empty when
    /// the state has no cached data.
    pub async fn distinct_districts(&self, state_name: &str) -> Result<Vec<String>> {
        let districts: Vec<String> = RecEntity::find()
            .select_only()
            .column(RecCol::DistrictName)
            .distinct()
            .filter(RecCol::StateName.eq(state_name))
            .order_by_asc(RecCol::DistrictName)
            .into_tuple()
            .all(self.db())
            .await?;
        Ok(districts)
    }

    /// Point lookup for one (state, district, fiscal year) triple. `None`
    /// when absent; never an error for a missing row.
    pub async fn find_report(
        &self,
        state_name: &str,
        district_name: &str,
        fin_year: &str,
    ) -> Result<Option<ReportRow>> {
        let model = RecEntity::find_by_id((
            state_name.to_owned(),
            district_name.to_owned(),
            fin_year.to_owned(),
        ))
        .one(self.db())
        .await?;
        Ok(model.map(model_to_report))
    }

    // ---- sync_state ----

    /// Record the outcome of a sync attempt for a (state, fiscal year) pair,
    /// success or failure.
    pub async fn upsert_sync_state(
        &self,
        state_name: &str,
        fin_year: &str,
        record_count: i32,
        error: Option<&str>,
    ) -> Result<()> {
        let now = Utc::now().fixed_offset();
        let am = sync_state::ActiveModel {
            state_name: Set(state_name.to_owned()),
            fin_year: Set(fin_year.to_owned()),
            last_synced_at: Set(now),
            last_record_count: Set(record_count),
            last_error: Set(error.map(|s| s.to_owned())),
            updated_at: Set(now),
        };
        StateEntity::insert(am)
            .on_conflict(
                OnConflict::columns([StateCol::StateName, StateCol::FinYear])
                    .update_columns([
                        StateCol::LastSyncedAt,
                        StateCol::LastRecordCount,
                        StateCol::LastError,
                        StateCol::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.db())
            .await?;
        Ok(())
    }

    pub async fn get_sync_state(
        &self,
        state_name: &str,
        fin_year: &str,
    ) -> Result<Option<SyncState>> {
        let model = StateEntity::find_by_id((state_name.to_owned(), fin_year.to_owned()))
            .one(self.db())
            .await?;
        Ok(model.map(|m| SyncState {
            state_name: m.state_name,
            fin_year: m.fin_year,
            last_synced_at: m.last_synced_at.with_timezone(&Utc),
            last_record_count: m.last_record_count,
            last_error: m.last_error,
        }))
    }
}
