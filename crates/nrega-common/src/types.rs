use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One upstream record as returned by the data.gov.in resource API: an
/// untyped field-name-to-value mapping. The upstream field names are a
/// loosely-typed, unstable contract, so nothing here is given a schema.
pub type UpstreamRecord = serde_json::Map<String, serde_json::Value>;

/// Normalized district-level MGNREGA figures for one fiscal year.
///
/// This is the transformer output and the upsert input: identity triple plus
/// derived metrics plus the verbatim source record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistrictReport {
    pub state_name: String,
    pub district_name: String,
    /// Fiscal year label, e.g. `"2024-2025"`.
    pub fin_year: String,
    /// Households that received work (upstream `Total_Households_Worked`).
    pub families_given_work: i64,
    /// Mapped from upstream `Total_Individuals_Worked`. The upstream name
    /// suggests a head count of individuals, not person-days; the upstream
    /// semantic is preserved as-is and the naming mismatch is intentional.
    pub total_work_days: i64,
    /// Aggregate wages disbursed (upstream `Wages`).
    pub total_wages_paid: f64,
    /// Share of payments generated within 15 days, 0-100 (upstream
    /// `percentage_payments_gererated_within_15_days`, typo theirs).
    pub payments_on_time_percent: f64,
    /// Verbatim upstream record, retained for audit only.
    pub raw_api_record: serde_json::Value,
}

/// One record that failed during a sync run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    /// District name of the failed record, or `"<unknown>"` when the record
    /// carried none.
    pub district_name: String,
    pub error: String,
}

/// Aggregate result of one sync run: which districts were upserted and which
/// records failed. A non-empty `failed` list does not make the run a failure;
/// only a fetch-level error does.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<SyncFailure>,
}

impl SyncOutcome {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn error_count(&self) -> usize {
        self.failed.len()
    }
}

/// Last-sync bookkeeping for one (state, fiscal year) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncState {
    pub state_name: String,
    pub fin_year: String,
    pub last_synced_at: DateTime<Utc>,
    pub last_record_count: i32,
    pub last_error: Option<String>,
}
