//! Sync orchestrator: fetch one page of upstream records for a
//! (state, fiscal year) pair, transform each, and upsert each into the
//! report store under a bounded concurrency cap.

pub mod jobs;

use nrega_common::types::{SyncFailure, SyncOutcome};
use nrega_storage::ReportStore;
use nrega_upstream::error::UpstreamError;
use nrega_upstream::transform::transform_record;
use nrega_upstream::RecordSource;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// A sync run failed outright, with zero upserts attempted. Per-record
/// failures are not errors at this level; they are counted inside the
/// [`SyncOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("upstream fetch failed: {0}")]
    Fetch(#[from] UpstreamError),
}

/// Run one sync for `(state_name, fin_year)`.
///
/// The fetch failing aborts the whole run with no store writes. Afterwards
/// every record is transformed and upserted independently: a record's
/// failure is recorded in the outcome and never aborts its siblings.
/// Concurrency across records is capped by `max_concurrent`.
pub async fn run_sync(
    source: Arc<dyn RecordSource>,
    store: Arc<ReportStore>,
    state_name: &str,
    fin_year: &str,
    max_concurrent: usize,
) -> Result<SyncOutcome, SyncError> {
    tracing::info!(
        source = source.name(),
        state = %state_name,
        fin_year = %fin_year,
        "Starting sync"
    );

    let records = match source.fetch_records(state_name, fin_year).await {
        Ok(records) => records,
        Err(e) => {
            // Best-effort bookkeeping; the fetch error is what matters.
            if let Err(se) = store
                .upsert_sync_state(state_name, fin_year, 0, Some(&e.to_string()))
                .await
            {
                tracing::error!(error = %se, "Failed to record sync failure state");
            }
            return Err(SyncError::Fetch(e));
        }
    };

    if records.is_empty() {
        tracing::warn!(
            state = %state_name,
            fin_year = %fin_year,
            "No records found upstream for this query"
        );
        if let Err(e) = store.upsert_sync_state(state_name, fin_year, 0, None).await {
            tracing::error!(error = %e, "Failed to record sync state");
        }
        return Ok(SyncOutcome::default());
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut tasks = Vec::with_capacity(records.len());

    for record in records {
        let sem = Arc::clone(&semaphore);
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore is never closed");
            let report = transform_record(&record);
            let district = if report.district_name.is_empty() {
                "<unknown>".to_string()
            } else {
                report.district_name.clone()
            };
            match store.upsert_report(&report).await {
                Ok(_) => Ok(district),
                Err(e) => Err(SyncFailure {
                    district_name: district,
                    error: e.to_string(),
                }),
            }
        }));
    }

    let mut outcome = SyncOutcome::default();
    for task in tasks {
        match task.await {
            Ok(Ok(district)) => outcome.succeeded.push(district),
            Ok(Err(failure)) => {
                tracing::error!(
                    district = %failure.district_name,
                    error = %failure.error,
                    "Failed to upsert record"
                );
                outcome.failed.push(failure);
            }
            Err(e) => {
                tracing::error!(error = %e, "Record task panicked");
                outcome.failed.push(SyncFailure {
                    district_name: "<unknown>".to_string(),
                    error: format!("task panicked: {e}"),
                });
            }
        }
    }

    tracing::info!(
        state = %state_name,
        fin_year = %fin_year,
        upserted = outcome.success_count(),
        errors = outcome.error_count(),
        "Sync complete"
    );

    if let Err(e) = store
        .upsert_sync_state(state_name, fin_year, outcome.success_count() as i32, None)
        .await
    {
        tracing::error!(error = %e, "Failed to record sync state");
    }

    Ok(outcome)
}
