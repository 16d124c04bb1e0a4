//! In-process registry of spawned sync jobs.
//!
//! A trigger returns a job id immediately; the sync runs detached and the
//! job can be polled for its outcome instead of being lost after the 202.

use crate::logging::generate_trace_id;
use crate::sync::run_sync;
use chrono::{DateTime, Utc};
use nrega_common::types::SyncOutcome;
use nrega_storage::ReportStore;
use nrega_upstream::RecordSource;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use utoipa::ToSchema;

/// Jobs retained in memory; the oldest are evicted beyond this.
const MAX_RETAINED_JOBS: usize = 64;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Running,
    Completed,
    Failed,
}

/// Snapshot of one sync job, as served by the status endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobView {
    pub job_id: String,
    pub state_name: String,
    pub fin_year: String,
    pub status: JobPhase,
    pub started_at: DateTime<Utc>,
    /// Present once the job completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub outcome: Option<SyncOutcome>,
    /// Present once the job failed (fetch-level error).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct SyncJobRegistry {
    jobs: Mutex<HashMap<String, JobView>>,
}

impl Default for SyncJobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncJobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Spawn a sync as a detached task and return its job id.
    pub fn start(
        self: &Arc<Self>,
        source: Arc<dyn RecordSource>,
        store: Arc<ReportStore>,
        state_name: String,
        fin_year: String,
        max_concurrent: usize,
    ) -> String {
        let job_id = generate_trace_id();

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            evict_oldest(&mut jobs);
            jobs.insert(
                job_id.clone(),
                JobView {
                    job_id: job_id.clone(),
                    state_name: state_name.clone(),
                    fin_year: fin_year.clone(),
                    status: JobPhase::Running,
                    started_at: Utc::now(),
                    outcome: None,
                    error: None,
                },
            );
        }

        let registry = Arc::clone(self);
        let id = job_id.clone();
        tokio::spawn(async move {
            let result = run_sync(source, store, &state_name, &fin_year, max_concurrent).await;
            let mut jobs = registry
                .jobs
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(job) = jobs.get_mut(&id) {
                match result {
                    Ok(outcome) => {
                        job.status = JobPhase::Completed;
                        job.outcome = Some(outcome);
                    }
                    Err(e) => {
                        job.status = JobPhase::Failed;
                        job.error = Some(e.to_string());
                    }
                }
            }
        });

        job_id
    }

    pub fn get(&self, job_id: &str) -> Option<JobView> {
        self.jobs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(job_id)
            .cloned()
    }
}

// Evicting a still-running job would orphan its completion update, so
// finished jobs go first; the oldest running job is evicted only when
// everything retained is still running.
fn evict_oldest(jobs: &mut HashMap<String, JobView>) {
    while jobs.len() >= MAX_RETAINED_JOBS {
        let victim = jobs
            .values()
            .filter(|j| !matches!(j.status, JobPhase::Running))
            .min_by_key(|j| j.started_at)
            .or_else(|| jobs.values().min_by_key(|j| j.started_at))
            .map(|j| j.job_id.clone());
        match victim {
            Some(id) => {
                jobs.remove(&id);
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, status: JobPhase, started_secs_ago: i64) -> JobView {
        JobView {
            job_id: id.to_string(),
            state_name: "UTTAR PRADESH".to_string(),
            fin_year: "2024-2025".to_string(),
            status,
            started_at: Utc::now() - chrono::Duration::seconds(started_secs_ago),
            outcome: None,
            error: None,
        }
    }

    #[test]
    fn eviction_skips_running_jobs_while_finished_ones_remain() {
        let mut jobs = HashMap::new();
        // The oldest job is still running; everything else has finished.
        jobs.insert(
            "running-old".to_string(),
            job("running-old", JobPhase::Running, 1000),
        );
        for i in 0..MAX_RETAINED_JOBS - 1 {
            let id = format!("done-{i}");
            jobs.insert(id.clone(), job(&id, JobPhase::Completed, i as i64));
        }

        evict_oldest(&mut jobs);

        assert_eq!(jobs.len(), MAX_RETAINED_JOBS - 1);
        assert!(jobs.contains_key("running-old"));
        let oldest_done = format!("done-{}", MAX_RETAINED_JOBS - 2);
        assert!(!jobs.contains_key(&oldest_done));
    }

    #[test]
    fn eviction_falls_back_to_the_oldest_when_all_jobs_are_running() {
        let mut jobs = HashMap::new();
        for i in 0..MAX_RETAINED_JOBS {
            let id = format!("run-{i}");
            jobs.insert(id.clone(), job(&id, JobPhase::Running, i as i64));
        }

        evict_oldest(&mut jobs);

        assert_eq!(jobs.len(), MAX_RETAINED_JOBS - 1);
        let oldest = format!("run-{}", MAX_RETAINED_JOBS - 1);
        assert!(!jobs.contains_key(&oldest));
    }
}
