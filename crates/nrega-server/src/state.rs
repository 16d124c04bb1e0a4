use crate::config::ServerConfig;
use crate::sync::jobs::SyncJobRegistry;
use chrono::{DateTime, Utc};
use nrega_storage::ReportStore;
use nrega_upstream::RecordSource;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ReportStore>,
    pub source: Arc<dyn RecordSource>,
    pub jobs: Arc<SyncJobRegistry>,
    pub config: Arc<ServerConfig>,
    pub start_time: DateTime<Utc>,
}
