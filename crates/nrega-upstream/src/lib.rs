//! Client for the data.gov.in MGNREGA resource API plus the pure
//! record-to-report transformer.
//!
//! The API surface is deliberately small: a [`RecordSource`] trait at the
//! seam so the sync orchestrator (and tests) can swap the real HTTP client
//! for a mock, and a total [`transform::transform_record`] function that
//! never fails on malformed upstream data.

pub mod client;
pub mod error;
pub mod transform;

use nrega_common::types::UpstreamRecord;
use serde::{Deserialize, Serialize};

/// Configuration for the upstream data.gov.in resource endpoint.
///
/// Deserialized from the server's TOML config. `api_url` and `api_key` have
/// no sensible defaults; [`client::DataGovClient::new`] rejects a config in
/// which either is empty so that a misconfigured deployment fails at startup
/// rather than silently skipping syncs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataGovConfig {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Page size for the single fetch. The resource caps pages at 1000.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries after the first attempt, for transport errors and 429/5xx.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for DataGovConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            page_limit: default_page_limit(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_page_limit() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    2
}

/// Source of raw upstream records for one (state, fiscal year) query.
///
/// Implemented by [`client::DataGovClient`] for the real API and by mock
/// sources in tests.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    /// Fetch one page of records filtered by state and fiscal year.
    ///
    /// An empty result is a successful no-op, not an error.
    async fn fetch_records(
        &self,
        state_name: &str,
        fin_year: &str,
    ) -> error::Result<Vec<UpstreamRecord>>;
}
