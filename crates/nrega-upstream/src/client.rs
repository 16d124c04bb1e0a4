use crate::error::{Result, UpstreamError};
use crate::{DataGovConfig, RecordSource};
use nrega_common::types::UpstreamRecord;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

/// Envelope the resource API wraps its rows in. Everything except `records`
/// (counts, offsets, field descriptors) is ignored; a missing `records` key
/// reads as an empty page.
#[derive(Debug, Deserialize)]
struct ResourcePage {
    #[serde(default)]
    records: Vec<UpstreamRecord>,
}

/// HTTP client for one data.gov.in resource, queried with an API key and
/// filtered by state name and fiscal year.
pub struct DataGovClient {
    config: DataGovConfig,
    client: Client,
}

impl DataGovClient {
    /// Build a client from a validated config.
    ///
    /// Fails with [`UpstreamError::Config`] when the URL or key is empty, so
    /// a misconfigured deployment aborts at startup instead of failing every
    /// sync at call time.
    pub fn new(config: DataGovConfig) -> Result<Self> {
        if config.api_url.trim().is_empty() {
            return Err(UpstreamError::Config(
                "upstream.api_url is not set".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::Config(
                "upstream.api_key is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(UpstreamError::Network)?;

        Ok(Self { config, client })
    }

    async fn fetch_page(&self, state_name: &str, fin_year: &str) -> Result<Vec<UpstreamRecord>> {
        let limit = self.config.page_limit.to_string();
        let response = self
            .client
            .get(&self.config.api_url)
            .query(&[
                ("api-key", self.config.api_key.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
                ("filters[state_name]", state_name),
                ("filters[fin_year]", fin_year),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let page: ResourcePage = response.json().await?;
        Ok(page.records)
    }

}

/// Run `attempt_fn` with bounded retries and exponential backoff on
/// retryable failures (transport errors, 429, 5xx). Backoff: 200ms, 400ms,
/// 800ms... capped at 5s. The last attempt's error is surfaced unchanged,
/// except a request still throttled once retries are exhausted, which
/// becomes [`UpstreamError::RateLimited`].
async fn retry_with_backoff<T, F, Fut>(max_retries: usize, mut attempt_fn: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let base_delay = Duration::from_millis(200);
    let mut attempt: usize = 0;

    loop {
        match attempt_fn().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let delay = (base_delay * 2_u32.pow(attempt as u32)).min(Duration::from_secs(5));
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_retries,
                    "Upstream fetch failed, retrying after {:?}", delay
                );
                attempt += 1;
                sleep(delay).await;
            }
            // Out of retries on a throttled request.
            Err(UpstreamError::Http { status: 429, .. }) => {
                return Err(UpstreamError::RateLimited)
            }
            Err(e) => return Err(e),
        }
    }
}

#[async_trait::async_trait]
impl RecordSource for DataGovClient {
    fn name(&self) -> &str {
        "data.gov.in"
    }

    async fn fetch_records(
        &self,
        state_name: &str,
        fin_year: &str,
    ) -> Result<Vec<UpstreamRecord>> {
        let records = retry_with_backoff(self.config.max_retries, || {
            self.fetch_page(state_name, fin_year)
        })
        .await?;
        tracing::info!(
            state = %state_name,
            fin_year = %fin_year,
            count = records.len(),
            "Fetched upstream records"
        );
        Ok(records)
    }
}
