use nrega_common::fiscal::FinYear;
use nrega_upstream::DataGovConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// CORS allowed origins; empty allows all origins (development mode).
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub upstream: DataGovConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Run one sync for (default_state, default_fin_year) on startup.
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
    /// State used when a sync trigger names none.
    #[serde(default = "default_state_name")]
    pub default_state: String,
    /// Fiscal year used when a sync trigger names none.
    #[serde(default = "default_fin_year")]
    pub default_fin_year: String,
    /// The single fiscal year the report read path is pinned to.
    #[serde(default = "default_fin_year")]
    pub report_fin_year: String,
    /// Concurrency cap for per-record upserts within one sync.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            run_on_startup: default_run_on_startup(),
            default_state: default_state_name(),
            default_fin_year: default_fin_year(),
            report_fin_year: default_fin_year(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

fn default_http_port() -> u16 {
    5000
}

fn default_db_url() -> String {
    "sqlite://data/nrega.db?mode=rwc".to_string()
}

fn default_run_on_startup() -> bool {
    true
}

fn default_state_name() -> String {
    "UTTAR PRADESH".to_string()
}

fn default_fin_year() -> String {
    "2024-2025".to_string()
}

fn default_max_concurrent() -> usize {
    8
}

/// Config problems detected once at startup. Anything listed here aborts the
/// process before the first network or database operation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("sync.default_fin_year: {0}")]
    BadDefaultFinYear(nrega_common::fiscal::FinYearParseError),
    #[error("sync.report_fin_year: {0}")]
    BadReportFinYear(nrega_common::fiscal::FinYearParseError),
    #[error("sync.default_state is empty")]
    EmptyDefaultState,
    #[error("sync.max_concurrent must be at least 1")]
    ZeroConcurrency,
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate everything except upstream credentials, which
    /// `DataGovClient::new` checks when the client is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sync
            .default_fin_year
            .parse::<FinYear>()
            .map_err(ConfigError::BadDefaultFinYear)?;
        self.sync
            .report_fin_year
            .parse::<FinYear>()
            .map_err(ConfigError::BadReportFinYear)?;
        if self.sync.default_state.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultState);
        }
        if self.sync.max_concurrent == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config: ServerConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.http_port, 5000);
        assert_eq!(config.sync.default_state, "UTTAR PRADESH");
        config.validate().expect("defaults should validate");
    }

    #[test]
    fn bad_fiscal_year_is_rejected() {
        let config: ServerConfig = toml::from_str(
            "[sync]\nreport_fin_year = \"2024\"\n",
        )
        .expect("config should parse");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadReportFinYear(_))
        ));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config: ServerConfig =
            toml::from_str("[sync]\nmax_concurrent = 0\n").expect("config should parse");
        assert!(matches!(config.validate(), Err(ConfigError::ZeroConcurrency)));
    }
}
