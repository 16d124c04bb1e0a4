/// Errors from the upstream data.gov.in API.
///
/// # Examples
///
/// ```rust
/// use nrega_upstream::error::UpstreamError;
///
/// let err = UpstreamError::Config("api_key is empty".to_string());
/// assert!(err.to_string().contains("api_key"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Endpoint or credentials missing/invalid. Raised at client
    /// construction, never mid-sync.
    #[error("upstream configuration error: {0}")]
    Config(String),

    /// Non-2xx status from the resource API.
    #[error("data.gov.in HTTP error: status={status}, body={body}")]
    Http { status: u16, body: String },

    /// Request was throttled (HTTP 429) and retries were exhausted.
    #[error("data.gov.in rate limited, retries exhausted")]
    RateLimited,

    /// Transport-level failure from `reqwest` (DNS, TLS, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Whether another attempt could plausibly succeed: transport errors
    /// and 429/5xx responses. Config errors and other 4xx never retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Network(_) | UpstreamError::RateLimited => true,
            UpstreamError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, UpstreamError>;
