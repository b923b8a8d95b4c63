use reqwest::StatusCode;

/// Errors raised inside the reply pipeline. Everything here is caught at the
/// pipeline boundary and turned into a `GenerationResult` with
/// `success: false`; nothing propagates past `ReplyPipeline::generate`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("{provider} request failed with status {status}: {body}")]
    Upstream {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("rate limited on every attempt, giving up: {body}")]
    RateLimitExceeded { body: String },

    #[error("Failed to parse {provider} response: {detail}")]
    Parse {
        provider: &'static str,
        detail: String,
    },

    #[error(
        "Request timed out after {secs}s while calling '{url}'. \
         Increase REPLY_TIMEOUT_SECS or check provider responsiveness."
    )]
    Timeout { url: String, secs: u64 },

    #[error("Failed to reach provider API at '{url}': {detail}")]
    Connect { url: String, detail: String },

    #[error("Failed to persist prompt configuration to '{path}': {detail}")]
    Storage { path: String, detail: String },
}

impl Error {
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            Error::Upstream { status, .. } if *status == StatusCode::TOO_MANY_REQUESTS.as_u16()
        )
    }
}
