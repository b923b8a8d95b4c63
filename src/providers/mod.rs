pub mod anthropic;
pub mod gemini;
mod http_errors;
pub mod openai;

use reqwest::{Client, Response};
use tracing::{debug, warn};

use crate::config::{Config, ProviderStyle};
use crate::error::Error;

/// Generation parameters shared by every provider style.
pub(crate) const TEMPERATURE: f64 = 0.9;
pub(crate) const TOP_P: f64 = 0.95;

/// Sends the assembled prompt to the configured provider and returns the raw
/// generated text. Which shape is used is fixed by deployment configuration.
pub async fn send(client: &Client, cfg: &Config, prompt: &str) -> Result<String, Error> {
    debug!(
        provider = cfg.provider.as_str(),
        model = %cfg.model,
        prompt_len = prompt.len(),
        "dispatching generation request"
    );

    match cfg.provider {
        ProviderStyle::Gemini => gemini::send(client, cfg, prompt).await,
        ProviderStyle::OpenAiCompat => openai::send(client, cfg, prompt).await,
        ProviderStyle::Anthropic => anthropic::send(client, cfg, prompt).await,
    }
}

/// Trims surrounding whitespace and at most one pair of matching enclosing
/// quote characters. The text is never sanitized beyond that.
pub fn normalize_reply(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last))
            if first == last && (first == '"' || first == '\'') =>
        {
            trimmed[first.len_utf8()..trimmed.len() - last.len_utf8()]
                .trim()
                .to_string()
        }
        _ => trimmed.to_string(),
    }
}

pub(crate) async fn upstream_failure(provider: &'static str, response: Response) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read response body>".to_string());
    warn!(
        provider,
        status = %status,
        response_body_len = body.len(),
        "provider returned non-success status"
    );
    Error::Upstream {
        provider,
        status: status.as_u16(),
        body,
    }
}
