use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Error;
use crate::providers::http_errors::provider_request_error;
use crate::providers::{TEMPERATURE, TOP_P, upstream_failure};

const PROVIDER: &str = "anthropic";
const MAX_TOKENS: u32 = 140;
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    messages: Vec<MessageParam>,
}

#[derive(Debug, Serialize)]
struct MessageParam {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

fn messages_url(base_url: &str) -> String {
    format!("{}/v1/messages", base_url.trim_end_matches('/'))
}

fn request_body(model: &str, prompt: &str) -> MessagesRequest {
    MessagesRequest {
        model: model.to_string(),
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
        top_p: TOP_P,
        messages: vec![MessageParam {
            role: "user",
            content: prompt.to_string(),
        }],
    }
}

fn extract_text(response: MessagesResponse) -> Result<String, Error> {
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or(Error::Parse {
            provider: PROVIDER,
            detail: "missing content[0].text".to_string(),
        })
}

pub async fn send(client: &Client, cfg: &Config, prompt: &str) -> Result<String, Error> {
    let api_key = cfg.require_api_key()?;
    let api_url = messages_url(&cfg.base_url);
    debug!(api_url = %api_url, model = %cfg.model, "sending anthropic messages request");

    let response = client
        .post(&api_url)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .json(&request_body(&cfg.model, prompt))
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, error = %err, "anthropic request failed");
            provider_request_error(err, &api_url, cfg.request_timeout_secs)
        })?;

    if !response.status().is_success() {
        return Err(upstream_failure(PROVIDER, response).await);
    }

    let parsed: MessagesResponse = response.json().await.map_err(|err| Error::Parse {
        provider: PROVIDER,
        detail: err.to_string(),
    })?;
    extract_text(parsed)
}
