use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Error;
use crate::providers::http_errors::provider_request_error;
use crate::providers::{TEMPERATURE, TOP_P, upstream_failure};

const PROVIDER: &str = "groq";
const MAX_TOKENS: u32 = 120;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn request_body(model: &str, prompt: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: prompt.to_string(),
        }],
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
        top_p: TOP_P,
    }
}

fn extract_text(response: ChatCompletionResponse) -> Result<String, Error> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(Error::Parse {
            provider: PROVIDER,
            detail: "missing choices[0].message.content".to_string(),
        })
}

pub async fn send(client: &Client, cfg: &Config, prompt: &str) -> Result<String, Error> {
    let api_key = cfg.require_api_key()?;
    let api_url = chat_completions_url(&cfg.base_url);
    debug!(api_url = %api_url, model = %cfg.model, "sending chat completion request");

    let response = client
        .post(&api_url)
        .bearer_auth(api_key)
        .json(&request_body(&cfg.model, prompt))
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, error = %err, "chat completion request failed");
            provider_request_error(err, &api_url, cfg.request_timeout_secs)
        })?;

    if !response.status().is_success() {
        return Err(upstream_failure(PROVIDER, response).await);
    }

    let parsed: ChatCompletionResponse = response.json().await.map_err(|err| Error::Parse {
        provider: PROVIDER,
        detail: err.to_string(),
    })?;
    extract_text(parsed)
}
