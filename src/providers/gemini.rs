use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Error;
use crate::providers::http_errors::provider_request_error;
use crate::providers::{TEMPERATURE, TOP_P, upstream_failure};

const PROVIDER: &str = "gemini";
const MAX_OUTPUT_TOKENS: u32 = 150;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn generate_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn request_body(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
            top_p: TOP_P,
        },
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, Error> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(Error::Parse {
            provider: PROVIDER,
            detail: "missing candidates[0].content.parts[0].text".to_string(),
        })
}

pub async fn send(client: &Client, cfg: &Config, prompt: &str) -> Result<String, Error> {
    let api_key = cfg.require_api_key()?;
    let api_url = generate_url(&cfg.base_url, &cfg.model);
    debug!(api_url = %api_url, model = %cfg.model, "sending gemini generateContent request");

    // The key travels as a query parameter, kept out of the logged URL.
    let response = client
        .post(&api_url)
        .query(&[("key", api_key)])
        .json(&request_body(prompt))
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .send()
        .await
        .map_err(|err| {
            warn!(api_url = %api_url, error = %err, "gemini request failed");
            provider_request_error(err, &api_url, cfg.request_timeout_secs)
        })?;

    if !response.status().is_success() {
        return Err(upstream_failure(PROVIDER, response).await);
    }

    let parsed: GenerateContentResponse = response.json().await.map_err(|err| Error::Parse {
        provider: PROVIDER,
        detail: err.to_string(),
    })?;
    extract_text(parsed)
}
