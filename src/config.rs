use std::env;
use std::path::PathBuf;

use crate::error::Error;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROMPT_CONFIG_PATH: &str = "prompt_config.json";
const DEFAULT_TONE: &str = "bullish";

/// Which upstream request/response shape is active. Fixed per deployment,
/// never chosen by request data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStyle {
    Gemini,
    OpenAiCompat,
    Anthropic,
}

impl ProviderStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAiCompat => "groq",
            Self::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding the API credential for this provider.
    pub fn credential_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
            Self::OpenAiCompat => "GROQ_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "models/gemini-flash-latest",
            Self::OpenAiCompat => "llama-3.1-8b-instant",
            Self::Anthropic => "claude-sonnet-4-20250514",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::OpenAiCompat => "https://api.groq.com/openai/v1",
            Self::Anthropic => "https://api.anthropic.com",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderStyle,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub prompt_config_path: PathBuf,
    pub default_tone: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let provider = parse_provider(get_var("REPLY_PROVIDER").as_deref());
        let api_key = get_var(provider.credential_var())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            provider,
            api_key,
            model: get_var("REPLY_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            base_url: get_var("REPLY_BASE_URL")
                .unwrap_or_else(|| provider.default_base_url().to_string()),
            request_timeout_secs: parse_request_timeout_secs(
                get_var("REPLY_TIMEOUT_SECS").as_deref(),
            ),
            prompt_config_path: parse_prompt_config_path(get_var("PROMPT_CONFIG_PATH").as_deref()),
            default_tone: get_var("REPLY_TONE")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_TONE.to_string()),
        }
    }

    /// Returns the configured credential, or a `Configuration` error whose
    /// message names the exact variable the operator must set.
    pub fn require_api_key(&self) -> Result<&str, Error> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::Configuration(format!(
                "{var} is not set. Export {var} and retry.",
                var = self.provider.credential_var()
            ))
        })
    }
}

fn parse_provider(raw: Option<&str>) -> ProviderStyle {
    match raw.unwrap_or("gemini").trim().to_ascii_lowercase().as_str() {
        "groq" | "openai" => ProviderStyle::OpenAiCompat,
        "anthropic" | "claude" => ProviderStyle::Anthropic,
        _ => ProviderStyle::Gemini,
    }
}

fn parse_request_timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
}

fn parse_prompt_config_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPT_CONFIG_PATH))
}
