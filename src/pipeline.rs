use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Error;
use crate::prompt::{self, PromptConfig};
use crate::prompt_store::PromptStore;
use crate::providers;
use crate::retry::RetryPolicy;

/// One inbound reply request. Read-only once constructed; only the image
/// count matters, not the image contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub tweet_text: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_tone")]
    pub tone: String,
}

fn default_tone() -> String {
    "bullish".to_string()
}

/// The only externally observable output shape of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self {
            success: true,
            reply: Some(reply.into()),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            reply: None,
            error: Some(message.into()),
        }
    }
}

pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<String, Error>> + 'a>>;

pub trait ReplyBackend {
    fn send<'a>(&'a self, client: &'a Client, cfg: &'a Config, prompt: &'a str)
    -> BackendFuture<'a>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderBackend;

impl ReplyBackend for ProviderBackend {
    fn send<'a>(
        &'a self,
        client: &'a Client,
        cfg: &'a Config,
        prompt: &'a str,
    ) -> BackendFuture<'a> {
        Box::pin(providers::send(client, cfg, prompt))
    }
}

/// Orchestrates one generation: credential check, input validation, fresh
/// prompt-config load, prompt build, retried provider call, normalization.
/// Errors never escape `generate`; the caller always gets a well-formed
/// result.
pub struct ReplyPipeline<'a, B = ProviderBackend> {
    client: &'a Client,
    cfg: &'a Config,
    store: PromptStore,
    retry: RetryPolicy,
    backend: B,
}

impl<'a> ReplyPipeline<'a, ProviderBackend> {
    pub fn new(client: &'a Client, cfg: &'a Config) -> Self {
        Self {
            client,
            cfg,
            store: PromptStore::new(&cfg.prompt_config_path),
            retry: RetryPolicy::default(),
            backend: ProviderBackend,
        }
    }
}

impl<'a, B> ReplyPipeline<'a, B>
where
    B: ReplyBackend,
{
    #[cfg(test)]
    fn with_backend(
        client: &'a Client,
        cfg: &'a Config,
        store: PromptStore,
        retry: RetryPolicy,
        backend: B,
    ) -> Self {
        Self {
            client,
            cfg,
            store,
            retry,
            backend,
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        match self.try_generate(request).await {
            Ok(reply) => {
                debug!(reply_len = reply.len(), "generated reply");
                GenerationResult::ok(reply)
            }
            Err(err) => {
                warn!(error = %err, "reply generation failed");
                GenerationResult::err(err.to_string())
            }
        }
    }

    async fn try_generate(&self, request: &GenerationRequest) -> Result<String, Error> {
        // Credential check comes first so a misconfigured deployment fails
        // before any network traffic.
        self.cfg.require_api_key()?;

        if request.tweet_text.trim().is_empty() {
            return Err(Error::Validation(
                "tweetText must not be empty".to_string(),
            ));
        }

        // Reloaded on every call so settings edits apply to the next
        // generation without a restart.
        let prompt_config = self.store.load();
        let prompt = prompt::build_prompt(request, &prompt_config);
        debug!(
            tone = %request.tone,
            image_count = request.images.len(),
            prompt_len = prompt.len(),
            "built generation prompt"
        );

        let raw = self
            .retry
            .run(|| self.backend.send(self.client, self.cfg, &prompt))
            .await?;
        Ok(providers::normalize_reply(&raw))
    }

    /// Current persisted prompt settings (the settings-page read surface).
    pub fn prompt_config(&self) -> PromptConfig {
        self.store.load()
    }

    /// Persists new prompt settings; takes effect on the next generation.
    pub fn set_prompt_config(&self, config: &PromptConfig) -> Result<(), Error> {
        self.store.save(config)
    }
}
