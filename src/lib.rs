pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod prompt_store;
pub mod providers;
pub mod retry;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use std::env;
use tracing::info;

use config::Config;
use pipeline::{GenerationRequest, ReplyPipeline};

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Config::from_env();
    info!(
        provider = cfg.provider.as_str(),
        model = %cfg.model,
        base_url = %cfg.base_url,
        timeout_secs = cfg.request_timeout_secs,
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        bail!("usage: chirp <tweet text>");
    }

    let request = GenerationRequest {
        tweet_text: args.join(" "),
        images: Vec::new(),
        tone: cfg.default_tone.clone(),
    };

    let pipeline = ReplyPipeline::new(&client, &cfg);
    let result = pipeline.generate(&request).await;
    match result.reply {
        Some(reply) => {
            println!("{}", reply.trim());
            Ok(())
        }
        None => bail!(
            "{}",
            result
                .error
                .unwrap_or_else(|| "reply generation failed".to_string())
        ),
    }
}
