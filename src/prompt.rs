use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::pipeline::GenerationRequest;

/// At most this many few-shot examples make it into a prompt, regardless of
/// how many are stored.
pub const MAX_PROMPT_EXAMPLES: usize = 3;

/// Operator-editable prompt settings, persisted by `PromptStore` and reloaded
/// on every generation so edits apply to the very next call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    pub custom_prompt_text: String,
    pub examples: Vec<ReplyExample>,
}

/// One stored tweet/reply pair used to steer model output style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReplyExample {
    pub tweet_excerpt: String,
    pub reply_example: String,
}

/// Assembles the full generation prompt. Deterministic, always succeeds,
/// section order is fixed: framing, tweet, image note, tone, style
/// guidelines, examples, hard constraints.
pub fn build_prompt(request: &GenerationRequest, config: &PromptConfig) -> String {
    let mut prompt = format!(
        "You are an expert at crafting viral X (Twitter) replies for crypto and Polymarket content.\n\
         \n\
         TWEET TO REPLY TO:\n\
         \"{}\"\n",
        request.tweet_text
    );

    if !request.images.is_empty() {
        let _ = write!(
            prompt,
            "\nThe tweet contains {} image(s). Consider visual context in your reply.\n",
            request.images.len()
        );
    }

    let _ = write!(prompt, "\nTONE: {}\n", request.tone);

    if !config.custom_prompt_text.trim().is_empty() {
        let _ = write!(
            prompt,
            "\nSTYLE GUIDELINES:\n{}\n",
            config.custom_prompt_text
        );
    }

    if !config.examples.is_empty() {
        prompt.push_str("\nEXAMPLES OF GOOD REPLIES:\n");
        for example in config.examples.iter().take(MAX_PROMPT_EXAMPLES) {
            let _ = write!(
                prompt,
                "Tweet: \"{}\"\nReply: \"{}\"\n",
                example.tweet_excerpt, example.reply_example
            );
        }
    }

    let _ = write!(
        prompt,
        "\nGenerate ONE perfect reply. The reply must:\n\
         - Be SHORT (1-2 sentences max, preferably 1)\n\
         - Use the {tone} tone\n\
         - Create EMOTION (curiosity, excitement, FOMO, intrigue, controversy)\n\
         - AVOID: emojis, dots, brackets, parentheses, these words: profit, bet, money, gamble, betting, gambling, wager, odds\n\
         - Focus on: prediction markets, forecasting, events, outcomes, market wisdom, collective intelligence\n\
         - HOOK the reader to reply back or follow for more\n\
         - Be conversational and natural\n\
         - Use questions strategically to boost engagement\n\
         \n\
         Return ONLY the reply text, nothing else. No quotes, no preamble, just the reply.",
        tone = request.tone
    );

    prompt
}
