// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use ragchat_config::RagchatConfig;

/// Per-turn knobs the agent reads on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSettings {
    /// How many topics the classifier may return.
    pub topic_top_k: usize,
    /// Token cap for the answer.
    pub max_tokens: u32,
    /// Stand-in prompt for image-only requests.
    pub image_prompt: String,
    /// Greeting used when the request carries none.
    pub greeting: Option<String>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self::from_config(&RagchatConfig::default())
    }
}

impl AgentSettings {
    pub fn from_config(config: &RagchatConfig) -> Self {
        Self {
            topic_top_k: config.topics.top_k,
            max_tokens: config.ollama.max_tokens,
            image_prompt: config.agent.image_prompt.clone(),
            greeting: config.agent.greeting.clone(),
        }
    }
}
