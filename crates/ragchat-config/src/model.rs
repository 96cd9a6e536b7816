// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the ragchat backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! rejected at startup instead of silently falling back to a default.

use std::time::Duration;

use ragchat_core::Topic;
use serde::{Deserialize, Serialize};

/// Top-level ragchat configuration.
///
/// Every section is optional and falls back to the values the chatbot
/// ships with.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RagchatConfig {
    /// Agent identity, greeting, and fixed system instructions.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Topic vocabulary used by the classifier and short-term memory.
    #[serde(default)]
    pub topics: TopicsConfig,

    /// Short-term memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Ollama generation and text embedding settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Classifier and image embedding service settings.
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Vector store settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Remote call timeouts.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Agent identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name the chatbot introduces itself with.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Greeting inserted as the first system message of every request, if set.
    #[serde(default)]
    pub greeting: Option<String>,

    /// System messages sent ahead of every assembled prompt.
    #[serde(default = "default_system_instructions")]
    pub system_instructions: Vec<String>,

    /// Question recorded when an image is described, and the prompt used
    /// for image-only requests.
    #[serde(default = "default_image_prompt")]
    pub image_prompt: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            greeting: None,
            system_instructions: default_system_instructions(),
            image_prompt: default_image_prompt(),
        }
    }
}

fn default_agent_name() -> String {
    "iVIT-Chatbot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_system_instructions() -> Vec<String> {
    vec![
        format!("You are a chatbot which name {}", default_agent_name()),
        "If user didn't ask for for more detail please answer question within 100 words"
            .to_string(),
        "If you don't know just tell user I don't know".to_string(),
    ]
}

fn default_image_prompt() -> String {
    "What is it?".to_string()
}

/// Topic vocabulary configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TopicsConfig {
    /// Fixed set of topics. Memory buckets exist for exactly these.
    #[serde(default = "default_vocabulary")]
    pub vocabulary: Vec<String>,

    /// Number of topics requested from the classifier.
    #[serde(default = "default_topics_top_k")]
    pub top_k: usize,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            vocabulary: default_vocabulary(),
            top_k: default_topics_top_k(),
        }
    }
}

impl TopicsConfig {
    /// The vocabulary as typed topics.
    pub fn topics(&self) -> Vec<Topic> {
        self.vocabulary.iter().map(|t| Topic::new(t.clone())).collect()
    }
}

fn default_vocabulary() -> Vec<String> {
    [
        "Product Information",
        "Pricing and Promotions",
        "Purchasing and Orders",
        "After-sales Service",
        "Company Information",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_topics_top_k() -> usize {
    3
}

/// Short-term memory configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Maximum turns kept per topic.
    #[serde(default = "default_short_term_limit")]
    pub short_term_limit: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_limit: default_short_term_limit(),
        }
    }
}

fn default_short_term_limit() -> usize {
    20
}

/// Ollama runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Chat model used for answers and history summaries.
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Model used for text embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Cap on generated tokens per answer (`num_predict`).
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Pull both models from the registry at startup.
    #[serde(default)]
    pub pull_on_start: bool,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            generation_model: default_generation_model(),
            embedding_model: default_embedding_model(),
            max_tokens: default_max_tokens(),
            pull_on_start: false,
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_generation_model() -> String {
    "llama3.1".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm:latest".to_string()
}

fn default_max_tokens() -> u32 {
    350
}

/// Model-serving endpoints for classification and image embeddings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InferenceConfig {
    /// Base URL of the topic classification service.
    #[serde(default = "default_inference_url")]
    pub base_url: String,

    /// Base URL of the image embedding service.
    #[serde(default = "default_image_url")]
    pub image_base_url: String,

    /// Model name the classification service must report as loaded.
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Model name the image service must report as loaded.
    #[serde(default = "default_image_model")]
    pub image_model: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_inference_url(),
            image_base_url: default_image_url(),
            classifier_model: default_classifier_model(),
            image_model: default_image_model(),
        }
    }
}

fn default_inference_url() -> String {
    "http://localhost:8887".to_string()
}

fn default_image_url() -> String {
    "http://localhost:8889".to_string()
}

fn default_classifier_model() -> String {
    "bart".to_string()
}

fn default_image_model() -> String {
    "clip".to_string()
}

/// Vector store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Path to the SQLite database holding documents and image vectors.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Documents returned (and concatenated) per text query.
    #[serde(default = "default_text_top_k")]
    pub text_top_k: usize,

    /// Neighbours returned per image query.
    #[serde(default = "default_image_top_k")]
    pub image_top_k: usize,

    /// Expected length of text embedding vectors.
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Expected length of image embedding vectors.
    #[serde(default = "default_image_dimension")]
    pub image_dimension: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            text_top_k: default_text_top_k(),
            image_top_k: default_image_top_k(),
            embedding_dimension: default_embedding_dimension(),
            image_dimension: default_image_dimension(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ragchat").join("ragchat.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("ragchat.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_text_top_k() -> usize {
    2
}

fn default_image_top_k() -> usize {
    1
}

fn default_embedding_dimension() -> usize {
    384
}

fn default_image_dimension() -> usize {
    512
}

/// Timeouts applied to every remote call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutConfig {
    #[serde(default = "default_connect_secs")]
    pub connect_secs: u64,

    /// Bound on unary calls (classify, embed, health).
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,

    /// Longest silence tolerated between two generation chunks.
    #[serde(default = "default_stream_idle_secs")]
    pub stream_idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: default_connect_secs(),
            request_secs: default_request_secs(),
            stream_idle_secs: default_stream_idle_secs(),
        }
    }
}

impl TimeoutConfig {
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn stream_idle(&self) -> Duration {
        Duration::from_secs(self.stream_idle_secs)
    }
}

fn default_connect_secs() -> u64 {
    5
}

fn default_request_secs() -> u64 {
    60
}

fn default_stream_idle_secs() -> u64 {
    120
}
