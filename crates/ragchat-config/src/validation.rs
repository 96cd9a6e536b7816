// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::RagchatConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of failing on the first.
pub fn validate_config(config: &RagchatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.agent.image_prompt.trim().is_empty() {
        fail("agent.image_prompt must not be empty".to_string());
    }

    if config.topics.vocabulary.is_empty() {
        fail("topics.vocabulary must contain at least one topic".to_string());
    }

    let mut seen = HashSet::new();
    for (i, topic) in config.topics.vocabulary.iter().enumerate() {
        if topic.trim().is_empty() {
            fail(format!("topics.vocabulary[{i}] must not be empty"));
        } else if !seen.insert(topic.as_str()) {
            fail(format!("duplicate topic `{topic}` in topics.vocabulary"));
        }
    }

    if config.topics.top_k == 0 {
        fail("topics.top_k must be at least 1".to_string());
    }

    if config.memory.short_term_limit == 0 {
        fail("memory.short_term_limit must be at least 1".to_string());
    }

    for (key, value) in [
        ("ollama.base_url", &config.ollama.base_url),
        ("inference.base_url", &config.inference.base_url),
        ("inference.image_base_url", &config.inference.image_base_url),
    ] {
        if let Err(e) = url::Url::parse(value) {
            fail(format!("{key} `{value}` is not a valid URL: {e}"));
        }
    }

    for (key, value) in [
        ("ollama.generation_model", &config.ollama.generation_model),
        ("ollama.embedding_model", &config.ollama.embedding_model),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if config.ollama.max_tokens == 0 {
        fail("ollama.max_tokens must be at least 1".to_string());
    }

    if config.retrieval.database_path.trim().is_empty() {
        fail("retrieval.database_path must not be empty".to_string());
    }

    for (key, value) in [
        ("retrieval.text_top_k", config.retrieval.text_top_k),
        ("retrieval.image_top_k", config.retrieval.image_top_k),
        ("retrieval.embedding_dimension", config.retrieval.embedding_dimension),
        ("retrieval.image_dimension", config.retrieval.image_dimension),
    ] {
        if value == 0 {
            fail(format!("{key} must be at least 1"));
        }
    }

    for (key, value) in [
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.stream_idle_secs", config.timeouts.stream_idle_secs),
    ] {
        if value == 0 {
            fail(format!("{key} must be greater than zero"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&RagchatConfig::default()).is_ok());
    }

    #[test]
    fn duplicate_topic_fails() {
        let mut config = RagchatConfig::default();
        config.topics.vocabulary.push("Company Information".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("duplicate topic")));
    }

    #[test]
    fn zero_limits_collect_all_errors() {
        let mut config = RagchatConfig::default();
        config.memory.short_term_limit = 0;
        config.timeouts.stream_idle_secs = 0;
        config.retrieval.text_top_k = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn bad_url_fails() {
        let mut config = RagchatConfig::default();
        config.ollama.base_url = "not a url".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors).iter().any(|m| m.contains("ollama.base_url")));
    }

    #[test]
    fn unknown_log_level_fails() {
        let mut config = RagchatConfig::default();
        config.agent.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }
}
