// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt template engine.
//!
//! Renders the two prompts the chatbot sends to its generator:
//! - the **answer prompt**, with optional instruction, history, and
//!   retrieval sections ahead of the question ([`PromptAssembly`]);
//! - the **summary prompt**, listing short-term history per topic
//!   ([`render_summary`]).
//!
//! [`PromptEngine`] wraps the answer prompt in the final message list.

pub mod chat;
pub mod summary;

use ragchat_config::model::AgentConfig;
use ragchat_core::ChatMessage;

pub use chat::PromptAssembly;
pub use summary::render_summary;

/// Builds the message list for a generation request.
#[derive(Debug, Clone)]
pub struct PromptEngine {
    system_instructions: Vec<String>,
}

impl PromptEngine {
    pub fn new(system_instructions: Vec<String>) -> Self {
        Self {
            system_instructions,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.system_instructions.clone())
    }

    /// The fixed system messages sent with every answer.
    pub fn system_instructions(&self) -> &[String] {
        &self.system_instructions
    }

    /// Render `assembly` and wrap it as the final user message.
    ///
    /// Order: greeting (if any), each system instruction, then the prompt.
    pub fn build_messages(
        &self,
        assembly: &PromptAssembly,
        greeting: Option<&str>,
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.system_instructions.len() + 2);
        if let Some(greeting) = greeting.filter(|g| !g.is_empty()) {
            messages.push(ChatMessage::system(greeting));
        }
        messages.extend(
            self.system_instructions
                .iter()
                .map(|inst| ChatMessage::system(inst.as_str())),
        );

        let prompt = assembly.render();
        tracing::debug!(prompt_len = prompt.len(), "assembled answer prompt");
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_core::Role;

    #[test]
    fn messages_follow_greeting_instructions_prompt_order() {
        let engine = PromptEngine::from_config(&AgentConfig::default());
        let messages = engine.build_messages(&PromptAssembly::new("hi"), Some("Welcome!"));

        assert_eq!(messages.len(), 5);
        assert_eq!(messages[0], ChatMessage::system("Welcome!"));
        assert!(messages[1..4].iter().all(|m| m.role == Role::System));
        assert_eq!(messages[1].content, "You are a chatbot which name iVIT-Chatbot");
        assert_eq!(messages[4].role, Role::User);
        assert_eq!(messages[4].content, "Question: hi\nAnswer:");
    }

    #[test]
    fn no_greeting_means_instructions_first() {
        let engine = PromptEngine::new(vec!["Be brief".into()]);
        let messages = engine.build_messages(&PromptAssembly::new("hi"), None);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system("Be brief"));
    }
}
