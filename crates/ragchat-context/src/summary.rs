// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The history summary prompt sent to the generator during recall.

use std::collections::BTreeMap;
use std::fmt::Write;

use ragchat_core::{ChatTurn, Topic};

pub const SUMMARY_PREAMBLE: &str = "Please provide a concise summary of the following conversation history. Focus on the key points and important details mentioned.";

/// Render per-topic history into the summary prompt.
pub fn render_summary(history: &BTreeMap<Topic, Vec<ChatTurn>>) -> String {
    let mut out = String::from(SUMMARY_PREAMBLE);
    out.push_str("\n\n");

    for (topic, turns) in history {
        let _ = writeln!(out, "Topic: {topic}");
        out.push_str("Conversation History:\n");
        for turn in turns {
            let _ = writeln!(out, "User ask: {} Bot answer: {}", turn.user, turn.bot);
        }
        out.push('\n');
    }

    out.push_str("Overall Summary:");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_every_turn_under_its_topic() {
        let mut history = BTreeMap::new();
        history.insert(
            Topic::from("Pricing and Promotions"),
            vec![ChatTurn::new("What is the price of X?", "It costs $10")],
        );
        history.insert(
            Topic::from("Company Information"),
            vec![
                ChatTurn::new("Who are you?", "A chatbot"),
                ChatTurn::new("Where?", "Taipei"),
            ],
        );

        let text = render_summary(&history);
        assert!(text.starts_with(SUMMARY_PREAMBLE));
        assert!(text.ends_with("Overall Summary:"));
        assert!(text.contains(
            "Topic: Pricing and Promotions\nConversation History:\nUser ask: What is the price of X? Bot answer: It costs $10\n"
        ));
        assert!(text.contains("User ask: Where? Bot answer: Taipei\n"));
        // BTreeMap ordering keeps the output stable.
        let company = text.find("Topic: Company Information").unwrap();
        let pricing = text.find("Topic: Pricing and Promotions").unwrap();
        assert!(company < pricing);
    }
}
