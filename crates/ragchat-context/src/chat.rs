// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The answer prompt: instructions, summarized history, retrieved context,
//! and the user's question.

use std::fmt::Write;

pub const INSTRUCTIONS_HEADER: &str = "Instructions:";
pub const HISTORY_HEADER: &str = "Conversation History:";
pub const RETRIEVAL_HEADER: &str = "Retriever's Information:";

/// Inputs for one answer prompt. Consumed immediately, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptAssembly {
    pub instructions: Vec<String>,
    pub conversation_summary: Option<String>,
    pub retrieved_context: Option<String>,
    pub question: String,
}

impl PromptAssembly {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Default::default()
        }
    }

    pub fn with_instructions(mut self, instructions: Vec<String>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.conversation_summary = summary;
        self
    }

    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.retrieved_context = context;
        self
    }

    /// Render the prompt text.
    ///
    /// Each optional section is emitted only when it has content; an empty
    /// string counts as absent.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if !self.instructions.is_empty() {
            out.push_str(INSTRUCTIONS_HEADER);
            out.push('\n');
            for inst in &self.instructions {
                let _ = writeln!(out, "- {inst}");
            }
            out.push('\n');
        }

        if let Some(summary) = non_empty(&self.conversation_summary) {
            let _ = write!(out, "{HISTORY_HEADER}\n{summary}\n\n");
        }

        if let Some(context) = non_empty(&self.retrieved_context) {
            let _ = write!(out, "{RETRIEVAL_HEADER}\n{context}\n\n");
        }

        let _ = write!(out, "Question: {}\nAnswer:", self.question);
        out
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bare_question_has_no_optional_sections() {
        let text = PromptAssembly::new("Q").render();
        assert!(text.contains("Question: Q"));
        assert!(!text.contains(INSTRUCTIONS_HEADER));
        assert!(!text.contains(HISTORY_HEADER));
        assert!(!text.contains(RETRIEVAL_HEADER));
        assert_eq!(text, "Question: Q\nAnswer:");
    }

    #[test]
    fn full_assembly_renders_sections_in_order() {
        let text = PromptAssembly::new("Who sells 3TE7?")
            .with_instructions(vec!["Answer in English".into(), "Be polite".into()])
            .with_summary(Some("Jay sells 3TE7.".into()))
            .with_context(Some("3TE7 is an SSD.".into()))
            .render();

        let expected = "Instructions:\n- Answer in English\n- Be polite\n\n\
                        Conversation History:\nJay sells 3TE7.\n\n\
                        Retriever's Information:\n3TE7 is an SSD.\n\n\
                        Question: Who sells 3TE7?\nAnswer:";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let text = PromptAssembly::new("Q")
            .with_summary(Some(String::new()))
            .with_context(Some("  ".into()))
            .render();
        assert_eq!(text, "Question: Q\nAnswer:");
    }

    proptest! {
        #[test]
        fn sections_present_iff_content(
            question in "[a-zA-Z ?]{1,40}",
            instructions in proptest::collection::vec("[a-z]{1,10}", 0..4),
            summary in proptest::option::of("[a-z]{1,20}"),
            context in proptest::option::of("[a-z]{1,20}"),
        ) {
            let text = PromptAssembly {
                instructions: instructions.clone(),
                conversation_summary: summary.clone(),
                retrieved_context: context.clone(),
                question: question.clone(),
            }
            .render();

            let question_line = format!("Question: {question}\nAnswer:");
            prop_assert!(text.ends_with(&question_line));
            prop_assert_eq!(text.contains(INSTRUCTIONS_HEADER), !instructions.is_empty());
            prop_assert_eq!(text.contains(HISTORY_HEADER), summary.is_some());
            prop_assert_eq!(text.contains(RETRIEVAL_HEADER), context.is_some());
        }
    }
}
