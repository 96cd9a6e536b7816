// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ragchat shell` command implementation.
//!
//! Interactive REPL with a colored prompt, streamed answers and readline
//! history. Slash commands edit the live agent's standing instructions.

use std::path::Path;

use colored::Colorize;
use ragchat_agent::Agent;
use ragchat_core::{ConversationRequest, RagError, UserHandle};
use ragchat_memory::InstructionSelector;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::app::load_image;
use crate::render::print_stream;

const HELP: &str = "\
/instruction add <text>         add a standing instruction
/instruction list               show standing instructions
/instruction delete <n|text>    remove one by position or exact text
/image <path> [question]        ask about an image
/history                        show remembered turns per topic
/quit                           leave the shell";

pub async fn run_shell(agent: &Agent, user: UserHandle) -> Result<(), RagError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| RagError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "ragchat shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let mut greeting = agent.settings().greeting.clone();
    let prompt = format!("{}> ", "ragchat".green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed == "/quit" || trimmed == "/exit" {
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let result = if let Some(command) = trimmed.strip_prefix('/') {
                    handle_command(agent, &user, command).await
                } else {
                    let mut request = ConversationRequest::new(trimmed).with_user(user.clone());
                    if let Some(greeting) = greeting.take() {
                        request = request.with_greeting(greeting);
                    }
                    ask(agent, request).await
                };
                if let Err(e) = result {
                    eprintln!("{}: {e}", "error".red());
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

async fn ask(agent: &Agent, request: ConversationRequest) -> Result<(), RagError> {
    let stream = agent.chat(request).await?;
    print_stream(stream).await;
    Ok(())
}

async fn handle_command(agent: &Agent, user: &UserHandle, command: &str) -> Result<(), RagError> {
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    let rest = rest.trim();

    match name {
        "help" => println!("{HELP}"),
        "instruction" => {
            let (action, arg) = rest.split_once(' ').unwrap_or((rest, ""));
            let arg = arg.trim();
            match action {
                "add" if !arg.is_empty() => {
                    agent.add_instruction(arg)?;
                    println!("{}", "added".dimmed());
                }
                "list" | "" => print_instructions(&agent.instructions()?),
                "delete" if !arg.is_empty() => {
                    let removed = agent.delete_instruction(parse_selector(arg))?;
                    println!("{} {removed}", "removed".dimmed());
                }
                _ => {
                    return Err(RagError::InvalidArgument(format!(
                        "usage: /instruction add|list|delete, got `{rest}`"
                    )));
                }
            }
        }
        "image" => {
            let (path, question) = rest.split_once(' ').unwrap_or((rest, ""));
            if path.is_empty() {
                return Err(RagError::InvalidArgument("usage: /image <path> [question]".into()));
            }
            let image = load_image(Path::new(path)).await?;
            let request = ConversationRequest::new(question.trim())
                .with_user(user.clone())
                .with_attachment(image);
            ask(agent, request).await?;
        }
        "history" => {
            for (topic, turns) in agent.memory().short_term().get(None)? {
                println!("{} ({})", topic.as_str().bold(), turns.len());
                for turn in turns {
                    println!("  {} {}", "user:".dimmed(), turn.user);
                    println!("  {} {}", "bot: ".dimmed(), turn.bot);
                }
            }
        }
        other => {
            return Err(RagError::InvalidArgument(format!(
                "unknown command `/{other}`, try /help"
            )));
        }
    }
    Ok(())
}

/// A bare number selects by position; anything else by exact text.
pub fn parse_selector(arg: &str) -> InstructionSelector {
    match arg.parse::<usize>() {
        Ok(idx) => InstructionSelector::Index(idx),
        Err(_) => InstructionSelector::Value(arg.to_string()),
    }
}

pub fn print_instructions(instructions: &[String]) {
    if instructions.is_empty() {
        println!("{}", "no standing instructions".dimmed());
    }
    for (idx, instruction) in instructions.iter().enumerate() {
        println!("  {} {instruction}", format!("[{idx}]").dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_select_by_index() {
        assert_eq!(parse_selector("2"), InstructionSelector::Index(2));
        assert_eq!(
            parse_selector("Be brief."),
            InstructionSelector::Value("Be brief.".into())
        );
    }
}
