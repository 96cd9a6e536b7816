// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal output for streamed answers.

use std::io::Write;

use colored::Colorize;
use futures::StreamExt;
use ragchat_agent::ChatStream;
use ragchat_core::ChatChunk;

/// How a streamed answer ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Complete,
    Degraded,
    Interrupted,
}

/// Print chunks as they arrive. Ctrl+C drops the stream, so the turn is
/// not remembered.
pub async fn print_stream(mut stream: ChatStream) -> Outcome {
    let mut outcome = Outcome::Complete;
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut interrupt => {
                println!();
                eprintln!("{}", "interrupted".dimmed());
                return Outcome::Interrupted;
            }
            chunk = stream.next() => match chunk {
                Some(ChatChunk::Text(text)) => {
                    print!("{text}");
                    std::io::stdout().flush().ok();
                }
                Some(ChatChunk::GenerationError(message)) => {
                    println!();
                    eprintln!("{}: {message}", "answer incomplete".red());
                    outcome = Outcome::Degraded;
                }
                Some(ChatChunk::PersistenceError(message)) => {
                    eprintln!("{}: {message}", "not remembered".yellow());
                }
                None => break,
            },
        }
    }

    println!();
    outcome
}
