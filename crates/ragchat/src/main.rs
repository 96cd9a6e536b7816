// SPDX-FileCopyrightText: 2026 Ragchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ragchat - a retrieval-augmented customer service chatbot.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod check;
mod ingest;
mod render;
mod shell;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use ragchat_config::RagchatConfig;
use ragchat_core::{ConversationRequest, RagError, UserHandle};
use tracing::warn;

use crate::render::{Outcome, print_stream};

/// ragchat - a retrieval-augmented customer service chatbot.
#[derive(Parser, Debug)]
#[command(name = "ragchat", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Shell(UserArgs),
    /// Ask a single question and stream the answer.
    Ask {
        /// The question. May be omitted when --image is given.
        #[arg(default_value = "")]
        prompt: String,
        /// Attach a JPEG or PNG image.
        #[arg(long)]
        image: Option<PathBuf>,
        /// Standing instruction for this answer (repeatable).
        #[arg(long = "instruction")]
        instructions: Vec<String>,
        #[command(flatten)]
        user: UserArgs,
    },
    /// Load documents or image vectors into the vector stores.
    #[command(subcommand)]
    Ingest(IngestTarget),
    /// Check that every model server is reachable and ready.
    Check,
}

#[derive(Args, Debug, Clone, Default)]
struct UserArgs {
    #[arg(long, default_value = "")]
    department: String,
    #[arg(long, default_value = "")]
    username: String,
}

impl From<UserArgs> for UserHandle {
    fn from(args: UserArgs) -> Self {
        UserHandle::new(args.department, args.username)
    }
}

#[derive(Subcommand, Debug)]
enum IngestTarget {
    /// JSON array of `{id?, content, meta?}`; contents are embedded.
    Docs { file: PathBuf },
    /// JSON array of `{id, describe, embedding}`.
    Images { file: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => ragchat_config::load_and_validate_path(path),
        None => ragchat_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            ragchat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.agent.log_level);

    let code = match run(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            1
        }
    };
    std::process::exit(code);
}

async fn run(command: Option<Commands>, config: &RagchatConfig) -> Result<i32, RagError> {
    let Some(command) = command else {
        println!("ragchat: use --help for available commands");
        return Ok(0);
    };

    let app = app::build(config).await?;
    match command {
        Commands::Shell(user) => {
            if let Err(e) = app.agent.start().await {
                warn!(error = %e, "could not pin models; continuing");
            }
            shell::run_shell(&app.agent, user.into()).await?;
            if let Err(e) = app.agent.stop().await {
                warn!(error = %e, "could not release models");
            }
            Ok(0)
        }
        Commands::Ask {
            prompt,
            image,
            instructions,
            user,
        } => {
            for instruction in instructions {
                app.agent.add_instruction(instruction)?;
            }
            let mut request = ConversationRequest::new(prompt).with_user(user.into());
            if let Some(path) = image {
                request = request.with_attachment(app::load_image(&path).await?);
            }
            let stream = app.agent.chat(request).await?;
            Ok(match print_stream(stream).await {
                Outcome::Complete => 0,
                Outcome::Degraded => 2,
                Outcome::Interrupted => 130,
            })
        }
        Commands::Ingest(IngestTarget::Docs { file }) => {
            let count = ingest::ingest_documents(&app, &file).await?;
            println!("ingested {count} documents");
            Ok(0)
        }
        Commands::Ingest(IngestTarget::Images { file }) => {
            let count = ingest::ingest_images(&app, &file).await?;
            println!("ingested {count} image vectors");
            Ok(0)
        }
        Commands::Check => Ok(if check::run_check(&app).await? { 0 } else { 1 }),
    }
}

/// Logs go to stderr so answers on stdout stay clean.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ragchat={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ask_parses_image_and_instructions() {
        let cli = Cli::try_parse_from([
            "ragchat",
            "ask",
            "--image",
            "chip.png",
            "--instruction",
            "Be brief.",
            "--instruction",
            "Use English.",
            "--department",
            "sales",
        ])
        .unwrap();
        let Some(Commands::Ask {
            prompt,
            image,
            instructions,
            user,
        }) = cli.command
        else {
            panic!("expected ask");
        };
        assert_eq!(prompt, "");
        assert_eq!(image, Some(PathBuf::from("chip.png")));
        assert_eq!(instructions, vec!["Be brief.", "Use English."]);
        assert_eq!(user.department, "sales");
    }

    #[test]
    fn ingest_subcommands_take_a_file() {
        let cli = Cli::try_parse_from(["ragchat", "ingest", "docs", "faq.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Ingest(IngestTarget::Docs { file })) if file == PathBuf::from("faq.json")
        ));
    }

    #[test]
    fn default_config_is_valid() {
        let config = ragchat_config::load_and_validate_str("").expect("defaults should validate");
        assert_eq!(config.agent.name, "iVIT-Chatbot");
    }
}
