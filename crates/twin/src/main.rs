// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twin - intent routing for a personal digital twin.
//!
//! This is the binary entry point.

mod commands;
mod handlers;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Twin - classify questions and route them to the right answer handler.
#[derive(Parser, Debug)]
#[command(name = "twin", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to the XDG lookup).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify a question and print the result as JSON.
    Classify {
        /// The question to classify.
        #[arg(required = true)]
        question: Vec<String>,
        /// Use only the keyword classifier; no API call.
        #[arg(long)]
        offline: bool,
        /// Session id to attach to the result.
        #[arg(long)]
        session: Option<String>,
    },
    /// Classify and answer a single question.
    Ask {
        /// The question to answer.
        #[arg(required = true)]
        question: Vec<String>,
        /// Session id to answer in.
        #[arg(long)]
        session: Option<String>,
    },
    /// Launch an interactive REPL session.
    Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => twin_config::load_and_validate_path(path),
        None => twin_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            twin_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let outcome = match cli.command {
        Some(Commands::Classify {
            question,
            offline,
            session,
        }) => commands::run_classify(&config, &question.join(" "), session, offline).await,
        Some(Commands::Ask { question, session }) => {
            commands::run_ask(&config, &question.join(" "), session).await
        }
        Some(Commands::Shell) => shell::run_shell(&config).await,
        None => {
            println!("twin: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn directive_for(log_level: &str) -> String {
    format!("twin={log_level},warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = twin_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.agent.name, "twin");
    }

    #[test]
    fn filter_directive_scopes_level_to_twin() {
        assert_eq!(directive_for("debug"), "twin=debug,warn");
    }

    #[test]
    fn question_words_are_joined() {
        let cli = Cli::parse_from(["twin", "classify", "--offline", "mis", "facturas", "de", "2024"]);
        match cli.command {
            Some(Commands::Classify {
                question, offline, ..
            }) => {
                assert!(offline);
                assert_eq!(question.join(" "), "mis facturas de 2024");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["twin", "ask", "hola", "--config", "/tmp/twin.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/twin.toml")));
    }
}
