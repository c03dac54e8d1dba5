//! Parts Assist CLI - run the agent and check catalog data from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Answer one message (prints the JSON response)
//! pa-cli ask "Is PS11752778 compatible with WRS325SDHZ?"
//!
//! # Continue a conversation saved as a JSON array of turns
//! pa-cli ask "how do I install it?" --history-file history.json
//!
//! # Show how a message is classified, without calling any handler
//! pa-cli classify "my dishwasher won't drain" --classifier keyword
//!
//! # Validate a catalog file
//! pa-cli catalog validate crates/agent/data/catalog.yaml
//! ```
//!
//! `ask` and `classify` read the same environment variables as the agent
//! service.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parts_assist_agent::config::ClassifierKind;

mod commands;

#[derive(Parser)]
#[command(name = "pa-cli")]
#[command(author, version, about = "Parts Assist CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer one message and print the response as JSON
    Ask {
        /// The customer message
        message: String,

        #[command(flatten)]
        agent: AgentArgs,
    },
    /// Classify one message and print the intent as JSON
    Classify {
        /// The customer message
        message: String,

        #[command(flatten)]
        agent: AgentArgs,
    },
    /// Work with catalog files
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
}

/// Overrides shared by `ask` and `classify`.
#[derive(clap::Args)]
struct AgentArgs {
    /// JSON file holding prior turns (`[{"role": "user", "content": "..."}]`)
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Classifier to use (`keyword` or `llm`), overriding `CLASSIFIER`
    #[arg(long)]
    classifier: Option<ClassifierKind>,

    /// Catalog file, overriding `CATALOG_PATH`
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Check a catalog file and report every problem
    Validate {
        /// Path to the catalog YAML file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Ask { message, agent } => {
            commands::agent::ask(&message, &agent.into_options()).await?;
        }
        Commands::Classify { message, agent } => {
            commands::agent::classify(&message, &agent.into_options()).await?;
        }
        Commands::Catalog { action } => match action {
            CatalogAction::Validate { path } => commands::catalog::validate(&path)?,
        },
    }
    Ok(())
}

impl AgentArgs {
    fn into_options(self) -> commands::agent::AgentOptions {
        commands::agent::AgentOptions {
            history: self.history_file,
            classifier: self.classifier,
            catalog: self.catalog,
        }
    }
}
