pub mod client;
pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use self::client::ContactClient;
use self::commands::contacts::{ContactArgs, ListArgs};

#[derive(Parser)]
#[command(name = "contactbook")]
#[command(about = "Contactbook CLI - Command-line client for the Contactbook API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "API base URL (default: $CONTACTBOOK_SERVER or http://127.0.0.1:3000)"
    )]
    pub server: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List contacts, optionally filtered by name or favorite")]
    List(ListArgs),

    #[command(about = "Show a single contact")]
    Show {
        #[arg(help = "Contact ID")]
        id: String,
    },

    #[command(about = "Create a contact")]
    Create {
        #[arg(long, help = "Contact name (required)")]
        name: String,
        #[command(flatten)]
        fields: ContactArgs,
    },

    #[command(about = "Update fields of an existing contact")]
    Update {
        #[arg(help = "Contact ID")]
        id: String,
        #[arg(long, help = "New contact name")]
        name: Option<String>,
        #[command(flatten)]
        fields: ContactArgs,
    },

    #[command(about = "Delete a contact")]
    Delete {
        #[arg(help = "Contact ID")]
        id: String,
    },

    #[command(about = "Delete every contact")]
    DeleteAll {
        #[arg(long, help = "Confirm deleting all contacts")]
        yes: bool,
    },

    #[command(about = "Check that the server and its store are reachable")]
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let server = config::resolve_server(cli.server.as_deref())?;
    let client = ContactClient::new(server)?;

    let result = commands::contacts::handle(cli.command, &client, output_format.clone()).await;
    finish(result, &output_format)
}

/// An error already written to stdout as a JSON envelope; callers only set the exit code
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ReportedError(pub String);

fn finish(result: anyhow::Result<()>, output_format: &OutputFormat) -> anyhow::Result<()> {
    match (result, output_format) {
        (Err(e), OutputFormat::Json) => {
            let message = e.to_string();
            utils::output_error(output_format, &message)?;
            Err(ReportedError(message).into())
        }
        (result, _) => result,
    }
}
