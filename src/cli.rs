//! Command-line front end over the terminal host.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::completion::{CompletionService, OpenAiClient, TextIntent};
use crate::config::{Config, CredentialStore, FileCredentialStore};
use crate::dispatcher::{Dispatcher, DELETE_API_KEY_QUESTION};
use crate::host::{input, TerminalHost};

#[derive(Debug, Parser)]
#[command(
    name = "text-companion",
    version,
    about = "Shorten, simplify or grammar-fix text with a completion API"
)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/text-companion/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shorten the selected text
    Shorten(SelectionArgs),
    /// Make the selected text easier to understand
    Simplify(SelectionArgs),
    /// Fix grammar and spelling issues in the selected text
    FixGrammar(SelectionArgs),
    /// Store the OpenAI API key
    SetKey,
    /// Delete the stored OpenAI API key
    DeleteKey {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// File to edit in place. Reads stdin and writes stdout when omitted.
    pub file: Option<PathBuf>,

    /// First selected character (0-based)
    #[arg(long, requires = "end")]
    pub start: Option<usize>,

    /// Character after the selection
    #[arg(long, requires = "start")]
    pub end: Option<usize>,
}

impl SelectionArgs {
    /// Selected character range, `None` for the whole document.
    pub fn char_range(&self) -> Option<Range<usize>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(start..end),
            _ => None,
        }
    }
}

impl Command {
    pub fn intent(&self) -> Option<TextIntent> {
        match self {
            Command::Shorten(_) => Some(TextIntent::ShortenText),
            Command::Simplify(_) => Some(TextIntent::SimplifyText),
            Command::FixGrammar(_) => Some(TextIntent::FixGrammarIssues),
            Command::SetKey | Command::DeleteKey { .. } => None,
        }
    }

    fn selection_args(&self) -> Option<&SelectionArgs> {
        match self {
            Command::Shorten(args) | Command::Simplify(args) | Command::FixGrammar(args) => {
                Some(args)
            }
            Command::SetKey | Command::DeleteKey { .. } => None,
        }
    }
}

/// Credential file beside the given config file.
pub fn credentials_path(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join("credentials.toml"))
        .unwrap_or_else(FileCredentialStore::default_path)
}

pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)?;
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(credentials_path(&config_path)));

    let selection = cli.command.selection_args().cloned();
    let document = match &selection {
        Some(args) => read_document(args.file.as_deref()).await?,
        None => String::new(),
    };
    let host = Arc::new(TerminalHost::new(
        document,
        selection.as_ref().and_then(SelectionArgs::char_range),
    )?);

    let api = Arc::new(OpenAiClient::new(config.api.clone())?);
    let dispatcher = Dispatcher::new(CompletionService::new(api), credentials, host.clone());

    if let (Some(intent), Some(args)) = (cli.command.intent(), selection) {
        let result = dispatcher.run(intent).await;
        if result.is_success() {
            write_document(args.file.as_deref(), &host.document()).await?;
        }
        return Ok(exit_code(host.error_shown()));
    }

    match cli.command {
        Command::SetKey => {
            if let Some(key) = input::read_masked("OpenAI API Key")? {
                dispatcher.set_api_key(&key)?;
            }
        }
        Command::DeleteKey { yes } => {
            let confirmed = yes || input::confirm(DELETE_API_KEY_QUESTION)?;
            dispatcher.delete_api_key(confirmed)?;
        }
        Command::Shorten(_) | Command::Simplify(_) | Command::FixGrammar(_) => {}
    }

    Ok(exit_code(host.error_shown()))
}

fn exit_code(error_shown: bool) -> ExitCode {
    if error_shown {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

async fn read_document(file: Option<&Path>) -> anyhow::Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read '{}'", path.display())),
        None => {
            let mut document = String::new();
            tokio::io::stdin()
                .read_to_string(&mut document)
                .await
                .context("Failed to read stdin")?;
            Ok(document)
        }
    }
}

async fn write_document(file: Option<&Path>, document: &str) -> anyhow::Result<()> {
    match file {
        Some(path) => tokio::fs::write(path, document)
            .await
            .with_context(|| format!("Failed to write '{}'", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(document.as_bytes()).await?;
            stdout.flush().await?;
            Ok(())
        }
    }
}
