//! Developer CLI for CardNav metadata sets: decode deep links, resolve
//! them against a metadata file, replay keypresses, and poke around in
//! an interactive shell.

mod repl;

use cardnav::{
    Error as NavError, Navigator,
    core::{
        graph::ShortcutEntry,
        model::{card::CardName, id::RecordId, keycode::Keycode},
        predict::{Outcome, Stimulus},
        state::NavigationState,
        store::{MemoryStore, MetadataSet},
    },
    parse_url, render_url,
};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use thiserror::Error as ThisError;

///
/// CliError
///

#[derive(Debug, ThisError)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    ReadMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    ParseMetadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{message}")]
    Shell { message: String },

    #[error(transparent)]
    Nav(#[from] NavError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl CliError {
    fn shell(message: impl Into<String>) -> Self {
        Self::Shell {
            message: message.into(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cardnav", version)]
#[command(about = "Inspect CardNav metadata and replay navigation flows")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a deep link and print the raw request.
    Parse {
        /// Deep link to decode, path and query.
        url: String,
    },

    /// Resolve a deep link against a metadata set.
    Resolve {
        /// Metadata set (JSON file).
        #[arg(long = "metadata", value_name = "FILE", env = "CARDNAV_METADATA")]
        metadata: PathBuf,

        /// Deep link to resolve.
        url: String,
    },

    /// Resolve a deep link, apply stimuli in order, print the final state.
    Predict {
        /// Metadata set (JSON file).
        #[arg(long = "metadata", value_name = "FILE", env = "CARDNAV_METADATA")]
        metadata: PathBuf,

        /// Deep link to start from.
        url: String,

        /// Select a record before anything else.
        #[arg(long = "select", value_name = "ID")]
        select: Option<u64>,

        /// Apply a named filter after the selection.
        #[arg(long = "filter", value_name = "NAME")]
        filter: Option<String>,

        /// Press a keycode (repeatable, pressed in order, after the rest).
        #[arg(long = "key", value_name = "KEYCODE", action = ArgAction::Append)]
        keys: Vec<String>,
    },

    /// List the visible shortcuts of one card.
    Shortcuts {
        /// Metadata set (JSON file).
        #[arg(long = "metadata", value_name = "FILE", env = "CARDNAV_METADATA")]
        metadata: PathBuf,

        /// Card name as it appears in deep links.
        card: String,
    },

    /// Interactive navigation shell over a metadata set.
    Repl {
        /// Metadata set (JSON file).
        #[arg(long = "metadata", value_name = "FILE", env = "CARDNAV_METADATA")]
        metadata: PathBuf,
    },
}

#[derive(Serialize)]
struct ResolveOutput {
    url: String,
    state: NavigationState,
}

#[derive(Serialize)]
struct PredictOutput {
    outcomes: Vec<Outcome>,
    url: String,
    state: NavigationState,
}

#[derive(Serialize)]
struct ShortcutsOutput {
    card: String,
    shortcuts: Vec<ShortcutEntry>,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Parse { url } => {
            let request = parse_url(&url)?;
            print_json(&request)
        }

        Command::Resolve { metadata, url } => {
            let store = load_store(&metadata)?;
            let state = Navigator::new(&store).resolve_url(&url)?;

            print_json(&ResolveOutput {
                url: render_url(&state),
                state,
            })
        }

        Command::Predict {
            metadata,
            url,
            select,
            filter,
            keys,
        } => {
            let store = load_store(&metadata)?;
            let navigator = Navigator::new(&store);

            let mut state = navigator.resolve_url(&url)?;
            let mut outcomes = Vec::new();

            for stimulus in assemble_stimuli(select, filter, keys) {
                let prediction = navigator.predict(&state, &stimulus)?;
                state = prediction.state;
                outcomes.push(prediction.outcome);
            }

            print_json(&PredictOutput {
                outcomes,
                url: render_url(&state),
                state,
            })
        }

        Command::Shortcuts { metadata, card } => {
            let store = load_store(&metadata)?;
            let shortcuts = Navigator::new(&store).shortcuts(&CardName::from(card.as_str()))?;

            print_json(&ShortcutsOutput { card, shortcuts })
        }

        Command::Repl { metadata } => repl::run(&metadata),
    }
}

/// Stimulus order is fixed: selection, then filter, then keypresses.
fn assemble_stimuli(select: Option<u64>, filter: Option<String>, keys: Vec<String>) -> Vec<Stimulus> {
    let mut stimuli = Vec::new();

    if let Some(record) = select {
        stimuli.push(Stimulus::SelectRecord(RecordId::new(record)));
    }
    if let Some(name) = filter {
        stimuli.push(Stimulus::ApplyFilter(name));
    }
    for key in keys {
        stimuli.push(Stimulus::Key(Keycode::from(key)));
    }

    stimuli
}

fn load_store(path: &Path) -> Result<MemoryStore, CliError> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::ReadMetadata {
        path: path.to_path_buf(),
        source,
    })?;

    let set: MetadataSet = serde_json::from_str(&raw).map_err(|source| CliError::ParseMetadata {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(MemoryStore::new(set))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");

    Ok(())
}
