//! Interactive navigation shell.
//!
//! Commands start with `:`; any other input is pressed as a keycode on
//! the current card. A failed command or prediction prints its error and
//! leaves the current state untouched.

use crate::{CliError, load_store, print_json};
use cardnav::{
    Navigator,
    core::{
        model::{id::RecordId, keycode::Keycode},
        predict::Stimulus,
        state::NavigationState,
        store::MemoryStore,
    },
    render_url,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use std::path::Path;

pub(crate) fn run(metadata: &Path) -> Result<(), CliError> {
    let mut shell = Shell {
        store: load_store(metadata)?,
        state: None,
    };

    println!("CardNav shell. :open <url> to start, :help for commands, :quit to leave.");

    let mut editor = DefaultEditor::new()?;

    loop {
        let line = match editor.readline("cardnav> ") {
            Ok(line) => line,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(err) => return Err(err.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line)?;

        match shell.dispatch(line) {
            Ok(Control::Continue) => {}
            Ok(Control::Exit) => break,
            Err(err) => eprintln!("error: {err}"),
        }
    }

    Ok(())
}

enum Control {
    Continue,
    Exit,
}

struct Shell {
    store: MemoryStore,
    state: Option<NavigationState>,
}

impl Shell {
    fn dispatch(&mut self, line: &str) -> Result<Control, CliError> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            ":help" => print_help(),
            ":quit" | ":exit" => return Ok(Control::Exit),
            ":open" => self.open(required(rest, "usage: :open <url>")?)?,
            ":load" => self.load(required(rest, "usage: :load <file>")?)?,
            ":state" => print_json(self.current()?)?,
            ":url" => println!("{}", render_url(self.current()?)),
            ":shortcuts" => self.shortcuts()?,
            ":filter" => {
                let name = required(rest, "usage: :filter <name>")?;
                self.stimulate(&Stimulus::ApplyFilter(name.to_string()))?;
            }
            ":select" => {
                let raw = required(rest, "usage: :select <record-id>")?;
                let record = raw
                    .parse::<u64>()
                    .map_err(|_| CliError::shell(format!("not a record id: '{raw}'")))?;
                self.stimulate(&Stimulus::SelectRecord(RecordId::new(record)))?;
            }
            _ if command.starts_with(':') => {
                return Err(CliError::shell(format!("unknown command '{command}'")));
            }
            // Everything else is a keycode, spaces and all.
            _ => self.stimulate(&Stimulus::Key(Keycode::from(line)))?,
        }

        Ok(Control::Continue)
    }

    fn open(&mut self, raw: &str) -> Result<(), CliError> {
        let state = Navigator::new(&self.store).resolve_url(raw)?;

        println!("-> {}", render_url(&state));
        self.state = Some(state);

        Ok(())
    }

    fn load(&mut self, raw: &str) -> Result<(), CliError> {
        self.store = load_store(Path::new(raw))?;
        self.state = None;

        println!("metadata loaded; state cleared");

        Ok(())
    }

    fn shortcuts(&self) -> Result<(), CliError> {
        let state = self.current()?;
        let entries = Navigator::new(&self.store).shortcuts(&state.card)?;

        if entries.is_empty() {
            println!("(no visible shortcuts)");
            return Ok(());
        }

        for entry in &entries {
            let path: Vec<&str> = entry.path.iter().map(Keycode::as_str).collect();
            println!("  {:<12} {}", path.join(" "), entry.label);
        }

        Ok(())
    }

    fn stimulate(&mut self, stimulus: &Stimulus) -> Result<(), CliError> {
        let state = self.current()?;
        let prediction = Navigator::new(&self.store).predict(state, stimulus)?;

        println!("{}", serde_json::to_string(&prediction.outcome)?);
        println!("-> {}", render_url(&prediction.state));
        self.state = Some(prediction.state);

        Ok(())
    }

    fn current(&self) -> Result<&NavigationState, CliError> {
        self.state
            .as_ref()
            .ok_or_else(|| CliError::shell("no current state; use :open <url> first"))
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, CliError> {
    if rest.is_empty() {
        return Err(CliError::shell(usage));
    }

    Ok(rest)
}

fn print_help() {
    println!(":open <url>       resolve a deep link and make it current");
    println!(":state            print the current state as JSON");
    println!(":url              print the canonical deep link");
    println!(":shortcuts        list visible shortcuts of the current card");
    println!(":filter <name>    apply a named filter");
    println!(":select <id>      select a record");
    println!(":load <file>      swap the metadata set and clear the state");
    println!(":quit             leave the shell");
    println!("<anything else>   pressed as a keycode");
}
