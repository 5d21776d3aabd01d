//! Console commands
//!
//! Each line typed at the console becomes a [`Command`], which is then run
//! against the reminder service. Commands are grouped by area:
//! - `medications`: add, edit, delete, mark taken, mute
//! - `settings`: timer, notification and sound configuration
//! - `windows`: show/hide the list, help and about

pub mod medications;
pub mod settings;
pub mod windows;

use crate::error::{AppError, Result};
use crate::services::{MedicationEdit, RemindersService, SettingsUpdate};
use crate::view::ConsoleView;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::str::FromStr;

/// A parsed console command. Positions are already converted to 0-based
/// indices.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Add(String),
    Take(usize),
    Edit(usize, MedicationEdit),
    /// Removal only happens once confirmed
    Delete { index: usize, confirmed: bool },
    Mute(usize),
    Unmute(usize),
    MuteAll,
    UnmuteAll,
    Check,
    Config,
    Set(SettingsUpdate),
    Show,
    Hide,
    About,
    Help,
    Quit,
}

/// What the event loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Continue,
    /// The poll interval changed
    RestartTimer,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let (verb, rest) = split_word(line);

        match verb.to_lowercase().as_str() {
            "list" | "ls" => Ok(Command::List),
            "add" => {
                if rest.is_empty() {
                    return Err(usage("add <name>"));
                }
                Ok(Command::Add(rest.to_string()))
            }
            "take" | "taken" => parse_position(rest).map(Command::Take),
            "edit" => medications::parse_edit(rest),
            "delete" | "rm" => medications::parse_delete(rest),
            "mute" => parse_position(rest).map(Command::Mute),
            "unmute" => parse_position(rest).map(Command::Unmute),
            "mute-all" => Ok(Command::MuteAll),
            "unmute-all" => Ok(Command::UnmuteAll),
            "check" => Ok(Command::Check),
            "config" => Ok(Command::Config),
            "set" => settings::parse_set(rest).map(Command::Set),
            "show" => Ok(Command::Show),
            "hide" => Ok(Command::Hide),
            "about" => Ok(Command::About),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err(AppError::InvalidInput("empty command".to_string())),
            other => Err(AppError::InvalidInput(format!(
                "unknown command '{}', type `help` for a list",
                other
            ))),
        }
    }
}

/// Parse and run one input line, reporting problems on the console
pub fn execute<W: Write>(
    line: &str,
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    now: DateTime<Utc>,
) -> CommandOutcome {
    if line.trim().is_empty() {
        return CommandOutcome::Continue;
    }

    let command = match line.parse::<Command>() {
        Ok(command) => command,
        Err(e) => {
            view.print(&e.to_string());
            return CommandOutcome::Continue;
        }
    };

    tracing::debug!("Console command: {:?}", command);

    match dispatch(command, service, view, now) {
        Ok(outcome) => outcome,
        Err(e) => {
            view.print(&format!("Error: {}", e));
            CommandOutcome::Continue
        }
    }
}

fn dispatch<W: Write>(
    command: Command,
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    match command {
        Command::List => medications::list(service, view, now),
        Command::Add(name) => medications::add(service, view, &name, now),
        Command::Take(index) => medications::take(service, view, index, now),
        Command::Edit(index, edit) => medications::edit(service, view, index, edit, now),
        Command::Delete { index, confirmed } => {
            medications::delete(service, view, index, confirmed, now)
        }
        Command::Mute(index) => medications::set_muted(service, view, index, true, now),
        Command::Unmute(index) => medications::set_muted(service, view, index, false, now),
        Command::MuteAll => medications::set_mute_all(service, view, true, now),
        Command::UnmuteAll => medications::set_mute_all(service, view, false, now),
        Command::Check => medications::check(service, view, now),
        Command::Config => settings::show(service, view),
        Command::Set(update) => settings::update(service, view, update, now),
        Command::Show => windows::show(service, view, now),
        Command::Hide => windows::hide(view),
        Command::About => windows::about(view),
        Command::Help => windows::help(view),
        Command::Quit => Ok(CommandOutcome::Quit),
    }
}

/// Split off the first word; the remainder is trimmed
pub(crate) fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (s, ""),
    }
}

/// Parse a 1-based list position into an index
pub(crate) fn parse_position(s: &str) -> Result<usize> {
    let s = s.trim();
    match s.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position - 1),
        _ => Err(AppError::InvalidInput(format!(
            "expected a list position (1, 2, ...), got '{}'",
            s
        ))),
    }
}

pub(crate) fn usage(syntax: &str) -> AppError {
    AppError::InvalidInput(format!("usage: {}", syntax))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("list".parse::<Command>().unwrap(), Command::List);
        assert_eq!("  LS ".parse::<Command>().unwrap(), Command::List);
        assert_eq!("mute-all".parse::<Command>().unwrap(), Command::MuteAll);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("?".parse::<Command>().unwrap(), Command::Help);
    }

    #[test]
    fn test_parse_add_keeps_spaces_in_name() {
        assert_eq!(
            "add  Vitamin D 1000 IU ".parse::<Command>().unwrap(),
            Command::Add("Vitamin D 1000 IU".to_string())
        );
        assert!("add".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_positions_are_one_based() {
        assert_eq!("take 1".parse::<Command>().unwrap(), Command::Take(0));
        assert_eq!(
            "rm 3".parse::<Command>().unwrap(),
            Command::Delete {
                index: 2,
                confirmed: false
            }
        );
        assert_eq!("unmute 2".parse::<Command>().unwrap(), Command::Unmute(1));
        assert!("take 0".parse::<Command>().is_err());
        assert!("take first".parse::<Command>().is_err());
        assert!("mute".parse::<Command>().is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = "frobnicate 3".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn test_split_word() {
        assert_eq!(split_word("  edit 2  name Foo "), ("edit", "2  name Foo"));
        assert_eq!(split_word("list"), ("list", ""));
        assert_eq!(split_word(""), ("", ""));
    }
}
