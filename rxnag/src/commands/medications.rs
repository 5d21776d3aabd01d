//! Medication commands
//!
//! Add, edit, delete, mark taken, and mute operations on the list.

use super::{parse_position, split_word, usage, Command, CommandOutcome};
use crate::config::LAST_TAKEN_INPUT_FORMAT;
use crate::error::{AppError, Result};
use crate::models::parse_timestamp_str;
use crate::services::{MedicationEdit, RemindersService};
use crate::view::ConsoleView;
use chrono::{DateTime, Utc};
use std::io::Write;

const EDIT_USAGE: &str = concat!(
    "edit <n> name <name> | edit <n> interval <hours> | ",
    "edit <n> last-taken <YYYY-MM-DD HH:MM>"
);

/// Parse the arguments of `edit`
pub fn parse_edit(rest: &str) -> Result<Command> {
    let (position, rest) = split_word(rest);
    let (field, value) = split_word(rest);
    if position.is_empty() || field.is_empty() || value.is_empty() {
        return Err(usage(EDIT_USAGE));
    }

    let index = parse_position(position)?;
    let edit = match field.to_lowercase().as_str() {
        "name" => MedicationEdit {
            name: Some(value.to_string()),
            ..MedicationEdit::default()
        },
        "interval" => {
            let hours = value.parse::<i64>().map_err(|_| {
                AppError::InvalidInput(format!(
                    "interval must be a whole number of hours, got '{}'",
                    value
                ))
            })?;
            MedicationEdit {
                interval_hours: Some(hours),
                ..MedicationEdit::default()
            }
        }
        "last-taken" | "taken" => {
            let taken = parse_timestamp_str(value).ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "last taken must look like {}, got '{}'",
                    LAST_TAKEN_INPUT_FORMAT, value
                ))
            })?;
            MedicationEdit {
                last_taken: Some(taken),
                ..MedicationEdit::default()
            }
        }
        _ => return Err(usage(EDIT_USAGE)),
    };

    Ok(Command::Edit(index, edit))
}

/// Parse the arguments of `delete`
pub fn parse_delete(rest: &str) -> Result<Command> {
    let (position, confirm) = split_word(rest);
    let index = parse_position(position)?;
    let confirmed = match confirm.to_lowercase().as_str() {
        "" => false,
        "yes" | "y" | "--yes" | "-y" => true,
        _ => return Err(usage("delete <n> [yes]")),
    };
    Ok(Command::Delete { index, confirmed })
}

pub fn list<W: Write>(
    service: &RemindersService,
    view: &ConsoleView<W>,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    view.render(&service.statuses(now));
    if service.mute_all() {
        view.print("All reminders are muted for this session.");
    }
    Ok(CommandOutcome::Continue)
}

pub fn add<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    name: &str,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    let index = service.add_medication(name, now)?;
    let record = &service.medications()[index];
    view.print(&format!(
        "Added {} at position {} (every {}h)",
        record.name,
        index + 1,
        record.interval_hours
    ));
    Ok(CommandOutcome::Continue)
}

pub fn take<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    index: usize,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    service.mark_taken(index, now)?;
    view.print(&format!("Marked {} as taken", service.medications()[index].name));
    Ok(CommandOutcome::Continue)
}

pub fn edit<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    index: usize,
    edit: MedicationEdit,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    service.edit_medication(index, edit, now)?;
    view.print(&format!("Updated {}", service.medications()[index].name));
    Ok(CommandOutcome::Continue)
}

pub fn delete<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    index: usize,
    confirmed: bool,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    if !confirmed {
        let record = service
            .medications()
            .get(index)
            .ok_or(AppError::MedicationNotFound(index + 1))?;
        view.print(&format!(
            "Are you sure you wish to remove {}? Type `delete {} yes` to confirm.",
            record.name,
            index + 1
        ));
        return Ok(CommandOutcome::Continue);
    }

    let removed = service.delete_medication(index, now)?;
    view.print(&format!("Removed {}", removed.name));
    Ok(CommandOutcome::Continue)
}

pub fn set_muted<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    index: usize,
    muted: bool,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    service.set_muted(index, muted, now)?;
    let name = &service.medications()[index].name;
    view.print(&format!("{} {}", if muted { "Muted" } else { "Unmuted" }, name));
    Ok(CommandOutcome::Continue)
}

pub fn set_mute_all<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    muted: bool,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    service.set_mute_all(muted, now);
    view.print(if muted {
        "All reminders muted until restart or `unmute-all`"
    } else {
        "Reminders unmuted"
    });
    Ok(CommandOutcome::Continue)
}

/// Run a poll cycle right away
pub fn check<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    let outcome = service.tick(now);
    if outcome.alerts.is_empty() {
        view.print("Nothing due");
    }
    Ok(CommandOutcome::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDateTime, TimeZone};

    #[test]
    fn test_parse_edit_name() {
        let command = parse_edit("2 name  Vitamin B12 ").unwrap();
        assert_eq!(
            command,
            Command::Edit(
                1,
                MedicationEdit {
                    name: Some("Vitamin B12".into()),
                    ..MedicationEdit::default()
                }
            )
        );
    }

    #[test]
    fn test_parse_edit_interval() {
        let command = parse_edit("1 interval 12").unwrap();
        assert_eq!(
            command,
            Command::Edit(
                0,
                MedicationEdit {
                    interval_hours: Some(12),
                    ..MedicationEdit::default()
                }
            )
        );
        assert!(parse_edit("1 interval twelve").is_err());
    }

    #[test]
    fn test_parse_edit_last_taken_in_local_time() {
        let naive =
            NaiveDateTime::parse_from_str("2024-05-01 07:45", LAST_TAKEN_INPUT_FORMAT).unwrap();
        let expected = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .with_timezone(&Utc);

        let command = parse_edit("3 last-taken 2024-05-01 07:45").unwrap();
        assert_eq!(
            command,
            Command::Edit(
                2,
                MedicationEdit {
                    last_taken: Some(expected),
                    ..MedicationEdit::default()
                }
            )
        );
        assert!(parse_edit("3 last-taken yesterday").is_err());
    }

    #[test]
    fn test_parse_delete_confirmation() {
        assert_eq!(
            parse_delete("2").unwrap(),
            Command::Delete {
                index: 1,
                confirmed: false
            }
        );
        assert_eq!(
            parse_delete("2 YES").unwrap(),
            Command::Delete {
                index: 1,
                confirmed: true
            }
        );
        assert!(parse_delete("2 please").is_err());
        assert!(parse_delete("").is_err());
    }

    #[test]
    fn test_parse_edit_requires_all_parts() {
        assert!(parse_edit("").is_err());
        assert!(parse_edit("1").is_err());
        assert!(parse_edit("1 name").is_err());
        assert!(parse_edit("1 colour blue").is_err());
    }
}
