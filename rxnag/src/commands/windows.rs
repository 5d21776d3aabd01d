//! View commands
//!
//! Show/hide the medication list, plus help and about text.

use super::CommandOutcome;
use crate::error::Result;
use crate::services::RemindersService;
use crate::view::ConsoleView;
use chrono::{DateTime, Utc};
use std::io::Write;

pub const HELP_TEXT: &str = "\
Commands:
  list                         show medications
  add <name>                   add a medication (taken now, every 6h)
  take <n>                     mark medication n as taken now
  edit <n> name <name>         rename medication n
  edit <n> interval <hours>    change the dosing interval
  edit <n> last-taken <YYYY-MM-DD HH:MM>
  delete <n> yes               remove medication n
  mute <n> / unmute <n>        silence one medication
  mute-all / unmute-all        silence everything for this session
  check                        check for due doses now
  config                       show settings
  set <key> <value>            timer-mins, shown-secs, play-sound,
                               sound-file, volume, start-minimized
  show / hide                  show or hide the list on each check
  about                        version information
  quit                         exit";

pub fn show<W: Write>(
    service: &RemindersService,
    view: &ConsoleView<W>,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    view.set_visible(true);
    view.render(&service.statuses(now));
    Ok(CommandOutcome::Continue)
}

pub fn hide<W: Write>(view: &ConsoleView<W>) -> Result<CommandOutcome> {
    view.set_visible(false);
    view.print("Hidden; reminders keep running. Type `show` to bring the list back.");
    Ok(CommandOutcome::Continue)
}

pub fn about<W: Write>(view: &ConsoleView<W>) -> Result<CommandOutcome> {
    view.print(&format!(
        "RxNag - Medication Reminder\nVersion {}\nLicense: GPL-3",
        env!("CARGO_PKG_VERSION")
    ));
    Ok(CommandOutcome::Continue)
}

pub fn help<W: Write>(view: &ConsoleView<W>) -> Result<CommandOutcome> {
    view.print(HELP_TEXT);
    Ok(CommandOutcome::Continue)
}
