//! Settings commands
//!
//! Show and change the poll timer, notification, and sound settings.

use super::{split_word, usage, CommandOutcome};
use crate::error::{AppError, Result};
use crate::services::{RemindersService, SettingsUpdate};
use crate::view::ConsoleView;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::PathBuf;

const SET_USAGE: &str = concat!(
    "set timer-mins|shown-secs|play-sound|sound-file|volume|start-minimized ",
    "<value>"
);

/// Parse the arguments of `set`
pub fn parse_set(rest: &str) -> Result<SettingsUpdate> {
    let (key, value) = split_word(rest);
    if key.is_empty() || value.is_empty() {
        return Err(usage(SET_USAGE));
    }

    let mut update = SettingsUpdate::default();
    match key.to_lowercase().as_str() {
        "timer-mins" => update.poll_interval_minutes = Some(parse_int(key, value)?),
        "shown-secs" => update.notification_display_seconds = Some(parse_int(key, value)?),
        "play-sound" => update.play_sound = Some(parse_bool(key, value)?),
        "sound-file" => update.sound_file = Some(PathBuf::from(value)),
        "volume" => {
            let volume = value
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| invalid(key, value, "a number between 0 and 1"))?;
            update.sound_volume = Some(volume);
        }
        "start-minimized" => update.start_minimized = Some(parse_bool(key, value)?),
        _ => return Err(usage(SET_USAGE)),
    }

    Ok(update)
}

fn parse_int(key: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|_| invalid(key, value, "a whole number"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, value, "on or off")),
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> AppError {
    AppError::InvalidInput(format!("{} expects {}, got '{}'", key, expected, value))
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Print the current settings
pub fn show<W: Write>(service: &RemindersService, view: &ConsoleView<W>) -> Result<CommandOutcome> {
    let config = service.config();
    view.print(&format!(
        "Notification timer interval: {} min\n\
         Notification shown for: {} s\n\
         Play sound: {}\n\
         Sound file: {} (volume {:.2})\n\
         Start minimized: {}\n\
         Mute all: {}",
        config.poll_interval_minutes,
        config.notification_display_seconds,
        on_off(config.play_sound),
        service.sound_path().display(),
        config.sound_volume,
        on_off(config.start_minimized),
        on_off(service.mute_all()),
    ));
    Ok(CommandOutcome::Continue)
}

/// Apply a settings change, asking for a timer restart when needed
pub fn update<W: Write>(
    service: &mut RemindersService,
    view: &ConsoleView<W>,
    update: SettingsUpdate,
    now: DateTime<Utc>,
) -> Result<CommandOutcome> {
    let sound_changed = update.sound_file.is_some();
    let interval_changed = service.update_settings(update, now)?;

    if sound_changed && !service.sound_path().is_file() {
        view.print(&format!(
            "Note: {} does not exist yet",
            service.sound_path().display()
        ));
    }

    if interval_changed {
        view.print(&format!(
            "Checking every {} min from now on",
            service.config().poll_interval_minutes
        ));
        Ok(CommandOutcome::RestartTimer)
    } else {
        view.print("Settings saved");
        Ok(CommandOutcome::Continue)
    }
}
