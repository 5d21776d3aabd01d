//! Settings service
//!
//! Owns the persisted config schema and its JSON round-trip. Loading never
//! fails: a missing or corrupt file yields defaults, and each bad field
//! falls back on its own.

use crate::config::{
    DEFAULT_NOTIFICATION_SHOWN_SECS, DEFAULT_POLL_INTERVAL_MINS, DEFAULT_SOUND_FILE,
    DEFAULT_SOUND_VOLUME, MAX_NOTIFICATION_SHOWN_SECS, MAX_POLL_INTERVAL_MINS, MAX_SOUND_VOLUME,
    MIN_NOTIFICATION_SHOWN_SECS, MIN_POLL_INTERVAL_MINS, MIN_SOUND_VOLUME,
};
use crate::error::{AppError, Result};
use crate::models::{value_as_i64, MedicationRecord};
use crate::storage::Storage;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Process-wide reminder state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderConfig {
    /// Display order is meaningful to the user
    pub medications: Vec<MedicationRecord>,
    #[serde(rename = "notification_timer_mins")]
    pub poll_interval_minutes: u32,
    #[serde(rename = "notification_shown_secs")]
    pub notification_display_seconds: u32,
    pub play_sound: bool,
    pub sound_file: PathBuf,
    pub sound_volume: f32,
    pub start_minimized: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            medications: Vec::new(),
            poll_interval_minutes: DEFAULT_POLL_INTERVAL_MINS,
            notification_display_seconds: DEFAULT_NOTIFICATION_SHOWN_SECS,
            play_sound: true,
            sound_file: PathBuf::from(DEFAULT_SOUND_FILE),
            sound_volume: DEFAULT_SOUND_VOLUME,
            start_minimized: false,
        }
    }
}

impl ReminderConfig {
    /// Build a config from a parsed JSON document, field by field
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();

        let medications = match value.get("medications").and_then(Value::as_array) {
            Some(entries) => entries
                .iter()
                .filter_map(|entry| {
                    let record = MedicationRecord::from_value(entry);
                    if record.is_none() {
                        tracing::warn!("Skipping medication entry without a name: {}", entry);
                    }
                    record
                })
                .collect(),
            None => Vec::new(),
        };

        let poll_interval_minutes = value
            .get("notification_timer_mins")
            .and_then(value_as_i64)
            .map(clamp_poll_interval)
            .unwrap_or(defaults.poll_interval_minutes);

        let notification_display_seconds = value
            .get("notification_shown_secs")
            .and_then(value_as_i64)
            .map(clamp_notification_secs)
            .unwrap_or(defaults.notification_display_seconds);

        let play_sound = value
            .get("play_sound")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.play_sound);

        let sound_file = value
            .get("sound_file")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.sound_file);

        let sound_volume = value
            .get("sound_volume")
            .and_then(Value::as_f64)
            .map(|v| clamp_volume(v as f32))
            .unwrap_or(defaults.sound_volume);

        let start_minimized = value
            .get("start_minimized")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.start_minimized);

        Self {
            medications,
            poll_interval_minutes,
            notification_display_seconds,
            play_sound,
            sound_file,
            sound_volume,
            start_minimized,
        }
    }
}

pub fn clamp_poll_interval(minutes: i64) -> u32 {
    minutes.clamp(MIN_POLL_INTERVAL_MINS as i64, MAX_POLL_INTERVAL_MINS as i64) as u32
}

pub fn clamp_notification_secs(secs: i64) -> u32 {
    secs.clamp(
        MIN_NOTIFICATION_SHOWN_SECS as i64,
        MAX_NOTIFICATION_SHOWN_SECS as i64,
    ) as u32
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return DEFAULT_SOUND_VOLUME;
    }
    volume.clamp(MIN_SOUND_VOLUME, MAX_SOUND_VOLUME)
}

/// A partial change to the user-editable settings.
///
/// Numbers arrive unvalidated and are clamped when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub poll_interval_minutes: Option<i64>,
    pub notification_display_seconds: Option<i64>,
    pub play_sound: Option<bool>,
    pub sound_file: Option<PathBuf>,
    pub sound_volume: Option<f32>,
    pub start_minimized: Option<bool>,
}

impl SettingsUpdate {
    /// Apply to `config`, returning true when the poll interval changed
    pub fn apply(self, config: &mut ReminderConfig) -> bool {
        let previous_interval = config.poll_interval_minutes;

        if let Some(minutes) = self.poll_interval_minutes {
            config.poll_interval_minutes = clamp_poll_interval(minutes);
        }
        if let Some(secs) = self.notification_display_seconds {
            config.notification_display_seconds = clamp_notification_secs(secs);
        }
        if let Some(play) = self.play_sound {
            config.play_sound = play;
        }
        if let Some(file) = self.sound_file {
            config.sound_file = file;
        }
        if let Some(volume) = self.sound_volume {
            config.sound_volume = clamp_volume(volume);
        }
        if let Some(minimized) = self.start_minimized {
            config.start_minimized = minimized;
        }

        config.poll_interval_minutes != previous_interval
    }
}

/// Service for loading and saving the reminder config
pub struct SettingsService {
    storage: Box<dyn Storage>,
}

impl SettingsService {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load the config, substituting defaults for anything unreadable
    pub fn load(&self) -> ReminderConfig {
        match self.try_load() {
            Ok(config) => {
                tracing::info!(
                    "Loaded {} medication(s) from {}",
                    config.medications.len(),
                    self.storage.describe()
                );
                config
            }
            Err(e) => {
                tracing::warn!("{}; starting with default settings", e);
                ReminderConfig::default()
            }
        }
    }

    /// Load the config, reporting why it could not be read
    pub fn try_load(&self) -> Result<ReminderConfig> {
        let data = self.storage.read().map_err(|e| {
            if e.is_not_found() {
                AppError::ConfigRead(format!("{} does not exist", self.storage.describe()))
            } else {
                AppError::ConfigRead(format!("{}: {}", self.storage.describe(), e))
            }
        })?;

        let value: Value = serde_json::from_slice(&data).map_err(|e| {
            AppError::ConfigRead(format!("failed to parse {}: {}", self.storage.describe(), e))
        })?;

        if !value.is_object() {
            return Err(AppError::ConfigRead(format!(
                "{} does not contain a JSON object",
                self.storage.describe()
            )));
        }

        Ok(ReminderConfig::from_value(&value))
    }

    /// Save the config
    pub fn save(&self, config: &ReminderConfig) -> Result<()> {
        let content = serde_json::to_vec_pretty(config)?;
        self.storage.write(&content)?;
        tracing::debug!("Settings saved to {}", self.storage.describe());
        Ok(())
    }
}
