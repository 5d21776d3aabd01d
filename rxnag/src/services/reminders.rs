//! Reminders service
//!
//! Owns the medication list and settings, applies user actions, persists
//! after every change, and runs the poll cycle against the notifier and
//! audio collaborators.

use crate::config::NOTIFICATION_TITLE;
use crate::error::{AppError, Result};
use crate::models::{clamp_interval, MedicationRecord, MedicationStatus};
use crate::services::notifier::{resolve_sound_path, AudioPlayer, Notifier};
use crate::services::scheduler::{ReminderScheduler, TickOutcome};
use crate::services::settings::{ReminderConfig, SettingsService, SettingsUpdate};
use crate::view::ReminderView;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::rc::Rc;

/// Fields the user may change on an existing medication
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicationEdit {
    pub name: Option<String>,
    /// Clamped to at least one hour
    pub interval_hours: Option<i64>,
    pub last_taken: Option<DateTime<Utc>>,
}

/// Reminders service with the in-memory model
pub struct RemindersService {
    config: ReminderConfig,
    settings: SettingsService,
    scheduler: ReminderScheduler,
    notifier: Box<dyn Notifier>,
    audio: Box<dyn AudioPlayer>,
    view: Rc<dyn ReminderView>,
    sound_base_dir: PathBuf,
}

impl RemindersService {
    /// Load persisted state and wire up the collaborators
    pub fn new(
        settings: SettingsService,
        notifier: Box<dyn Notifier>,
        audio: Box<dyn AudioPlayer>,
        view: Rc<dyn ReminderView>,
        sound_base_dir: PathBuf,
    ) -> Self {
        let config = settings.load();
        Self {
            config,
            settings,
            scheduler: ReminderScheduler::new(),
            notifier,
            audio,
            view,
            sound_base_dir,
        }
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    pub fn medications(&self) -> &[MedicationRecord] {
        &self.config.medications
    }

    pub fn mute_all(&self) -> bool {
        self.scheduler.mute_all()
    }

    /// Absolute path of the configured sound
    pub fn sound_path(&self) -> PathBuf {
        resolve_sound_path(&self.config.sound_file, &self.sound_base_dir)
    }

    pub fn statuses(&self, now: DateTime<Utc>) -> Vec<MedicationStatus> {
        ReminderScheduler::statuses(&self.config.medications, now)
    }

    /// Add a medication, counted as taken now. Returns its index.
    pub fn add_medication(&mut self, name: &str, now: DateTime<Utc>) -> Result<usize> {
        let name = validate_name(name)?;
        tracing::info!("Adding medication: {}", name);

        self.config
            .medications
            .push(MedicationRecord::new(name, now));
        self.commit(now)?;

        Ok(self.config.medications.len() - 1)
    }

    pub fn edit_medication(
        &mut self,
        index: usize,
        edit: MedicationEdit,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let name = edit.name.as_deref().map(validate_name).transpose()?;
        let record = self.record_mut(index)?;

        if let Some(name) = name {
            record.name = name;
        }
        if let Some(hours) = edit.interval_hours {
            record.interval_hours = clamp_interval(hours);
        }
        if let Some(taken) = edit.last_taken {
            record.last_taken = Some(taken);
        }
        tracing::info!("Edited medication {}: {:?}", index + 1, record);

        self.commit(now)
    }

    pub fn delete_medication(
        &mut self,
        index: usize,
        now: DateTime<Utc>,
    ) -> Result<MedicationRecord> {
        self.record_mut(index)?;
        let removed = self.config.medications.remove(index);
        tracing::info!("Deleted medication: {}", removed.name);

        self.commit(now)?;
        Ok(removed)
    }

    pub fn mark_taken(&mut self, index: usize, now: DateTime<Utc>) -> Result<()> {
        let record = self.record_mut(index)?;
        ReminderScheduler::mark_taken(record, now);
        tracing::info!("Marked {} as taken at {}", record.name, now);

        self.commit(now)
    }

    pub fn set_muted(&mut self, index: usize, muted: bool, now: DateTime<Utc>) -> Result<()> {
        let record = self.record_mut(index)?;
        record.muted = muted;
        tracing::info!("{} {}", if muted { "Muted" } else { "Unmuted" }, record.name);

        self.commit(now)
    }

    /// Session-only; nothing is written to storage
    pub fn set_mute_all(&mut self, muted: bool, now: DateTime<Utc>) {
        self.scheduler.set_mute_all(muted);
        tracing::info!("Mute all: {}", muted);
        self.view.model_changed(&self.statuses(now));
    }

    /// Apply a settings change. Returns true when the poll timer must be
    /// restarted with the new interval.
    pub fn update_settings(&mut self, update: SettingsUpdate, now: DateTime<Utc>) -> Result<bool> {
        let interval_changed = update.apply(&mut self.config);
        tracing::info!(
            "Settings updated: poll every {} min, notification {} s, sound {} ({:?} at {:.2})",
            self.config.poll_interval_minutes,
            self.config.notification_display_seconds,
            if self.config.play_sound { "on" } else { "off" },
            self.config.sound_file,
            self.config.sound_volume
        );

        self.commit(now)?;
        Ok(interval_changed)
    }

    /// Run one poll cycle: notify every due record, play the sound at most
    /// once, then refresh the view.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let outcome = self.scheduler.on_tick(&self.config.medications, now);

        for message in &outcome.plan.messages {
            self.notifier.show_message(
                NOTIFICATION_TITLE,
                message,
                self.config.notification_display_seconds,
            );
        }

        if outcome.plan.play_audio && self.config.play_sound {
            let path = self.sound_path();
            if let Err(e) = self.audio.play(&path, self.config.sound_volume) {
                tracing::warn!("{}", e);
                self.scheduler.audio_failed();
                let title = if path.is_file() {
                    "Sound Could Not Be Played"
                } else {
                    "Sound File Not Found"
                };
                self.view.warning(title, &e.to_string());
            }
        }

        self.view.model_changed(&outcome.statuses);
        outcome
    }

    fn record_mut(&mut self, index: usize) -> Result<&mut MedicationRecord> {
        self.config
            .medications
            .get_mut(index)
            .ok_or(AppError::MedicationNotFound(index + 1))
    }

    /// Persist the current state and refresh the view
    fn commit(&self, now: DateTime<Utc>) -> Result<()> {
        self.view.model_changed(&self.statuses(now));

        self.settings.save(&self.config).map_err(|e| {
            tracing::error!("Failed to save config: {}", e);
            e
        })
    }
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "medication name cannot be empty".to_string(),
        ));
    }
    Ok(name.to_string())
}
