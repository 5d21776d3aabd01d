//! Reminder scheduler
//!
//! Pure due-dose logic. The host calls [`ReminderScheduler::on_tick`] once
//! per poll cycle; nothing in here knows about timers, files, or sound.

use crate::models::{last_taken_text, DueAlert, MedicationRecord, MedicationStatus};
use chrono::{DateTime, Duration, Utc};

/// Per-session state that is never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerState {
    /// Set once audio has been requested in the current poll cycle
    pub has_played_audio: bool,
    /// Suppresses every notification regardless of per-record mute
    pub mute_all: bool,
}

/// What to deliver for one batch of due alerts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationPlan {
    /// One message per alert, in record order
    pub messages: Vec<String>,
    pub play_audio: bool,
}

/// Result of a single poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub alerts: Vec<DueAlert>,
    pub plan: NotificationPlan,
    /// Display state for every record, due or not
    pub statuses: Vec<MedicationStatus>,
}

/// Due-dose evaluation over the medication list
#[derive(Debug, Default)]
pub struct ReminderScheduler {
    state: SchedulerState,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn mute_all(&self) -> bool {
        self.state.mute_all
    }

    pub fn set_mute_all(&mut self, muted: bool) {
        self.state.mute_all = muted;
    }

    /// When the next dose is due. `None` for a record never taken.
    pub fn next_due(record: &MedicationRecord) -> Option<DateTime<Utc>> {
        record
            .last_taken?
            .checked_add_signed(Duration::hours(i64::from(record.interval_hours)))
    }

    /// A record is due once its interval has elapsed since the last dose.
    /// Never-taken records are due immediately.
    pub fn is_due(record: &MedicationRecord, now: DateTime<Utc>) -> bool {
        match record.last_taken {
            None => true,
            // Out of the representable range means never due
            Some(_) => Self::next_due(record).is_some_and(|due| now >= due),
        }
    }

    /// Records that need a notification right now
    pub fn check_all(
        records: &[MedicationRecord],
        now: DateTime<Utc>,
        mute_all: bool,
    ) -> Vec<DueAlert> {
        if mute_all {
            return Vec::new();
        }

        records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.muted && Self::is_due(record, now))
            .map(|(index, record)| DueAlert {
                index,
                name: record.name.clone(),
            })
            .collect()
    }

    pub fn mark_taken(record: &mut MedicationRecord, now: DateTime<Utc>) {
        record.last_taken = Some(now);
    }

    /// Every alert gets a message, but audio is requested only for the
    /// first batch while the latch is open.
    pub fn notify_if_due(alerts: &[DueAlert], audio_latch: &mut bool) -> NotificationPlan {
        let messages: Vec<String> = alerts
            .iter()
            .map(|alert| format!("💊 Time to take {}", alert.name))
            .collect();

        let play_audio = !messages.is_empty() && !*audio_latch;
        if play_audio {
            *audio_latch = true;
        }

        NotificationPlan {
            messages,
            play_audio,
        }
    }

    /// Display state for every record
    pub fn statuses(records: &[MedicationRecord], now: DateTime<Utc>) -> Vec<MedicationStatus> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| MedicationStatus {
                position: index + 1,
                name: record.name.clone(),
                due: Self::is_due(record, now),
                muted: record.muted,
                interval_hours: record.interval_hours,
                last_taken_text: last_taken_text(record.last_taken, now),
                next_due: Self::next_due(record),
            })
            .collect()
    }

    /// Run one poll cycle
    pub fn on_tick(&mut self, records: &[MedicationRecord], now: DateTime<Utc>) -> TickOutcome {
        self.state.has_played_audio = false;

        let alerts = Self::check_all(records, now, self.state.mute_all);
        let plan = Self::notify_if_due(&alerts, &mut self.state.has_played_audio);
        let statuses = Self::statuses(records, now);

        tracing::debug!(
            "Poll cycle: {} record(s), {} due, audio={}",
            records.len(),
            alerts.len(),
            plan.play_audio
        );

        TickOutcome {
            alerts,
            plan,
            statuses,
        }
    }

    /// Reopen the latch after audio could not be played
    pub fn audio_failed(&mut self) {
        self.state.has_played_audio = false;
    }
}
