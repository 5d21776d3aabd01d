//! Services module
//!
//! Business logic that sits between the console commands and storage.

pub mod notifier;
pub mod reminders;
pub mod scheduler;
pub mod settings;

pub use notifier::{AudioPlayer, CommandAudioPlayer, DesktopNotifier, Notifier};
pub use reminders::{MedicationEdit, RemindersService};
pub use scheduler::{NotificationPlan, ReminderScheduler, SchedulerState, TickOutcome};
pub use settings::{ReminderConfig, SettingsService, SettingsUpdate};
