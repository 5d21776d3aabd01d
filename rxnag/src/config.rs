//! Application configuration constants
//!
//! Central location for defaults, validation boundaries, and fixed names
//! used throughout the application.

// ===== Files =====

/// Directory name under the platform data/runtime directories
pub const APP_DIR_NAME: &str = "rxnag";

/// Persisted state file name inside the app data directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Single-instance PID file name
pub const PID_FILE_NAME: &str = "rxnag.pid";

// ===== Poll Timer Limits =====

/// Minimum poll interval in minutes (no precision below one minute)
pub const MIN_POLL_INTERVAL_MINS: u32 = 1;

/// Maximum poll interval in minutes
pub const MAX_POLL_INTERVAL_MINS: u32 = 60;

/// Poll interval used when the persisted file does not specify one
pub const DEFAULT_POLL_INTERVAL_MINS: u32 = 5;

// ===== Notification Limits =====

/// Minimum time a desktop notification stays on screen, in seconds
pub const MIN_NOTIFICATION_SHOWN_SECS: u32 = 1;

/// Maximum time a desktop notification stays on screen, in seconds
pub const MAX_NOTIFICATION_SHOWN_SECS: u32 = 60;

/// Default notification display time, in seconds
pub const DEFAULT_NOTIFICATION_SHOWN_SECS: u32 = 6;

/// Title of every reminder notification
pub const NOTIFICATION_TITLE: &str = "Medication Reminder";

// ===== Sound =====

/// Default reminder sound, resolved against the config directory
pub const DEFAULT_SOUND_FILE: &str = "reminder.wav";

/// Default playback volume
pub const DEFAULT_SOUND_VOLUME: f32 = 0.75;

pub const MIN_SOUND_VOLUME: f32 = 0.0;
pub const MAX_SOUND_VOLUME: f32 = 1.0;

// ===== Medications =====

/// Smallest allowed dosing interval in hours
pub const MIN_INTERVAL_HOURS: u32 = 1;

/// Interval given to newly added medications
pub const DEFAULT_INTERVAL_HOURS: u32 = 6;

/// Format accepted when the user edits a last-taken time by hand
pub const LAST_TAKEN_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";
