//! Error types for RxNag
//!
//! All errors use thiserror for structured error handling.
//! Only `AlreadyRunning` is fatal; everything else is reported and the
//! reminder loop keeps going.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not read config: {0}")]
    ConfigRead(String),

    #[error("The sound file '{}' could not be played: {reason}", path.display())]
    AudioResource { path: PathBuf, reason: String },

    /// PID of the running instance, 0 if it has not written one yet
    #[error("Another instance of RxNag is already running{}", running_pid(.0))]
    AlreadyRunning(u32),

    #[error("No medication at position {0}")]
    MedicationNotFound(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Whether the storage layer reported a missing file rather than a
    /// broken one.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

fn running_pid(pid: &u32) -> String {
    if *pid == 0 {
        String::new()
    } else {
        format!(" (PID {})", pid)
    }
}
