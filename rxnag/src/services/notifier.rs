//! Notification collaborators
//!
//! Desktop popups go through `notify-rust`; sounds are handed to the
//! platform's command-line player. Both sit behind traits so the reminder
//! service can be driven with fakes.

use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// Shows a transient message to the user
pub trait Notifier {
    /// Fire-and-forget; failures are logged by the implementation
    fn show_message(&self, title: &str, body: &str, duration_secs: u32);
}

/// Plays the reminder sound
pub trait AudioPlayer {
    /// Start playback of `path` at `volume` in `[0.0, 1.0]`.
    ///
    /// Fails with `AudioResource` when the file is missing or no player
    /// could be started.
    fn play(&self, path: &Path, volume: f32) -> Result<()>;
}

/// Desktop notification bubble via the session's notification daemon
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn show_message(&self, title: &str, body: &str, duration_secs: u32) {
        let timeout = notify_rust::Timeout::Milliseconds(duration_secs.saturating_mul(1000));

        if let Err(e) = notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(title)
            .body(body)
            .timeout(timeout)
            .show()
        {
            tracing::error!("Failed to send notification: {}", e);
            return;
        }

        tracing::info!("Notification sent: {}", body);
    }
}

/// Plays sounds by spawning `paplay` (Linux), `afplay` (macOS) or
/// PowerShell (Windows) without waiting for playback to finish
#[derive(Debug, Clone, Default)]
pub struct CommandAudioPlayer;

impl CommandAudioPlayer {
    pub fn new() -> Self {
        Self
    }
}

/// Program and arguments used to play `path` on this platform
pub fn player_command(path: &Path, volume: f32) -> (String, Vec<String>) {
    let volume = volume.clamp(0.0, 1.0);
    let file = path.display().to_string();

    if cfg!(target_os = "macos") {
        (
            "afplay".to_string(),
            vec!["-v".to_string(), format!("{:.2}", volume), file],
        )
    } else if cfg!(target_os = "windows") {
        (
            "powershell".to_string(),
            vec![
                "-NoProfile".to_string(),
                "-Command".to_string(),
                format!(
                    "(New-Object Media.SoundPlayer '{}').PlaySync()",
                    file.replace('\'', "''")
                ),
            ],
        )
    } else {
        // paplay volume is linear, 65536 = 100%
        (
            "paplay".to_string(),
            vec![format!("--volume={}", (volume * 65536.0).round() as u32), file],
        )
    }
}

impl AudioPlayer for CommandAudioPlayer {
    fn play(&self, path: &Path, volume: f32) -> Result<()> {
        if !path.is_file() {
            return Err(AppError::AudioResource {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let (program, args) = player_command(path, volume);

        // tokio reaps the child once it exits, so dropping the handle is fine
        tokio::process::Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AppError::AudioResource {
                path: path.to_path_buf(),
                reason: format!("failed to start {}: {}", program, e),
            })?;

        tracing::debug!("Playing {:?} at volume {:.2}", path, volume);

        Ok(())
    }
}

/// Resolve the configured sound file. Relative paths are taken relative to
/// the directory holding the config file.
pub fn resolve_sound_path(sound_file: &Path, base_dir: &Path) -> PathBuf {
    if sound_file.is_absolute() {
        sound_file.to_path_buf()
    } else {
        base_dir.join(sound_file)
    }
}
