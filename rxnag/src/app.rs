//! Application setup and main loop
//!
//! Resolves file locations, claims the single-instance lock, wires the
//! services together, and runs the event loop that multiplexes poll ticks,
//! console input, and shutdown on one thread.

use crate::cli::Args;
use crate::commands::{self, CommandOutcome};
use crate::config::{APP_DIR_NAME, CONFIG_FILE_NAME, PID_FILE_NAME};
use crate::error::{AppError, Result};
use crate::platform::PidFile;
use crate::services::{CommandAudioPlayer, DesktopNotifier, RemindersService, SettingsService};
use crate::storage::FileStorage;
use crate::view::{ConsoleView, ReminderView};
use anyhow::Context;
use chrono::Utc;
use std::future::Future;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Where RxNag keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_file: PathBuf,
    pub pid_file: PathBuf,
}

impl AppPaths {
    /// Command-line overrides win over the platform defaults
    pub fn resolve(args: &Args) -> Result<Self> {
        let config_file = match &args.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        let pid_file = match &args.pid_file {
            Some(path) => path.clone(),
            None => default_pid_path()?,
        };
        Ok(Self {
            config_file,
            pid_file,
        })
    }
}

/// `~/.local/share/rxnag/config.json` on Linux
pub fn default_config_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| AppError::Generic("Failed to find the user data directory".to_string()))?;
    Ok(data_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Runtime directory when the platform has one, cache directory otherwise
pub fn default_pid_path() -> Result<PathBuf> {
    let dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| {
            AppError::Generic("Failed to find a directory for the PID file".to_string())
        })?;
    Ok(dir.join(PID_FILE_NAME))
}

/// Timer for the poll cycle. The first tick comes one full period after
/// (re)start, and ticks missed during suspend are not replayed in a burst.
pub fn poll_timer(minutes: u32) -> Interval {
    let period = Duration::from_secs(u64::from(minutes) * 60);
    let mut timer = tokio::time::interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Resolves on Ctrl-C (SIGINT). The handler is in place once this returns.
#[cfg(unix)]
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    Ok(async move {
        interrupt.recv().await;
    })
}

/// Resolves on Ctrl-C
#[cfg(not(unix))]
pub fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
}

/// Run until the user quits or the process is interrupted
pub async fn run(args: Args) -> anyhow::Result<()> {
    let paths = AppPaths::resolve(&args)?;
    tracing::info!("Config file: {:?}", paths.config_file);

    // Installed before anything else so a Ctrl-C is never lost, even
    // during startup or while a tick is running
    let interrupted = shutdown_signal().context("Failed to listen for shutdown signal")?;
    tokio::pin!(interrupted);

    let _pid_file = PidFile::acquire(&paths.pid_file)?;

    let storage = FileStorage::new(paths.config_file.clone());
    let sound_base_dir = storage.base_dir();
    let settings = SettingsService::new(Box::new(storage));

    let view = Rc::new(ConsoleView::stdout(false));
    let mut service = RemindersService::new(
        settings,
        Box::new(DesktopNotifier::new("RxNag")),
        Box::new(CommandAudioPlayer::new()),
        view.clone() as Rc<dyn ReminderView>,
        sound_base_dir,
    );

    let hidden = args.start_hidden(service.config().start_minimized);
    view.set_visible(!hidden);
    view.print("RxNag - Medication Reminder. Type `help` for commands.");
    if !hidden {
        view.render(&service.statuses(Utc::now()));
    }

    let mut ticker = poll_timer(service.config().poll_interval_minutes);
    tracing::info!(
        "Checking for due medications every {} min",
        service.config().poll_interval_minutes
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                service.tick(Utc::now());
            }
            line = lines.next_line(), if input_open => {
                match line {
                    Ok(Some(line)) => {
                        match commands::execute(&line, &mut service, &*view, Utc::now()) {
                            CommandOutcome::Continue => {}
                            CommandOutcome::RestartTimer => {
                                ticker = poll_timer(service.config().poll_interval_minutes);
                                tracing::info!(
                                    "Poll timer restarted: every {} min",
                                    service.config().poll_interval_minutes
                                );
                            }
                            CommandOutcome::Quit => break,
                        }
                    }
                    Ok(None) => {
                        tracing::info!(
                            "Console input closed; reminders continue in the background"
                        );
                        input_open = false;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read console input: {}", e);
                        input_open = false;
                    }
                }
            }
            _ = &mut interrupted => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}
