//! Integration tests for RxNag
//!
//! These tests verify end-to-end functionality including:
//! - Config file persistence and lenient loading
//! - Poll cycles with notifications and audio
//! - Console command flows
//! - Single-instance enforcement

use chrono::{DateTime, Duration, TimeZone, Utc};
use rxnag::commands::{self, CommandOutcome};
use rxnag::error::{AppError, Result};
use rxnag::models::MedicationStatus;
use rxnag::platform::PidFile;
use rxnag::services::{
    AudioPlayer, CommandAudioPlayer, Notifier, RemindersService, SettingsService,
};
use rxnag::storage::FileStorage;
use rxnag::view::{ConsoleView, ReminderView};
use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct RecordingNotifier {
    messages: Rc<RefCell<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    fn show_message(&self, _title: &str, body: &str, _duration_secs: u32) {
        self.messages.borrow_mut().push(body.to_string());
    }
}

#[derive(Clone, Default)]
struct RecordingAudio {
    played: Rc<RefCell<Vec<PathBuf>>>,
}

impl AudioPlayer for RecordingAudio {
    fn play(&self, path: &Path, _volume: f32) -> Result<()> {
        self.played.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingView {
    updates: Rc<RefCell<Vec<Vec<MedicationStatus>>>>,
    warnings: Rc<RefCell<Vec<String>>>,
}

impl ReminderView for RecordingView {
    fn model_changed(&self, statuses: &[MedicationStatus]) {
        self.updates.borrow_mut().push(statuses.to_vec());
    }

    fn warning(&self, title: &str, _message: &str) {
        self.warnings.borrow_mut().push(title.to_string());
    }
}

/// Console output captured in memory
#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

fn config_path(dir: &TempDir) -> PathBuf {
    dir.path().join("config.json")
}

/// Helper to build a service over a config file in a temp directory
fn open_service(
    dir: &TempDir,
    audio: Box<dyn AudioPlayer>,
) -> (RemindersService, RecordingNotifier, RecordingView) {
    let storage = FileStorage::new(config_path(dir));
    let base_dir = storage.base_dir();
    let notifier = RecordingNotifier::default();
    let view = RecordingView::default();

    let service = RemindersService::new(
        SettingsService::new(Box::new(storage)),
        Box::new(notifier.clone()),
        audio,
        Rc::new(view.clone()),
        base_dir,
    );

    (service, notifier, view)
}

#[tokio::test]
async fn test_add_take_and_reload() {
    let temp = TempDir::new().unwrap();

    {
        let (mut service, _notifier, _view) =
            open_service(&temp, Box::new(RecordingAudio::default()));
        assert!(service.medications().is_empty());

        service.add_medication("Ibuprofen", t0()).unwrap();
        service.add_medication("Vitamin D", t0()).unwrap();
        service.mark_taken(1, t0() + Duration::hours(2)).unwrap();
        service.set_muted(0, true, t0() + Duration::hours(2)).unwrap();
    }

    let (service, _notifier, _view) = open_service(&temp, Box::new(RecordingAudio::default()));
    let meds = service.medications();
    assert_eq!(meds.len(), 2);
    assert_eq!(meds[0].name, "Ibuprofen");
    assert!(meds[0].muted);
    assert_eq!(meds[1].last_taken, Some(t0() + Duration::hours(2)));
    assert_eq!(meds[1].interval_hours, 6);
}

#[tokio::test]
async fn test_corrupt_config_starts_empty_then_recovers() {
    let temp = TempDir::new().unwrap();
    std::fs::write(config_path(&temp), "{ this is not json").unwrap();

    let (mut service, _notifier, _view) = open_service(&temp, Box::new(RecordingAudio::default()));
    assert!(service.medications().is_empty());
    assert_eq!(service.config().poll_interval_minutes, 5);
    assert_eq!(service.config().notification_display_seconds, 6);

    // The first change overwrites the corrupt file with a valid one
    service.add_medication("Aspirin", t0()).unwrap();

    let raw = std::fs::read_to_string(config_path(&temp)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["medications"][0]["name"], "Aspirin");
    assert_eq!(value["notification_timer_mins"], 5);
}

#[tokio::test]
async fn test_legacy_config_loads_with_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        config_path(&temp),
        r#"{
            "medications": [
                {"name": "Metformin", "last_taken": 0, "interval": 12},
                {"name": "Statin", "last_taken": "2024-05-01T06:00:00Z", "interval": 0}
            ],
            "sound_volume": 3.5
        }"#,
    )
    .unwrap();

    let (service, _notifier, _view) = open_service(&temp, Box::new(RecordingAudio::default()));
    let meds = service.medications();
    assert_eq!(meds.len(), 2);
    assert_eq!(meds[0].last_taken, None);
    assert_eq!(meds[0].interval_hours, 12);
    assert!(!meds[0].muted);
    assert_eq!(meds[1].interval_hours, 1);
    assert_eq!(service.config().sound_volume, 1.0);
    assert!(service.config().play_sound);
    assert!(!service.config().start_minimized);
}

#[tokio::test]
async fn test_poll_cycle_notifies_due_records_once_with_sound() {
    let temp = TempDir::new().unwrap();
    let audio = RecordingAudio::default();
    let (mut service, notifier, view) = open_service(&temp, Box::new(audio.clone()));

    service.add_medication("Ibuprofen", t0()).unwrap();
    service.add_medication("Paracetamol", t0()).unwrap();
    service.add_medication("Quiet", t0()).unwrap();
    service.set_muted(2, true, t0()).unwrap();

    let outcome = service.tick(t0() + Duration::hours(1));
    assert!(outcome.alerts.is_empty());
    assert!(notifier.messages.borrow().is_empty());

    let outcome = service.tick(t0() + Duration::hours(6));
    assert_eq!(outcome.alerts.len(), 2);
    assert_eq!(
        *notifier.messages.borrow(),
        vec!["💊 Time to take Ibuprofen", "💊 Time to take Paracetamol"]
    );
    assert_eq!(audio.played.borrow().len(), 1);
    assert_eq!(audio.played.borrow()[0], temp.path().join("reminder.wav"));

    let last = view.updates.borrow().last().cloned().unwrap();
    assert!(last[0].due);
    assert!(!last[2].due);
}

#[tokio::test]
async fn test_missing_sound_file_warns_but_still_notifies() {
    let temp = TempDir::new().unwrap();
    let (mut service, notifier, view) = open_service(&temp, Box::new(CommandAudioPlayer::new()));

    service.add_medication("Ibuprofen", t0()).unwrap();
    let due_at = t0() + Duration::hours(7);

    service.tick(due_at);
    assert_eq!(notifier.messages.borrow().len(), 1);
    assert_eq!(*view.warnings.borrow(), vec!["Sound File Not Found"]);

    // Each cycle tries once and warns once
    service.tick(due_at + Duration::minutes(5));
    assert_eq!(notifier.messages.borrow().len(), 2);
    assert_eq!(view.warnings.borrow().len(), 2);
}

#[tokio::test]
async fn test_mute_all_is_session_only() {
    let temp = TempDir::new().unwrap();

    {
        let (mut service, notifier, _view) =
            open_service(&temp, Box::new(RecordingAudio::default()));
        service.add_medication("Ibuprofen", t0()).unwrap();
        service.set_mute_all(true, t0());

        service.tick(t0() + Duration::hours(8));
        assert!(notifier.messages.borrow().is_empty());
    }

    let (mut service, notifier, _view) = open_service(&temp, Box::new(RecordingAudio::default()));
    assert!(!service.mute_all());
    service.tick(t0() + Duration::hours(8));
    assert_eq!(notifier.messages.borrow().len(), 1);
}

#[tokio::test]
async fn test_console_session() {
    let temp = TempDir::new().unwrap();
    let out = SharedBuffer::default();
    let console = Rc::new(ConsoleView::new(out.clone(), true));
    let notifier = RecordingNotifier::default();
    let storage = FileStorage::new(config_path(&temp));
    let base_dir = storage.base_dir();

    let mut service = RemindersService::new(
        SettingsService::new(Box::new(storage)),
        Box::new(notifier.clone()),
        Box::new(RecordingAudio::default()),
        console.clone() as Rc<dyn ReminderView>,
        base_dir,
    );

    let now = Utc::now();
    let run = |service: &mut RemindersService, line: &str| {
        commands::execute(line, service, &*console, now)
    };

    assert_eq!(run(&mut service, "add Ibuprofen"), CommandOutcome::Continue);
    assert!(out.text().contains("Added Ibuprofen at position 1"));

    run(&mut service, "edit 1 interval 8");
    assert_eq!(service.medications()[0].interval_hours, 8);

    out.clear();
    run(&mut service, "take 4");
    assert!(out.text().contains("No medication at position 4"));

    out.clear();
    run(&mut service, "bogus");
    assert!(out.text().contains("unknown command"));

    assert_eq!(run(&mut service, "set timer-mins 15"), CommandOutcome::RestartTimer);
    assert_eq!(service.config().poll_interval_minutes, 15);
    assert_eq!(run(&mut service, "set timer-mins 15"), CommandOutcome::Continue);

    run(&mut service, "hide");
    assert!(!console.is_visible());
    out.clear();
    run(&mut service, "mute 1");
    assert!(!out.text().contains("Last taken"));

    run(&mut service, "show");
    assert!(console.is_visible());
    assert!(out.text().contains("Ibuprofen"));

    assert_eq!(run(&mut service, "quit"), CommandOutcome::Quit);

    let raw = std::fs::read_to_string(config_path(&temp)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["notification_timer_mins"], 15);
    assert_eq!(value["medications"][0]["interval"], 8);
    assert_eq!(value["medications"][0]["muted"], true);
}

#[tokio::test]
async fn test_console_delete_asks_for_confirmation() {
    let temp = TempDir::new().unwrap();
    let out = SharedBuffer::default();
    let console = Rc::new(ConsoleView::new(out.clone(), false));
    let storage = FileStorage::new(config_path(&temp));
    let base_dir = storage.base_dir();

    let mut service = RemindersService::new(
        SettingsService::new(Box::new(storage)),
        Box::new(RecordingNotifier::default()),
        Box::new(RecordingAudio::default()),
        console.clone() as Rc<dyn ReminderView>,
        base_dir,
    );
    let now = Utc::now();

    commands::execute("add Ibuprofen", &mut service, &*console, now);
    out.clear();

    commands::execute("delete 1", &mut service, &*console, now);
    assert!(out
        .text()
        .contains("Are you sure you wish to remove Ibuprofen?"));
    assert_eq!(service.medications().len(), 1);

    out.clear();
    commands::execute("delete 1 yes", &mut service, &*console, now);
    assert!(out.text().contains("Removed Ibuprofen"));
    assert!(service.medications().is_empty());

    let raw = std::fs::read_to_string(config_path(&temp)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["medications"].as_array().unwrap().len(), 0);
}

/// Start the real binary in the background and wait until it holds the
/// PID file
#[cfg(unix)]
fn spawn_instance(temp: &TempDir, pid_path: &Path) -> std::process::Child {
    use std::process::{Command, Stdio};

    let child = Command::new(env!("CARGO_BIN_EXE_rxnag"))
        .arg("--minimized")
        .arg("--config")
        .arg(config_path(temp))
        .arg("--pid-file")
        .arg(pid_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let expected = child.id().to_string();
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    while std::fs::read_to_string(pid_path).unwrap_or_default() != expected {
        assert!(std::time::Instant::now() < deadline, "instance never wrote its PID");
        std::thread::sleep(std::time::Duration::from_millis(20));
    }

    child
}

#[cfg(unix)]
#[test]
fn test_interrupt_shuts_down_cleanly() {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let temp = TempDir::new().unwrap();
    let pid_path = temp.path().join("rxnag.pid");
    let mut running = spawn_instance(&temp, &pid_path);

    kill(Pid::from_raw(running.id() as i32), Signal::SIGINT).unwrap();

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
    let status = loop {
        if let Some(status) = running.try_wait().unwrap() {
            break status;
        }
        assert!(std::time::Instant::now() < deadline, "instance ignored SIGINT");
        std::thread::sleep(std::time::Duration::from_millis(20));
    };

    assert!(status.success());
    assert!(!pid_path.exists());
}

#[cfg(unix)]
#[test]
fn test_second_instance_is_refused() {
    let temp = TempDir::new().unwrap();
    let pid_path = temp.path().join("run").join("rxnag.pid");
    let mut running = spawn_instance(&temp, &pid_path);

    match PidFile::acquire(&pid_path) {
        Err(AppError::AlreadyRunning(pid)) => assert_eq!(pid, running.id()),
        other => panic!("expected AlreadyRunning, got {:?}", other),
    }

    // A killed instance leaves its file behind but not its lock
    running.kill().unwrap();
    running.wait().unwrap();
    assert!(pid_path.exists());

    let claimed = PidFile::acquire(&pid_path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&pid_path).unwrap(),
        std::process::id().to_string()
    );
    drop(claimed);
    assert!(!pid_path.exists());
}
