//! Console view
//!
//! The thin presentation layer. The reminder service pushes model changes
//! and warnings through [`ReminderView`]; [`ConsoleView`] renders them as
//! text and can be shown or hidden like a window.

use crate::models::MedicationStatus;
use chrono::Local;
use std::cell::{Cell, RefCell};
use std::io::{Stdout, Write};

/// Receives model-change notifications from the reminder service
pub trait ReminderView {
    /// Called after every mutation and poll cycle with the full list
    fn model_changed(&self, statuses: &[MedicationStatus]);

    /// A non-fatal problem the user should see even when hidden
    fn warning(&self, title: &str, message: &str);
}

/// Renders the medication list as plain text
pub struct ConsoleView<W: Write> {
    out: RefCell<W>,
    visible: Cell<bool>,
}

impl ConsoleView<Stdout> {
    pub fn stdout(visible: bool) -> Self {
        Self::new(std::io::stdout(), visible)
    }
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W, visible: bool) -> Self {
        Self {
            out: RefCell::new(out),
            visible: Cell::new(visible),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    /// Write a line regardless of visibility (command feedback)
    pub fn print(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        // Console output is best effort; a closed stdout must not stop reminders
        let _ = writeln!(out, "{}", text);
        let _ = out.flush();
    }

    /// Render the list even when hidden, for an explicit `list`
    pub fn render(&self, statuses: &[MedicationStatus]) {
        self.print(&format_statuses(statuses));
    }

    /// Consume the view and return the writer, for tests
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> ReminderView for ConsoleView<W> {
    fn model_changed(&self, statuses: &[MedicationStatus]) {
        if self.is_visible() {
            self.render(statuses);
        }
    }

    fn warning(&self, title: &str, message: &str) {
        self.print(&format!("Warning - {}: {}", title, message));
    }
}

/// Text block for the medication list
pub fn format_statuses(statuses: &[MedicationStatus]) -> String {
    if statuses.is_empty() {
        return "No medications yet. Use `add <name>` to add one.".to_string();
    }

    let mut lines = Vec::with_capacity(statuses.len() * 2);
    for status in statuses {
        let mut flags = String::new();
        if status.due {
            flags.push_str("  [DUE]");
        }
        if status.muted {
            flags.push_str("  [muted]");
        }

        lines.push(format!(
            "{:>3}. {} (every {}h){}",
            status.position, status.name, status.interval_hours, flags
        ));

        let next = match status.next_due {
            Some(due) => format!(
                "next due {}",
                due.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ),
            // No due time: never taken, or too far out to represent
            None if status.due => "due now".to_string(),
            None => "never due".to_string(),
        };
        lines.push(format!("     {}, {}", status.last_taken_text, next));
    }

    lines.join("\n")
}
