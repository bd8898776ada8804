// crates/apisanity-providers/src/reporter.rs
// ============================================================================
// Module: Run Reporters
// Description: Console and JSON-lines sinks for run events.
// Purpose: Emit per-case outcomes and run summaries to any writer.
// Dependencies: apisanity-core, serde_json, std
// ============================================================================

//! ## Overview
//! Reporters are a side channel: a failed write is dropped rather than
//! surfaced, so a broken pipe never changes the outcome of a run.
//! [`ConsoleReporter`] prints one human-readable line per event.
//! [`JsonLinesReporter`] writes one JSON record per event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;
use std::sync::Mutex;

use apisanity_core::CaseLabel;
use apisanity_core::RunEvent;
use apisanity_core::RunReporter;
use apisanity_core::RunTally;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// ANSI green.
const GREEN: &str = "\x1b[32m";
/// ANSI red.
const RED: &str = "\x1b[31m";
/// ANSI yellow.
const YELLOW: &str = "\x1b[33m";
/// ANSI reset.
const RESET: &str = "\x1b[0m";

// ============================================================================
// SECTION: Console Reporter
// ============================================================================

/// Human-readable line reporter.
pub struct ConsoleReporter<W: Write + Send> {
    /// Output writer.
    writer: Mutex<W>,
    /// Wrap status markers in ANSI colors.
    color: bool,
}

impl<W: Write + Send> ConsoleReporter<W> {
    /// Creates a console reporter.
    pub const fn new(writer: W, color: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            color,
        }
    }

    /// Consumes the reporter and returns its writer.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer mutex is poisoned.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|_| io::Error::other("reporter writer poisoned"))
    }

    /// Formats a status marker, colored when enabled.
    fn marker(&self, label: &str, color: &str) -> String {
        if self.color { format!("{color}{label}{RESET}") } else { label.to_string() }
    }

    /// Renders one event as a single line.
    fn render(&self, event: &RunEvent) -> String {
        match event {
            RunEvent::CaseSkipped {
                case,
            } => format!("{} {}", self.marker("SKIP", YELLOW), describe(case)),
            RunEvent::CasePassed {
                case,
            } => format!("{} {}", self.marker("PASS", GREEN), describe(case)),
            RunEvent::CaseFailed {
                case,
                failure,
            } => format!("{} {}: {failure}", self.marker("FAIL", RED), describe(case)),
            RunEvent::RunAborted {
                reason,
                tally,
            } => format!("{} {reason} ({})", self.marker("ABORTED", RED), totals(tally)),
            RunEvent::RunSummary {
                tally,
            } => totals(tally),
        }
    }
}

impl<W: Write + Send> RunReporter for ConsoleReporter<W> {
    fn record(&self, event: &RunEvent) {
        let line = self.render(event);
        if let Ok(mut guard) = self.writer.lock() {
            let _ = writeln!(guard, "{line}");
        }
    }
}

// ============================================================================
// SECTION: JSON Lines Reporter
// ============================================================================

/// Reporter writing one JSON record per event.
pub struct JsonLinesReporter<W: Write + Send> {
    /// Output writer for event records.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesReporter<W> {
    /// Creates a JSON lines reporter.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the reporter and returns its writer.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer mutex is poisoned.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|_| io::Error::other("reporter writer poisoned"))
    }
}

impl<W: Write + Send> RunReporter for JsonLinesReporter<W> {
    fn record(&self, event: &RunEvent) {
        let Ok(mut guard) = self.writer.lock() else {
            return;
        };
        if serde_json::to_writer(&mut *guard, event).is_ok() {
            let _ = guard.write_all(b"\n");
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders a case label as `method path status`.
fn describe(case: &CaseLabel) -> String {
    format!("{} {} {}", case.method, case.path, case.status_code)
}

/// Renders tally totals.
fn totals(tally: &RunTally) -> String {
    format!("passes: {}, fails: {}", tally.passes, tally.fails)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
