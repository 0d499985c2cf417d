//! Captured diagnostic log.
//!
//! Entries are owned strings kept in a `RefCell` buffer so that engine
//! components holding `&DiagnosticLog` can record without threading a
//! mutable borrow through every call.

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// How much is written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Nothing.
    Silent = 0,
    /// Warnings: lenient defaults, clamped balances, exhausted pools.
    Minimal = 1,
    /// Turn transitions and applied directives (default).
    #[default]
    Normal = 2,
    /// Everything, including skipped directives and choice bookkeeping.
    Verbose = 3,
}

/// Output destination for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Write to stderr only.
    Stderr,
    /// Capture to the in-memory buffer only (default).
    #[default]
    Memory,
    /// Both stderr and the in-memory buffer.
    Both,
}

/// What part of the engine produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Lenient configuration coercion.
    Coerce,
    /// Card pools and hands.
    Cards,
    /// Directive application.
    Effects,
    /// Turn state transitions.
    Turn,
    /// Choice offers and resolutions.
    Choice,
    /// AI decision requests.
    Ai,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Coerce => "coerce",
            Category::Cards => "cards",
            Category::Effects => "effects",
            Category::Turn => "turn",
            Category::Choice => "choice",
            Category::Ai => "ai",
        };
        f.write_str(name)
    }
}

/// A captured log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Verbosity level of this entry.
    pub level: Verbosity,
    /// Producing component.
    pub category: Category,
    /// Message text.
    pub message: String,
}

/// Read-only access to captured entries.
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl Deref for LogGuard<'_> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Diagnostic sink owned by the turn coordinator.
///
/// ## Example
///
/// ```
/// use rust_board::diagnostics::{Category, DiagnosticLog, Verbosity};
///
/// let log = DiagnosticLog::new();
/// log.minimal(Category::Coerce, "no number in \"Draw some\", using 0");
///
/// assert_eq!(log.entries().len(), 1);
/// assert_eq!(log.entries()[0].level, Verbosity::Minimal);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    verbosity: Verbosity,
    output_mode: OutputMode,
    buffer: RefCell<Vec<LogEntry>>,
}

impl DiagnosticLog {
    /// Capture-only log at `Normal` verbosity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log with the given stderr verbosity.
    #[must_use]
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            ..Self::default()
        }
    }

    /// Builder: set the output mode.
    #[must_use]
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Current verbosity.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Set verbosity.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Current output mode.
    #[must_use]
    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Set output mode.
    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    /// Log a warning-grade message.
    pub fn minimal(&self, category: Category, message: impl Into<String>) {
        self.record(Verbosity::Minimal, category, message.into());
    }

    /// Log a routine message.
    pub fn normal(&self, category: Category, message: impl Into<String>) {
        self.record(Verbosity::Normal, category, message.into());
    }

    /// Log a detail message.
    pub fn verbose(&self, category: Category, message: impl Into<String>) {
        self.record(Verbosity::Verbose, category, message.into());
    }

    /// Captured entries, oldest first.
    pub fn entries(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.buffer.borrow(),
        }
    }

    /// Captured entries of one category (cloned).
    #[must_use]
    pub fn entries_in(&self, category: Category) -> Vec<LogEntry> {
        self.buffer
            .borrow()
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    /// Drop all captured entries.
    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }

    fn record(&self, level: Verbosity, category: Category, message: String) {
        let capture = matches!(self.output_mode, OutputMode::Memory | OutputMode::Both);
        let output = matches!(self.output_mode, OutputMode::Stderr | OutputMode::Both);

        if output && level <= self.verbosity {
            eprintln!("[{category}] {message}");
        }
        if capture {
            self.buffer.borrow_mut().push(LogEntry {
                level,
                category,
                message,
            });
        }
    }
}
