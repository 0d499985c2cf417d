//! Non-fatal diagnostics.
//!
//! Lenient situations are never errors: a value expression without a
//! number, an exhausted card pool or a clamped balance degrades gracefully
//! and leaves an entry here instead. There is no global logger; the turn
//! coordinator owns a [`DiagnosticLog`] and lends it to the components it
//! drives.

pub mod log;

pub use log::{Category, DiagnosticLog, LogEntry, LogGuard, OutputMode, Verbosity};
