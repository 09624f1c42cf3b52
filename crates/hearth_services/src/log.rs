//! Log sinks for script output

use std::cell::RefCell;
use std::fmt;

/// Severity levels scripts can log at.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Info,
    Warn,
    Error,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "trace",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Receiver for script log output: five leveled streams plus a raw line sink.
pub trait LogSink {
    fn log(&self, level: LogLevel, message: &str);

    fn raw(&self, message: &str);
}

/// Forwards script logs into `tracing` under the `hearth::script` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!(target: "hearth::script", "{message}"),
            LogLevel::Info => tracing::info!(target: "hearth::script", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "hearth::script", "{message}"),
            LogLevel::Error => tracing::error!(target: "hearth::script", "{message}"),
            LogLevel::Critical => {
                tracing::error!(target: "hearth::script", critical = true, "{message}")
            }
        }
    }

    fn raw(&self, message: &str) {
        println!("{message}");
    }
}

/// A single captured entry. `None` level marks raw output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Option<LogLevel>,
    pub message: String,
}

/// Records everything in memory. Used by tests and tooling.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    entries: RefCell<Vec<LogEntry>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    pub fn take(&self) -> Vec<LogEntry> {
        self.entries.take()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        self.entries.borrow_mut().push(LogEntry {
            level: Some(level),
            message: message.to_owned(),
        });
    }

    fn raw(&self, message: &str) {
        self.entries.borrow_mut().push(LogEntry {
            level: None,
            message: message.to_owned(),
        });
    }
}
