//! Pipeline progress logging.
//!
//! Every entry is echoed to stderr and broadcast to subscribers. Stdout is
//! left to command payloads (JSON, reports).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth, rendered as leading spaces
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Line as echoed to stderr.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans log entries out to stderr and every subscriber
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    pub fn log(&self, entry: LogEntry) {
        eprintln!("{}", entry.render());

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

fn emit(level: LogLevel, msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry {
        level,
        message: msg.into(),
        indent,
    });
}

pub fn log_info(msg: impl Into<String>) {
    emit(LogLevel::Info, msg, 0);
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    emit(LogLevel::Info, msg, indent);
}

pub fn log_success(msg: impl Into<String>) {
    emit(LogLevel::Success, msg, 0);
}

pub fn log_warning(msg: impl Into<String>) {
    emit(LogLevel::Warning, msg, 0);
}

/// Fatal errors; the CLI reports through this before exiting.
pub fn log_error(msg: impl Into<String>) {
    emit(LogLevel::Error, msg, 0);
}

/// Drain whatever a receiver has buffered so far.
pub fn drain(rx: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(entry) => out.push(entry),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    out
}
