//! Pipeline log broadcasting.
//!
//! Log entries are echoed to the terminal and sent on a broadcast channel
//! so a front end (for example a GUI console) can subscribe to them.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for display
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
    /// Nesting level for sub-steps
    #[serde(default)]
    pub indent: u8,
    /// Local time, `%Y-%m-%d %H:%M:%S`
    pub timestamp: String,
}

impl LogEntry {
    fn with_level(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(LogLevel::Error, message)
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Console line, as echoed to the terminal.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "  ",
            LogLevel::Success => "✓",
            LogLevel::Warning => "⚠️",
            LogLevel::Error => "❌",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{} | {}{} {}", self.timestamp, indent, prefix, self.message)
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
    echo: AtomicBool,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self {
            sender,
            echo: AtomicBool::new(true),
        }
    }

    /// Send a log entry to all subscribers
    pub fn log(&self, entry: LogEntry) {
        if self.echo.load(Ordering::Relaxed) {
            eprintln!("{}", entry.render());
        }

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

    /// Get a receiver for streaming entries
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }

    /// Toggle terminal echo, e.g. while a progress bar owns the terminal.
    pub fn set_echo(&self, echo: bool) {
        self.echo.store(echo, Ordering::Relaxed);
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::info(msg).with_indent(indent));
}
