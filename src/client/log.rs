//! Append-only activity log for one session.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Text of the transient entry shown while a request is in flight.
pub const WAITING_MESSAGE: &str = "Waiting for response...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
    Data,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl LogEntry {
    /// `HH:MM:SS` label used when rendering.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// One rendered line: a recorded entry or the in-flight placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogLine<'a> {
    Entry(&'a LogEntry),
    Waiting,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.entries.push(LogEntry {
            timestamp: Utc::now(),
            severity,
            message: message.into(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn data(&mut self, message: impl Into<String>) {
        self.push(Severity::Data, message);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replays entries in recorded order, followed by the waiting
    /// placeholder when `in_flight` is set.
    pub fn render(&self, in_flight: bool) -> impl Iterator<Item = LogLine<'_>> {
        self.entries
            .iter()
            .map(LogLine::Entry)
            .chain(in_flight.then_some(LogLine::Waiting))
    }
}
