//! In-app log collection for the event log panel.
//!
//! Messages emitted through the `log` macros are mirrored into a bounded
//! buffer so the GUI can show them without a terminal. The collector is
//! installed next to `env_logger` via `multi_log`, so stderr output is
//! unaffected.

use chrono::{DateTime, Local};
use egui::Color32;
use log::{Level, Log, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const MAX_LOG_ENTRIES: usize = 1000;

/// A single captured log message.
#[derive(Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    /// Display color for the entry's severity.
    pub fn color(&self) -> Color32 {
        match self.level {
            Level::Error => Color32::from_rgb(255, 100, 100),
            Level::Warn => Color32::from_rgb(255, 255, 100),
            Level::Info => Color32::from_rgb(100, 200, 255),
            Level::Debug => Color32::from_rgb(150, 150, 150),
            Level::Trace => Color32::from_rgb(200, 150, 255),
        }
    }
}

/// Thread-safe, fixed-capacity log buffer shared with the GUI.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<VecDeque<LogEntry>>>);

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)]
    pub fn read(&self) -> std::sync::MutexGuard<'_, VecDeque<LogEntry>> {
        self.0.lock().unwrap()
    }

    #[allow(clippy::unwrap_used)]
    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// `log::Log` implementation that captures records into a `LogBuffer`.
pub struct LogCollector {
    buffer: LogBuffer,
}

impl LogCollector {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl Log for LogCollector {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        // Capture everything; the panel filters by level.
        true
    }

    #[allow(clippy::unwrap_used)]
    fn log(&self, record: &Record) {
        let mut buffer = self.buffer.0.lock().unwrap();
        if buffer.len() >= MAX_LOG_ENTRIES {
            buffer.pop_front();
        }
        buffer.push_back(LogEntry {
            timestamp: Local::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
        });
    }

    fn flush(&self) {}
}
