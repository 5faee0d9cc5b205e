//! User-facing notices.
//!
//! Diagnostic output goes through `tracing`. The entries here are the ones a
//! rendering layer shows to the person dragging cards, such as "your move
//! could not be saved".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: NoticeLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: NoticeLevel, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message,
        }
    }

    pub fn error(message: String) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

pub trait Loggable {
    fn add_log(&mut self, entry: LogEntry);
    fn get_logs(&self) -> Vec<&LogEntry>;
}

/// Bounded notice buffer; the oldest entry is dropped once full.
#[derive(Debug, Clone)]
pub struct NoticeLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Loggable for NoticeLog {
    fn add_log(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    fn get_logs(&self) -> Vec<&LogEntry> {
        self.entries.iter().collect()
    }
}
