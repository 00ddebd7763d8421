use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

pub const MONITOR_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MonitorLevel {
    #[default]
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorEntry {
    pub id: Uuid,
    pub level: MonitorLevel,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub recorded_at: DateTime<Utc>,
}

/// Diagnostic log of helpdesk activity. Lives in memory only and drops the
/// oldest entry once full.
#[derive(Debug)]
pub struct MonitorLog {
    entries: Mutex<VecDeque<MonitorEntry>>,
    capacity: usize,
}

impl Default for MonitorLog {
    fn default() -> Self {
        Self::with_capacity(MONITOR_CAPACITY)
    }
}

impl MonitorLog {
    /// Keeps at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    pub fn record(
        &self,
        level: MonitorLevel,
        event: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> MonitorEntry {
        let entry = MonitorEntry {
            id: Uuid::new_v4(),
            level,
            event: event.into(),
            details,
            recorded_at: Utc::now(),
        };

        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        entry
    }

    /// Newest first.
    pub fn snapshot(&self) -> Vec<MonitorEntry> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
