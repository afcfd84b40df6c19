use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevAction {
    Sync,
    Reload,
    Status,
    Cleanup,
}

impl DevAction {
    pub const ALL: [DevAction; 4] = [DevAction::Sync, DevAction::Reload, DevAction::Status, DevAction::Cleanup];

    pub fn as_str(&self) -> &'static str {
        match self {
            DevAction::Sync => "sync",
            DevAction::Reload => "reload",
            DevAction::Status => "status",
            DevAction::Cleanup => "cleanup",
        }
    }

    /// Actions that work before the gateway reports READY.
    pub fn allowed_while_starting(&self) -> bool {
        matches!(self, DevAction::Sync | DevAction::Status)
    }
}

impl fmt::Display for DevAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DevAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DevAction::ALL
            .iter()
            .copied()
            .find(|a| a.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandRecord {
    pub user_id: u64,
    pub display_name: String,
    pub action: DevAction,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// Bounded log of recent developer commands; the oldest record is evicted
/// first. Kept in memory only.
pub struct CommandHistory {
    capacity: usize,
    records: Mutex<VecDeque<CommandRecord>>,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, records: Mutex::new(VecDeque::with_capacity(capacity + 1)) }
    }

    pub fn record(&self, user_id: u64, display_name: &str, action: DevAction, success: bool) {
        let record = CommandRecord {
            user_id,
            display_name: display_name.to_string(),
            action,
            success,
            timestamp: Utc::now(),
        };
        if let Ok(mut records) = self.records.lock() {
            records.push_back(record);
            while records.len() > self.capacity {
                records.pop_front();
            }
        }
    }

    /// Up to `n` records, newest first.
    pub fn recent(&self, n: usize) -> Vec<CommandRecord> {
        self.records
            .lock()
            .map(|records| records.iter().rev().take(n).cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
