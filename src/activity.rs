use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

use crate::config::data_dir;
use crate::model::kind::ResourceKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEvent {
    pub timestamp: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResourceKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    pub message: String,
}

pub fn new_event(
    action: &str,
    kind: Option<ResourceKind>,
    entry: Option<&str>,
    message: &str,
) -> ActivityEvent {
    ActivityEvent {
        timestamp: chrono::Utc::now().to_rfc3339(),
        action: action.to_string(),
        kind,
        entry: entry.map(String::from),
        message: message.to_string(),
    }
}

/// Where human-readable status text goes.
pub trait StatusSink: Send + Sync {
    fn log(&self, event: &ActivityEvent);
}

/// Prints each message on stdout.
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn log(&self, event: &ActivityEvent) {
        println!("{}", event.message);
    }
}

/// Appends events to a JSONL file.
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::at(data_dir().join("activity.jsonl"))
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append_event(&self, event: &ActivityEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(event)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// The last `limit` events, oldest first. Unreadable lines are skipped.
    pub fn read_events(&self, limit: Option<usize>) -> Vec<ActivityEvent> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        let mut events: Vec<ActivityEvent> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        if let Some(limit) = limit {
            let len = events.len();
            if len > limit {
                events = events.split_off(len - limit);
            }
        }

        events
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for ActivityLog {
    fn log(&self, event: &ActivityEvent) {
        if let Err(e) = self.append_event(event) {
            tracing::warn!(path = %self.path.display(), "failed to write activity log: {e}");
        }
    }
}

/// Forwards every event to each inner sink in order.
pub struct Fanout(pub Vec<Box<dyn StatusSink>>);

impl StatusSink for Fanout {
    fn log(&self, event: &ActivityEvent) {
        for sink in &self.0 {
            sink.log(event);
        }
    }
}
