//! Observability - the agent's event journal.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A journaled agent event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub mode: Option<String>,
    pub message: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl BotEvent {
    pub fn new(event_type: &str, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            mode: None,
            message: message.into(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_mode(mut self, mode: impl ToString) -> Self {
        self.mode = Some(mode.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Appends events to `<data_dir>/events.jsonl`.
pub struct EventEmitter {
    events_path: PathBuf,
}

impl EventEmitter {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            events_path: data_dir.join("events.jsonl"),
        }
    }

    /// Emit an event.
    pub fn emit(&self, event: BotEvent) -> Result<()> {
        if let Some(parent) = self.events_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)?;

        let line = serde_json::to_string(&event)?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// Emit and log instead of failing; the journal never stops the agent.
    pub fn record(&self, event: BotEvent) {
        if let Err(e) = self.emit(event) {
            tracing::warn!(error = %e, path = %self.events_path.display(), "failed to journal event");
        }
    }

    /// Read recent events.
    pub fn read_recent(&self, limit: usize) -> Vec<BotEvent> {
        let file = match std::fs::File::open(&self.events_path) {
            Ok(f) => f,
            Err(_) => return Vec::new(),
        };

        let reader = BufReader::new(file);
        let mut events: Vec<BotEvent> = reader
            .lines()
            .map_while(|line| line.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        if events.len() > limit {
            events.drain(0..events.len() - limit);
        }

        events
    }
}
