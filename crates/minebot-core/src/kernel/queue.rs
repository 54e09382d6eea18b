//! Action queue - sequential execution of chat commands.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use uuid::Uuid;

use crate::commands::Command;

/// A command waiting for (or undergoing) execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub command: Command,
    /// Player who issued the command
    pub actor: String,
    pub enqueued_at: DateTime<Utc>,
    pub priority: bool,
}

impl QueueEntry {
    pub fn new(command: Command, actor: &str, priority: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            command,
            actor: actor.to_string(),
            enqueued_at: Utc::now(),
            priority,
        }
    }
}

/// Runs dequeued entries.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute an entry to completion.
    async fn execute(&self, entry: &QueueEntry) -> anyhow::Result<()>;

    /// Called after `execute` failed or panicked.
    async fn report_failure(&self, entry: &QueueEntry, error: &str) {
        let _ = (entry, error);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueStatus {
    pub pending: Vec<QueueEntry>,
    pub in_flight: Option<QueueEntry>,
    pub paused: bool,
    pub running: bool,
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<QueueEntry>,
    in_flight: Option<QueueEntry>,
    /// A consumer task exists
    running: bool,
    paused: bool,
}

struct QueueInner {
    state: Mutex<QueueState>,
    executor: Arc<dyn CommandExecutor>,
    delay: Duration,
}

impl QueueInner {
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// FIFO of commands with a single consumer.
///
/// At most one entry executes at any instant. The consumer task is spawned
/// on demand and exits once the queue is drained or paused.
#[derive(Clone)]
pub struct ActionQueue {
    inner: Arc<QueueInner>,
}

impl ActionQueue {
    pub fn new(executor: Arc<dyn CommandExecutor>, delay: Duration) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                executor,
                delay,
            }),
        }
    }

    /// Append a command (or put it at the head when `priority`) and make sure
    /// a consumer is running.
    pub fn enqueue(&self, command: Command, actor: &str, priority: bool) -> Uuid {
        let entry = QueueEntry::new(command, actor, priority);
        let id = entry.id;

        let mut state = self.inner.state();
        tracing::debug!(
            entry_id = %id,
            command = %entry.command,
            priority,
            pending = state.pending.len(),
            "command queued"
        );
        if priority {
            state.pending.push_front(entry);
        } else {
            state.pending.push_back(entry);
        }
        self.ensure_consumer(&mut state);
        id
    }

    fn ensure_consumer(&self, state: &mut QueueState) {
        if state.running || state.paused || state.pending.is_empty() {
            return;
        }
        state.running = true;
        tokio::spawn(consume(self.inner.clone()));
    }

    /// Drop every pending entry. The in-flight entry is left alone.
    pub fn clear(&self) -> usize {
        let mut state = self.inner.state();
        let dropped = state.pending.len();
        state.pending.clear();
        tracing::info!(dropped, "queue cleared");
        dropped
    }

    pub fn pause(&self) {
        self.inner.state().paused = true;
        tracing::info!("queue paused");
    }

    pub fn resume(&self) {
        let mut state = self.inner.state();
        state.paused = false;
        self.ensure_consumer(&mut state);
        tracing::info!(pending = state.pending.len(), "queue resumed");
    }

    pub fn status(&self) -> QueueStatus {
        let state = self.inner.state();
        QueueStatus {
            pending: state.pending.iter().cloned().collect(),
            in_flight: state.in_flight.clone(),
            paused: state.paused,
            running: state.running,
        }
    }

    pub fn is_idle(&self) -> bool {
        let state = self.inner.state();
        state.in_flight.is_none() && state.pending.is_empty()
    }
}

async fn consume(inner: Arc<QueueInner>) {
    loop {
        let entry = {
            let mut state = inner.state();
            let next = if state.paused {
                None
            } else {
                state.pending.pop_front()
            };
            match next {
                Some(entry) => {
                    state.in_flight = Some(entry.clone());
                    entry
                }
                None => {
                    state.running = false;
                    return;
                }
            }
        };

        tracing::info!(entry_id = %entry.id, command = %entry.command, actor = %entry.actor, "executing command");
        match AssertUnwindSafe(inner.executor.execute(&entry))
            .catch_unwind()
            .await
        {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(entry_id = %entry.id, command = %entry.command, error = %e, "command failed");
                inner.executor.report_failure(&entry, &e.to_string()).await;
            }
            Err(_) => {
                tracing::error!(entry_id = %entry.id, command = %entry.command, "command panicked");
                inner.executor.report_failure(&entry, "Something went wrong.").await;
            }
        }

        inner.state().in_flight = None;
        tokio::time::sleep(inner.delay).await;
    }
}
