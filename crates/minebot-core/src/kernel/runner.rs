//! Runner - executes queued commands against the agent context.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::agent::AgentContext;
use crate::commands;
use crate::observability::BotEvent;

use super::queue::{CommandExecutor, QueueEntry};

/// Runner executes queue entries and reports their failures in chat.
pub struct Runner {
    ctx: Arc<AgentContext>,
}

impl Runner {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl CommandExecutor for Runner {
    async fn execute(&self, entry: &QueueEntry) -> Result<()> {
        commands::execute(&self.ctx, &entry.command, &entry.actor).await?;
        Ok(())
    }

    async fn report_failure(&self, entry: &QueueEntry, error: &str) {
        self.ctx.world.chat(error).await;
        self.ctx.events.record(
            BotEvent::new("command_failed", error).with_metadata(serde_json::json!({
                "entry_id": entry.id,
                "command": entry.command.to_string(),
                "actor": entry.actor,
            })),
        );
    }
}
