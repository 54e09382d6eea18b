#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use minebot_core::{Agent, AgentContext, BotConfig, SimWorld};
use tempfile::TempDir;

/// An agent over a `SimWorld` with its stores in a temporary directory.
pub struct Harness {
    pub world: Arc<SimWorld>,
    pub agent: Agent,
    pub dir: TempDir,
}

impl Harness {
    pub fn ctx(&self) -> &Arc<AgentContext> {
        self.agent.context()
    }

    /// Feed a chat line as `player`.
    pub async fn say(&self, player: &str, message: &str) {
        self.agent.handle_chat(player, message).await;
    }
}

pub fn config(dir: &TempDir) -> BotConfig {
    BotConfig {
        username: "minebot".to_string(),
        data_dir: dir.path().to_path_buf(),
        seed: Some(7),
        ..BotConfig::default()
    }
}

pub fn harness(world: SimWorld) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let world = Arc::new(world);
    let agent = Agent::new(world.clone(), config(&dir)).unwrap();
    Harness { world, agent, dir }
}

pub async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
