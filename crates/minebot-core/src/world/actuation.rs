//! Bounded movement and container helpers built on the raw `World` calls.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use super::{Block, Goal, ItemStack, World, WorldResult};
use crate::geometry::{BlockPos, Vec3};

const ARRIVAL_POLL: Duration = Duration::from_millis(150);

const CONTAINER_BLOCKS: &[&str] = &["chest", "trapped_chest", "barrel"];

/// Set a goal near `pos` and wait until the agent is within `radius + 1` or
/// `timeout` elapses. Returns whether the agent arrived.
pub async fn go_near(world: &dyn World, pos: Vec3, radius: f64, timeout: Duration) -> bool {
    world.set_goal(Goal::Near { pos, range: radius }).await;

    let deadline = Instant::now() + timeout;
    loop {
        if world.position().await.distance_to(pos) <= radius + 1.0 {
            return true;
        }
        if Instant::now() >= deadline {
            tracing::debug!(target_pos = %pos, "gave up moving toward target");
            world.clear_goal().await;
            return false;
        }
        sleep(ARRIVAL_POLL).await;
    }
}

/// Nearest chest or barrel within `radius` of the agent.
pub async fn find_nearest_chest(world: &dyn World, radius: f64) -> Option<Block> {
    let center = world.position().await;
    find_chest_near(world, center, radius).await
}

pub async fn find_chest_near(world: &dyn World, center: Vec3, radius: f64) -> Option<Block> {
    world
        .find_blocks(
            center,
            radius,
            &|b: &Block| CONTAINER_BLOCKS.contains(&b.name.as_str()),
            1,
        )
        .await
        .into_iter()
        .next()
}

/// An open container. Dropping the session does not close the window;
/// call `close` (or use `deposit_items`, which always does).
pub struct ContainerSession<'w> {
    world: &'w dyn World,
}

impl<'w> ContainerSession<'w> {
    pub async fn open(world: &'w dyn World, pos: BlockPos) -> WorldResult<Self> {
        world.open_container(pos).await?;
        Ok(Self { world })
    }

    pub async fn items(&self) -> WorldResult<Vec<ItemStack>> {
        self.world.container_items().await
    }

    /// Deposit every inventory stack accepted by `filter`.
    pub async fn deposit_matching(
        &self,
        filter: impl Fn(&str) -> bool,
    ) -> WorldResult<Vec<ItemStack>> {
        let mut stored = Vec::new();
        for stack in self.world.inventory().await {
            if !filter(&stack.name) {
                continue;
            }
            self.world.deposit(&stack.name, stack.count).await?;
            stored.push(stack);
        }
        Ok(stored)
    }

    pub async fn withdraw(&self, item: &str, count: u32) -> WorldResult<()> {
        self.world.withdraw(item, count).await
    }

    pub async fn close(self) {
        self.world.close_container().await;
    }
}

/// Open the container at `pos`, store every matching stack, and close it
/// again whether or not a deposit failed.
pub async fn deposit_items(
    world: &dyn World,
    pos: BlockPos,
    filter: impl Fn(&str) -> bool,
) -> WorldResult<Vec<ItemStack>> {
    let session = ContainerSession::open(world, pos).await?;
    let result = session.deposit_matching(filter).await;
    session.close().await;
    result
}
