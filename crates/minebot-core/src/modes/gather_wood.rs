//! Gather-wood mode - keep chopping the nearest reachable tree.

use crate::agent::AgentContext;
use crate::geometry::{self, BlockPos, Vec3};
use crate::items;
use crate::world::{Block, World};

use super::ModeKind;

const SEARCH_START: u32 = 32;
const SEARCH_MAX: u32 = 96;
const SEARCH_STEP: usize = 16;

/// Whether the block or one of its face neighbours is water.
async fn near_water(world: &dyn World, pos: BlockPos) -> bool {
    const FACES: [(i32, i32, i32); 7] = [
        (0, 0, 0),
        (1, 0, 0),
        (-1, 0, 0),
        (0, 1, 0),
        (0, -1, 0),
        (0, 0, 1),
        (0, 0, -1),
    ];
    for (dx, dy, dz) in FACES {
        if let Some(block) = world.block_at(pos.offset(dx, dy, dz)).await {
            if block.is_water() {
                return true;
            }
        }
    }
    false
}

/// Nearest dry log, widening the search until one turns up.
pub async fn find_log(world: &dyn World, origin: Vec3) -> Option<Block> {
    for radius in (SEARCH_START..=SEARCH_MAX).step_by(SEARCH_STEP) {
        let logs = world
            .find_blocks(origin, radius as f64, &|b: &Block| items::is_log(&b.name), 32)
            .await;
        for log in logs {
            if !near_water(world, log.pos).await {
                return Some(log);
            }
        }
    }
    None
}

/// Dig out a descending staircase when `target` is more than one block below.
pub async fn dig_down_to(world: &dyn World, target: BlockPos) -> anyhow::Result<()> {
    let steps = geometry::staircase_steps(world.position().await, target);
    if steps.is_empty() {
        return Ok(());
    }
    tracing::debug!(target_pos = %target, blocks = steps.len(), "digging staircase");
    for step in steps {
        let solid = world.block_at(step).await.is_some_and(|b| !b.is_air());
        if solid && world.can_dig(step).await {
            world.dig(step).await?;
        }
    }
    Ok(())
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    let world = ctx.world.as_ref();
    if world.is_collecting().await {
        return Ok(());
    }

    let Some(axe) = items::best_axe(&world.inventory().await) else {
        world
            .chat("I don't have an axe! I need an axe to gather wood.")
            .await;
        ctx.stop_mode(ModeKind::GatherWood).await;
        return Ok(());
    };
    world.equip(&axe).await?;

    let Some(log) = find_log(world, world.position().await).await else {
        world
            .chat("I cannot find any logs nearby (searched up to 96 blocks).")
            .await;
        ctx.stop_mode(ModeKind::GatherWood).await;
        return Ok(());
    };

    dig_down_to(world, log.pos).await?;
    tracing::debug!(log = %log.name, pos = %log.pos, "collecting log");
    world.collect(&[log.pos]).await?;
    Ok(())
}
