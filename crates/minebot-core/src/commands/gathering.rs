//! Gathering commands: wood, ore, arbitrary blocks and item pickup.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::AgentContext;
use crate::items;
use crate::kernel::StartOutcome;
use crate::modes::gather_wood::dig_down_to;
use crate::modes::ModeRequest;
use crate::world::{self, Block, EntityKind};

use super::CommandError;

const BLOCK_SEARCH_RADIUS: f64 = 64.0;
const MAX_FAILURES: u32 = 3;
const DEFAULT_PICKUP_RADIUS: u32 = 16;

pub(super) async fn gather_wood(ctx: &Arc<AgentContext>) -> Result<(), CommandError> {
    let inventory = ctx.world.inventory().await;
    let axe = items::best_axe(&inventory).ok_or(CommandError::NoAxe)?;
    let reply = match ctx.start_mode(ModeRequest::GatherWood).await? {
        StartOutcome::Started => format!("Equipped {axe} for chopping."),
        StartOutcome::AlreadyActive => "Already gathering wood.".to_string(),
    };
    ctx.world.chat(&reply).await;
    Ok(())
}

pub(super) async fn gather_ore(
    ctx: &AgentContext,
    ore: &str,
    count: u32,
) -> Result<(), CommandError> {
    let block = items::ore_block(ore);
    let inventory = ctx.world.inventory().await;
    let pickaxe = items::pickaxe_for(&inventory, &block).ok_or_else(|| CommandError::NoPickaxe {
        required: items::tier_name(items::required_pickaxe_tier(&block)),
        ore: ore.to_string(),
    })?;
    ctx.world
        .equip(&pickaxe)
        .await
        .map_err(CommandError::actuation("equip pickaxe"))?;
    ctx.world
        .chat(&format!("Equipped {pickaxe} for mining {block}."))
        .await;

    let names = vec![block.clone(), format!("deepslate_{block}")];
    collect_blocks(ctx, &names, &block, count).await
}

pub(super) async fn gather_blocks(
    ctx: &AgentContext,
    block: &str,
    count: u32,
) -> Result<(), CommandError> {
    let block = items::normalize(block);
    collect_blocks(ctx, std::slice::from_ref(&block), &block, count).await
}

/// Dig `count` blocks whose name is in `names`, nearest first.
async fn collect_blocks(
    ctx: &AgentContext,
    names: &[String],
    label: &str,
    count: u32,
) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    world
        .chat(&format!("Looking for {count} {label}."))
        .await;

    let matching = |b: &Block| names.iter().any(|n| *n == b.name);
    let mut gathered = 0;
    let mut failures = 0;
    while gathered < count {
        if ctx.defense.is_defending() {
            tracing::info!(label, gathered, "gathering interrupted by self-defense");
            break;
        }
        let origin = world.position().await;
        let Some(target) = world
            .find_blocks(origin, BLOCK_SEARCH_RADIUS, &matching, 1)
            .await
            .into_iter()
            .next()
        else {
            world
                .chat(&format!("Can't find more '{label}' nearby."))
                .await;
            break;
        };

        let result = async {
            dig_down_to(world, target.pos).await?;
            world.collect(&[target.pos]).await?;
            anyhow::Ok(())
        }
        .await;
        match result {
            Ok(()) => {
                gathered += 1;
                tracing::debug!(label, gathered, count, "block collected");
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(label, pos = %target.pos, error = %e, "failed to collect block");
                if failures >= MAX_FAILURES {
                    world.chat("Couldn't collect any more blocks.").await;
                    break;
                }
            }
        }
    }

    world
        .chat(&format!("Finished gathering. Collected {gathered} {label}."))
        .await;
    Ok(())
}

pub(super) async fn pickup(ctx: &AgentContext, radius: Option<u32>) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let radius = radius.unwrap_or(DEFAULT_PICKUP_RADIUS) as f64;
    let origin = world.position().await;
    let mut drops: Vec<_> = world
        .entities()
        .await
        .into_iter()
        .filter(|e| e.kind == EntityKind::Object && e.valid)
        .map(|e| (e.position.distance_to(origin), e))
        .filter(|(d, _)| *d <= radius)
        .collect();
    if drops.is_empty() {
        world.chat("No drops within range.").await;
        return Ok(());
    }
    drops.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (_, drop) in drops {
        world::go_near(world, drop.position, 0.5, Duration::from_secs(5)).await;
    }
    world.chat("Picked up nearby drops.").await;
    Ok(())
}
