//! Survival mode - flee hazards, retreat when weak, fight nearby hostiles.

use crate::agent::AgentContext;
use crate::commands::CommandError;
use crate::geometry::BlockPos;
use crate::items::{self, WeaponPriority};
use crate::world::Goal;

use super::combat;

#[derive(Debug, Default)]
pub struct SurvivalState {
    /// A weapon was equipped and is still held
    pub weapon_equipped: bool,
}

pub(crate) async fn prepare(ctx: &AgentContext) -> Result<(), CommandError> {
    *ctx.modes.survival.lock().await = SurvivalState::default();
    Ok(())
}

/// Lava in the 3x3x3 cube around the feet, or nothing solid within 3 below.
async fn in_danger(ctx: &AgentContext) -> bool {
    let feet = ctx.world.position().await.floored();

    for dx in -1..=1 {
        for dy in -1..=1 {
            for dz in -1..=1 {
                if let Some(block) = ctx.world.block_at(feet.offset(dx, dy, dz)).await {
                    if block.is_lava() {
                        return true;
                    }
                }
            }
        }
    }

    for depth in 1..=3 {
        let below = BlockPos::new(feet.x, feet.y - depth, feet.z);
        if let Some(block) = ctx.world.block_at(below).await {
            if !block.is_air() {
                return false;
            }
        }
    }
    true
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    let world = ctx.world.as_ref();

    if in_danger(ctx).await {
        world.stop_attack().await;
        world.cancel_collect().await;
        let spot = combat::safe_position(ctx).await;
        world.set_goal(Goal::Near { pos: spot, range: 1.0 }).await;
        world.chat("Danger detected! Fleeing to safety!").await;
        tracing::warn!(target_pos = %spot, "hazard near agent, fleeing");
        return Ok(());
    }

    let threats = combat::threat_snapshot(ctx, ctx.combat_range() as f64).await;
    let health = world.health().await;
    let critical = health <= ctx.config.combat.critical_health;

    if critical && threats.is_empty() {
        world.stop_attack().await;
        world.cancel_collect().await;
        let spot = combat::safe_position(ctx).await;
        world.set_goal(Goal::Near { pos: spot, range: 1.0 }).await;
        world.chat("Critical health! Retreating!").await;
        tracing::info!(health, target_pos = %spot, "retreating");
        return Ok(());
    }

    let Some(nearest) = threats.first() else {
        return Ok(());
    };
    if critical {
        tracing::info!(health, threat = %nearest.entity.name, "low health but cornered, fighting");
    }

    let cached = ctx.modes.survival.lock().await.weapon_equipped;
    let holding_weapon = world
        .held_item()
        .await
        .is_some_and(|item| items::is_weapon(&item.name));
    if !(cached && holding_weapon) {
        let equipped = combat::equip_weapon(world, WeaponPriority::Sustained).await;
        ctx.modes.survival.lock().await.weapon_equipped = equipped.is_some();
    }

    tracing::debug!(
        threat = %nearest.entity.name,
        distance = nearest.distance,
        "engaging nearest hostile"
    );
    combat::engage(world, &nearest.entity).await?;
    Ok(())
}
