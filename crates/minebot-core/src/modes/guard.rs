//! Guard mode - hold a fixed point and attack hostiles that come close to it.

use crate::agent::AgentContext;
use crate::commands::CommandError;
use crate::geometry::Vec3;
use crate::items::WeaponPriority;
use crate::world::Goal;

use super::combat;

/// Accepted radii for `guard here <r>`.
pub const RADIUS_RANGE: std::ops::RangeInclusive<u32> = 2..=64;

const DRIFT_LIMIT: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct GuardState {
    pub center: Option<Vec3>,
    pub radius: u32,
}

impl GuardState {
    pub fn new(radius: u32) -> Self {
        Self {
            center: None,
            radius,
        }
    }
}

impl Default for GuardState {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Requested radius if in range, else the default.
pub fn effective_radius(requested: Option<u32>, default: u32) -> u32 {
    requested
        .filter(|r| RADIUS_RANGE.contains(r))
        .unwrap_or(default)
}

pub(crate) async fn prepare(ctx: &AgentContext, radius: Option<u32>) -> Result<(), CommandError> {
    let center = ctx.world.position().await;
    let radius = effective_radius(radius, ctx.config.guard.default_radius);
    *ctx.modes.guard.lock().await = GuardState {
        center: Some(center),
        radius,
    };
    tracing::info!(center = %center, radius, "guard point set");
    Ok(())
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    let GuardState { center, radius } = ctx.modes.guard.lock().await.clone();
    let Some(center) = center else {
        return Ok(());
    };
    let world = ctx.world.as_ref();

    // Candidates are measured from the guard point; the pick is nearest the agent.
    let mut intruders = combat::threat_snapshot(ctx, f64::MAX).await;
    intruders.retain(|t| t.entity.position.distance_to(center) <= radius as f64);

    if let Some(target) = intruders.first() {
        if world.attack_target().await != Some(target.entity.id) {
            combat::equip_weapon(world, WeaponPriority::Sustained).await;
            tracing::info!(intruder = %target.entity.name, distance = target.distance, "guard engaging");
        }
        combat::engage(world, &target.entity).await?;
        return Ok(());
    }

    if world.attack_target().await.is_some() {
        world.stop_attack().await;
    }
    if world.position().await.distance_to(center) > DRIFT_LIMIT {
        world.set_goal(Goal::Near { pos: center, range: 1.0 }).await;
    }
    Ok(())
}
