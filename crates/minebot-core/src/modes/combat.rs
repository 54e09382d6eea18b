//! Shared combat helpers: threat snapshots, weapon handling, safe spots.

use crate::agent::AgentContext;
use crate::geometry::Vec3;
use crate::items::{self, WeaponPriority};
use crate::world::{Block, Entity, World};

/// Hostile entity with its distance from the agent.
#[derive(Debug, Clone)]
pub struct Threat {
    pub entity: Entity,
    pub distance: f64,
}

/// Hostiles within `range` of `origin`, nearest first.
///
/// The sort is stable, so equal distances keep the provider's order.
pub fn threats_near(
    entities: Vec<Entity>,
    origin: Vec3,
    range: f64,
    protects: impl Fn(&str) -> bool,
) -> Vec<Threat> {
    let mut threats: Vec<Threat> = entities
        .into_iter()
        .filter(|e| e.valid && items::is_hostile(e))
        .filter(|e| !(e.is_player() && protects(e.display_name())))
        .map(|entity| Threat {
            distance: entity.position.distance_to(origin),
            entity,
        })
        .filter(|t| t.distance <= range)
        .collect();
    threats.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    threats
}

/// Every hostile around the agent within `range`.
pub async fn threat_snapshot(ctx: &AgentContext, range: f64) -> Vec<Threat> {
    let origin = ctx.world.position().await;
    let entities = ctx.world.entities().await;
    let store = ctx.store.lock().await;
    let whitelist = store.whitelist();
    threats_near(entities, origin, range, |name| whitelist.protects(name))
}

/// Equip the best weapon for `priority`. Returns the equipped item name.
pub async fn equip_weapon(world: &dyn World, priority: WeaponPriority) -> Option<String> {
    let inventory = world.inventory().await;
    let weapon = items::best_weapon(&inventory, priority)?;
    match world.equip(&weapon).await {
        Ok(()) => Some(weapon),
        Err(e) => {
            tracing::warn!(weapon = %weapon, error = %e, "failed to equip weapon");
            None
        }
    }
}

/// Attack `target` unless it is already the current combat target.
pub async fn engage(world: &dyn World, target: &Entity) -> crate::world::WorldResult<()> {
    if world.attack_target().await == Some(target.id) {
        return Ok(());
    }
    world.cancel_collect().await;
    world.attack(target.id).await
}

const RING: [(f64, f64); 8] = [
    (16.0, 0.0),
    (-16.0, 0.0),
    (0.0, 16.0),
    (0.0, -16.0),
    (12.0, 12.0),
    (-12.0, 12.0),
    (12.0, -12.0),
    (-12.0, -12.0),
];

/// A random ring spot around the agent that has no lava within 2 blocks,
/// falling back to a random spot within 8 blocks.
pub async fn safe_position(ctx: &AgentContext) -> Vec3 {
    let pos = ctx.world.position().await;
    let mut candidates = Vec::with_capacity(RING.len());
    for (dx, dz) in RING {
        let candidate = pos.offset(dx, 0.0, dz);
        let lava = ctx
            .world
            .find_blocks(candidate, 2.0, &|b: &Block| b.is_lava(), 1)
            .await;
        if lava.is_empty() {
            candidates.push(candidate);
        }
    }

    ctx.with_rng(|rng| match rng.pick(&candidates) {
        Some(spot) => *spot,
        None => pos.offset(rng.gen_range(-8.0..8.0), 0.0, rng.gen_range(-8.0..8.0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threats_sorted_and_filtered() {
        let origin = Vec3::new(0.0, 64.0, 0.0);
        let entities = vec![
            Entity::mob(1, "zombie", Vec3::new(10.0, 64.0, 0.0)),
            Entity::mob(2, "cow", Vec3::new(1.0, 64.0, 0.0)),
            Entity::mob(3, "skeleton", Vec3::new(0.0, 64.0, 5.0)),
            Entity::mob(4, "creeper", Vec3::new(20.0, 64.0, 0.0)),
        ];
        let threats = threats_near(entities, origin, 16.0, |_| false);
        let ids: Vec<_> = threats.iter().map(|t| t.entity.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
