//! Self-defense - a reactive interrupt that fights back when the agent is hurt.
//!
//! While a session is open every mode tick is skipped (see
//! `modes::tick`), so whatever ran before simply resumes once the attacker
//! is gone.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use crate::agent::AgentContext;
use crate::config::CombatConfig;
use crate::geometry::Vec3;
use crate::items::{self, WeaponPriority};
use crate::modes::{combat, ModeKind};
use crate::observability::BotEvent;
use crate::world::{Entity, EntityId};

#[derive(Debug, Clone, PartialEq)]
pub struct DefenseSession {
    pub attacker: EntityId,
    pub attacker_name: String,
    /// Long-running task that was active when the session opened
    pub saved_task: Option<ModeKind>,
}

/// Why a defense session closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefenseEnd {
    Gone,
    Invalid,
    OutOfRange,
    Defeated,
    Forced,
}

impl DefenseEnd {
    fn describe(self) -> &'static str {
        match self {
            Self::Gone => "attacker gone",
            Self::Invalid => "attacker despawned",
            Self::OutOfRange => "attacker out of range",
            Self::Defeated => "attacker defeated",
            Self::Forced => "stopped",
        }
    }
}

/// Pick who to blame for damage.
///
/// Considers entities within `scan_radius`, never the agent itself or a
/// protected player. In order: entities targeting the agent (players first,
/// then by distance), the nearest hostile mob, the nearest player within
/// `close_radius`.
pub fn identify_attacker(
    self_id: EntityId,
    origin: Vec3,
    entities: &[Entity],
    config: &CombatConfig,
    protects: impl Fn(&str) -> bool,
) -> Option<Entity> {
    let mut candidates: Vec<(&Entity, f64)> = entities
        .iter()
        .filter(|e| e.id != self_id && e.valid)
        .filter(|e| !(e.is_player() && protects(e.display_name())))
        .map(|e| (e, e.position.distance_to(origin)))
        .filter(|(_, d)| *d <= config.defense_scan_radius)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

    let targeting_me = candidates
        .iter()
        .filter(|(e, _)| e.target == Some(self_id))
        .min_by_key(|(e, _)| !e.is_player());
    if let Some((entity, _)) = targeting_me {
        return Some((*entity).clone());
    }

    if let Some((entity, _)) = candidates.iter().find(|(e, _)| items::is_hostile(e)) {
        return Some((*entity).clone());
    }

    candidates
        .iter()
        .find(|(e, d)| e.is_player() && *d <= config.close_player_radius)
        .map(|(e, _)| (*e).clone())
}

pub struct SelfDefense {
    session: Mutex<Option<DefenseSession>>,
    defending: AtomicBool,
}

impl Default for SelfDefense {
    fn default() -> Self {
        Self::new()
    }
}

impl SelfDefense {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
            defending: AtomicBool::new(false),
        }
    }

    pub fn is_defending(&self) -> bool {
        self.defending.load(Ordering::SeqCst)
    }

    pub async fn session(&self) -> Option<DefenseSession> {
        self.session.lock().await.clone()
    }

    /// React to damage. No-op while a session is already open.
    pub async fn on_damage(&self, ctx: &AgentContext) {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return;
        }

        let world = ctx.world.as_ref();
        let self_id = world.self_id().await;
        let origin = world.position().await;
        let entities = world.entities().await;
        let attacker = {
            let store = ctx.store.lock().await;
            let whitelist = store.whitelist();
            identify_attacker(self_id, origin, &entities, &ctx.config.combat, |name| {
                whitelist.protects(name)
            })
        };
        let Some(attacker) = attacker else {
            tracing::debug!("took damage with no attacker in sight");
            return;
        };

        let saved_task = ModeKind::LONG_RUNNING
            .into_iter()
            .find(|m| ctx.driver.is_active(*m));
        let name = attacker.display_name().to_string();
        *session = Some(DefenseSession {
            attacker: attacker.id,
            attacker_name: name.clone(),
            saved_task,
        });
        self.defending.store(true, Ordering::SeqCst);
        tracing::info!(attacker = %name, attacker_id = attacker.id, saved_task = ?saved_task, "self-defense engaged");

        world.chat(&format!("Defending myself against {name}!")).await;
        world.cancel_collect().await;
        combat::equip_weapon(world, WeaponPriority::Melee).await;
        if let Err(e) = world.attack(attacker.id).await {
            tracing::warn!(attacker = %name, error = %e, "counter-attack failed");
            *session = None;
            self.defending.store(false, Ordering::SeqCst);
            return;
        }

        ctx.events.record(
            BotEvent::new("defense_started", format!("defending against {name}")).with_metadata(
                serde_json::json!({
                    "attacker_id": attacker.id,
                    "saved_task": saved_task.map(|m| m.to_string()),
                }),
            ),
        );
    }

    /// Keep the attack on the attacker; close the session once it is no
    /// longer a threat.
    pub async fn on_world_tick(&self, ctx: &AgentContext) {
        if !self.is_defending() {
            return;
        }
        let mut session = self.session.lock().await;
        let Some(current) = session.as_ref() else {
            return;
        };

        let world = ctx.world.as_ref();
        let end = match world.entity(current.attacker).await {
            None => Some(DefenseEnd::Gone),
            Some(e) if !e.valid => Some(DefenseEnd::Invalid),
            Some(e) if e.health.is_some_and(|h| h <= 0.0) => Some(DefenseEnd::Defeated),
            Some(e) => {
                let distance = e.position.distance_to(world.position().await);
                (distance > ctx.config.combat.defense_max_range).then_some(DefenseEnd::OutOfRange)
            }
        };
        if let Some(end) = end {
            self.close(ctx, &mut session, end).await;
            return;
        }

        if world.attack_target().await != Some(current.attacker) {
            tracing::debug!(attacker = %current.attacker_name, "re-engaging attacker");
            if let Err(e) = world.attack(current.attacker).await {
                tracing::warn!(attacker = %current.attacker_name, error = %e, "re-engage failed");
            }
        }
    }

    /// Force the interrupt back to idle.
    pub async fn stop_defense(&self, ctx: &AgentContext) -> bool {
        let mut session = self.session.lock().await;
        if session.is_none() {
            return false;
        }
        self.close(ctx, &mut session, DefenseEnd::Forced).await;
        true
    }

    async fn close(&self, ctx: &AgentContext, session: &mut Option<DefenseSession>, end: DefenseEnd) {
        let Some(closed) = session.take() else {
            return;
        };
        ctx.world.stop_attack().await;
        self.defending.store(false, Ordering::SeqCst);

        let resumed = closed.saved_task.filter(|m| ctx.driver.is_active(*m));
        match resumed {
            Some(task) => tracing::info!(reason = end.describe(), resumed = %task, "self-defense over, resuming task"),
            None => tracing::info!(reason = end.describe(), "self-defense over"),
        }
        ctx.events.record(BotEvent::new(
            "defense_ended",
            format!("{} ({})", closed.attacker_name, end.describe()),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: EntityId = 1;

    fn origin() -> Vec3 {
        Vec3::new(0.0, 64.0, 0.0)
    }

    #[test]
    fn prefers_players_targeting_the_agent() {
        let entities = vec![
            Entity::mob(2, "zombie", Vec3::new(1.0, 64.0, 0.0)).targeting(ME),
            Entity::player(3, "Griefer", Vec3::new(6.0, 64.0, 0.0)).targeting(ME),
        ];
        let attacker =
            identify_attacker(ME, origin(), &entities, &CombatConfig::default(), |_| false).unwrap();
        assert_eq!(attacker.id, 3);
    }

    #[test]
    fn falls_back_to_hostiles_then_close_players() {
        let config = CombatConfig::default();
        let entities = vec![
            Entity::player(3, "Bystander", Vec3::new(3.0, 64.0, 0.0)),
            Entity::mob(4, "skeleton", Vec3::new(12.0, 64.0, 0.0)),
        ];
        assert_eq!(
            identify_attacker(ME, origin(), &entities, &config, |_| false).map(|e| e.id),
            Some(4)
        );
        assert_eq!(
            identify_attacker(ME, origin(), &entities[..1], &config, |_| false).map(|e| e.id),
            Some(3)
        );
        assert!(identify_attacker(ME, origin(), &[], &config, |_| false).is_none());
    }

    #[test]
    fn never_blames_protected_players() {
        let entities = vec![Entity::player(3, "Friend", Vec3::new(2.0, 64.0, 0.0)).targeting(ME)];
        let found = identify_attacker(ME, origin(), &entities, &CombatConfig::default(), |name| {
            name.eq_ignore_ascii_case("friend")
        });
        assert!(found.is_none());
    }
}
