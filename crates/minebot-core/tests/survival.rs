mod common;

use minebot_core::geometry::{BlockPos, Vec3};
use minebot_core::sim::SELF_ID;
use minebot_core::world::{Block, Entity};
use minebot_core::{ModeRequest, SimWorld, World};

use common::{advance, harness, Harness};

fn zombie(id: u32, x: f64) -> Entity {
    Entity::mob(id, "zombie", Vec3::new(x, 64.0, 0.0))
}

async fn survive(h: &Harness) {
    h.ctx().start_mode(ModeRequest::Survival).await.unwrap();
}

fn position_of(actions: &[String], prefix: &str) -> Option<usize> {
    actions.iter().position(|a| a.starts_with(prefix))
}

#[tokio::test(start_paused = true)]
async fn flees_from_nearby_lava() {
    let h = harness(
        SimWorld::new("minebot")
            .with_block(Block::new(BlockPos::new(1, 64, 0), "lava"))
            .with_entity(zombie(9, 3.0)),
    );
    h.world.attack(9).await.unwrap();
    survive(&h).await;

    advance(2_100).await;
    assert!(h.world.said("Danger detected! Fleeing to safety!"));
    assert_eq!(h.world.current_target(), None);
    assert!(h.world.current_goal().is_some());
    assert!(h.world.current_position().distance_to(Vec3::new(0.0, 64.0, 0.0)) >= 16.0);
}

#[tokio::test(start_paused = true)]
async fn flees_when_standing_over_a_drop() {
    let h = harness(SimWorld::new("minebot").with_floor(None));
    survive(&h).await;
    advance(2_100).await;
    assert!(h.world.said("Danger detected! Fleeing to safety!"));
}

#[tokio::test(start_paused = true)]
async fn critical_health_retreat_drops_combat_and_collection() {
    let h = harness(
        SimWorld::new("minebot")
            .with_health(3.0)
            .with_entity(zombie(9, 30.0)),
    );
    h.world.attack(9).await.unwrap();
    h.world.set_collecting(true);
    h.world.clear_logs();
    survive(&h).await;

    advance(2_100).await;
    assert!(h.world.said("Critical health! Retreating!"));
    assert_eq!(h.world.current_target(), None);
    assert!(!h.world.is_collecting().await);
    assert!(h.world.current_goal().is_some());

    let actions = h.world.actions();
    let stopped = position_of(&actions, "stop attack").unwrap();
    let cancelled = position_of(&actions, "cancel collect").unwrap();
    let moved = position_of(&actions, "goal").unwrap();
    assert!(stopped < moved && cancelled < moved);
}

#[tokio::test(start_paused = true)]
async fn fights_at_low_health_when_a_hostile_is_in_range() {
    let h = harness(
        SimWorld::new("minebot")
            .with_health(3.0)
            .with_item("iron_sword", 1)
            .with_entity(zombie(9, 5.0)),
    );
    survive(&h).await;

    advance(2_100).await;
    assert_eq!(h.world.current_target(), Some(9));
    assert!(!h.world.said("Critical health! Retreating!"));
    assert_eq!(h.world.current_goal(), None);
}

#[tokio::test(start_paused = true)]
async fn whitelisted_players_are_not_targets() {
    let h = harness(
        SimWorld::new("minebot")
            .with_entity(Entity::player(20, "Friend", Vec3::new(2.0, 64.0, 0.0)).targeting(SELF_ID))
            .with_entity(zombie(9, 10.0)),
    );
    h.ctx().store.lock().await.whitelist_mut().add("friend").unwrap();
    survive(&h).await;

    advance(2_100).await;
    assert_eq!(h.world.current_target(), Some(9));
    assert!(!h.world.actions().contains(&"attack 20".to_string()));
}

#[tokio::test(start_paused = true)]
async fn weapon_is_equipped_once_while_still_held() {
    let h = harness(
        SimWorld::new("minebot")
            .with_item("iron_sword", 1)
            .with_item("bread", 2)
            .with_entity(zombie(9, 5.0)),
    );
    survive(&h).await;
    let equips = |h: &Harness| {
        h.world
            .actions()
            .iter()
            .filter(|a| a.as_str() == "equip iron_sword")
            .count()
    };

    advance(2_100).await;
    assert_eq!(equips(&h), 1);
    assert!(h.ctx().modes.survival.lock().await.weapon_equipped);

    advance(2_000).await;
    assert_eq!(equips(&h), 1);

    h.world.equip("bread").await.unwrap();
    advance(2_000).await;
    assert_eq!(equips(&h), 2);
    assert_eq!(h.world.held().as_deref(), Some("iron_sword"));
}
