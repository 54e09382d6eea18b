mod common;

use minebot_core::geometry::Vec3;
use minebot_core::sim::SELF_ID;
use minebot_core::world::{Entity, World, WorldEvent};
use minebot_core::{ModeKind, ModeRequest, SimWorld};

use common::{advance, harness};

fn zombie_at(x: f64) -> Entity {
    Entity::mob(7, "zombie", Vec3::new(x, 64.0, 0.0)).targeting(SELF_ID)
}

#[tokio::test(start_paused = true)]
async fn fights_the_entity_targeting_the_agent_until_it_leaves() {
    let h = harness(
        SimWorld::new("minebot")
            .with_item("iron_sword", 1)
            .with_entity(Entity::mob(8, "cow", Vec3::new(1.0, 64.0, 0.0)))
            .with_entity(zombie_at(3.0)),
    );

    h.agent.handle_event(WorldEvent::Damaged).await;
    assert!(h.agent.is_defending());
    assert_eq!(h.world.current_target(), Some(7));
    assert_eq!(h.world.held().as_deref(), Some("iron_sword"));
    assert!(h.world.said("Defending myself against zombie!"));

    h.agent.handle_event(WorldEvent::Tick).await;
    assert!(h.agent.is_defending());

    h.world.update_entity(7, |e| e.position = Vec3::new(40.0, 64.0, 0.0));
    h.agent.handle_event(WorldEvent::Tick).await;
    assert!(!h.agent.is_defending());
    assert_eq!(h.world.current_target(), None);

    let types: Vec<String> = h
        .ctx()
        .events
        .read_recent(10)
        .into_iter()
        .map(|e| e.event_type)
        .collect();
    assert_eq!(types, vec!["defense_started", "defense_ended"]);
}

#[tokio::test(start_paused = true)]
async fn no_entities_means_no_session() {
    let h = harness(SimWorld::new("minebot"));
    h.agent.handle_event(WorldEvent::Damaged).await;
    assert!(!h.agent.is_defending());
    assert!(h.world.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn never_attacks_a_whitelisted_player() {
    let h = harness(SimWorld::new("minebot").with_entity(
        Entity::player(20, "Friend", Vec3::new(2.0, 64.0, 0.0)).targeting(SELF_ID),
    ));
    h.ctx().store.lock().await.whitelist_mut().add("friend").unwrap();

    h.agent.handle_event(WorldEvent::Damaged).await;
    assert!(!h.agent.is_defending());
    assert_eq!(h.world.current_target(), None);
}

#[tokio::test(start_paused = true)]
async fn modes_are_preempted_while_defending_and_resume_after() {
    let h = harness(SimWorld::new("minebot").with_entity(zombie_at(3.0)));
    h.ctx().start_mode(ModeRequest::Roam).await.unwrap();

    h.agent.handle_event(WorldEvent::Damaged).await;
    let session = h.ctx().defense.session().await.unwrap();
    assert_eq!(session.saved_task, Some(ModeKind::Roam));

    // Roam would stop the attack and wander off on every tick.
    let start = h.world.current_position();
    advance(3_500).await;
    assert_eq!(h.world.current_target(), Some(7));
    assert_eq!(h.world.current_position(), start);

    h.world.update_entity(7, |e| e.health = Some(0.0));
    h.agent.handle_event(WorldEvent::Tick).await;
    assert!(!h.agent.is_defending());
    assert!(h.ctx().driver.is_active(ModeKind::Roam));

    advance(1_100).await;
    assert_ne!(h.world.current_position(), start);
}

#[tokio::test(start_paused = true)]
async fn stop_command_ends_the_session() {
    let h = harness(SimWorld::new("minebot").with_entity(zombie_at(3.0)));
    h.agent.handle_event(WorldEvent::Damaged).await;
    assert!(h.agent.is_defending());

    h.say("steve", "minebot stop").await;
    assert!(!h.agent.is_defending());
    assert_eq!(h.world.current_target(), None);
    assert!(h.world.said("Stopped current actions."));
}

#[tokio::test(start_paused = true)]
async fn event_ticks_re_engage_a_dropped_attack() {
    let h = harness(SimWorld::new("minebot").with_entity(zombie_at(3.0)));
    h.agent.handle_event(WorldEvent::Damaged).await;
    assert_eq!(h.world.current_target(), Some(7));

    h.world.stop_attack().await;
    assert_eq!(h.world.current_target(), None);
    h.agent.handle_event(WorldEvent::Tick).await;
    assert!(h.agent.is_defending());
    assert_eq!(h.world.current_target(), Some(7));
}
