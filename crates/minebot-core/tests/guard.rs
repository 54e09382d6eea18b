mod common;

use minebot_core::geometry::Vec3;
use minebot_core::world::Entity;
use minebot_core::{ModeKind, ModeRequest, SimWorld, StartOutcome};

use common::{advance, harness};

#[tokio::test(start_paused = true)]
async fn engages_only_inside_the_guard_radius() {
    let h = harness(SimWorld::new("minebot").with_item("stone_sword", 1));
    let ctx = h.ctx();

    ctx.start_mode(ModeRequest::Guard { radius: Some(12) })
        .await
        .unwrap();
    {
        let guard = ctx.modes.guard.lock().await;
        assert_eq!(guard.center, Some(Vec3::new(0.0, 64.0, 0.0)));
        assert_eq!(guard.radius, 12);
    }

    h.world
        .add_entity(Entity::mob(15, "zombie", Vec3::new(15.0, 64.0, 0.0)));
    advance(850).await;
    assert_eq!(h.world.current_target(), None);

    h.world
        .add_entity(Entity::mob(10, "skeleton", Vec3::new(10.0, 64.0, 0.0)));
    advance(800).await;
    assert_eq!(h.world.current_target(), Some(10));
    assert_eq!(h.world.held().as_deref(), Some("stone_sword"));
}

#[tokio::test(start_paused = true)]
async fn ignores_the_nearest_hostile_when_it_is_outside_the_radius() {
    let h = harness(SimWorld::new("minebot"));
    let ctx = h.ctx();
    ctx.start_mode(ModeRequest::Guard { radius: Some(10) })
        .await
        .unwrap();

    h.world.set_position(Vec3::new(14.0, 64.0, 0.0));
    h.world
        .add_entity(Entity::mob(11, "zombie", Vec3::new(15.0, 64.0, 0.0)));
    h.world
        .add_entity(Entity::mob(22, "spider", Vec3::new(-8.0, 64.0, 0.0)));

    advance(850).await;
    assert_eq!(h.world.current_target(), Some(22));
}

#[tokio::test(start_paused = true)]
async fn returns_to_the_guard_point_when_idle() {
    let h = harness(SimWorld::new("minebot"));
    let ctx = h.ctx();
    ctx.start_mode(ModeRequest::Guard { radius: None })
        .await
        .unwrap();
    assert_eq!(ctx.modes.guard.lock().await.radius, 10);

    h.world.set_position(Vec3::new(6.0, 64.0, 6.0));
    advance(850).await;
    assert_eq!(h.world.current_position(), Vec3::new(0.0, 64.0, 0.0));
}

#[tokio::test(start_paused = true)]
async fn guard_here_twice_keeps_the_first_point() {
    let h = harness(SimWorld::new("minebot"));
    let ctx = h.ctx();

    h.say("steve", "minebot guard here 12").await;
    advance(100).await;
    assert!(h.world.said("Guarding this spot (r=12)."));

    h.world.set_position(Vec3::new(30.0, 64.0, 0.0));
    assert_eq!(
        ctx.start_mode(ModeRequest::Guard { radius: Some(5) })
            .await
            .unwrap(),
        StartOutcome::AlreadyActive
    );
    assert_eq!(
        ctx.modes.guard.lock().await.center,
        Some(Vec3::new(0.0, 64.0, 0.0))
    );

    // The queue is still in its inter-action delay.
    h.say("steve", "minebot guard stop").await;
    advance(600).await;
    assert!(!ctx.driver.is_active(ModeKind::Guard));
    assert_eq!(ctx.modes.guard.lock().await.center, None);
}
