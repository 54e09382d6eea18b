mod common;

use minebot_core::geometry::Vec3;
use minebot_core::state::Waypoint;
use minebot_core::{SimWorld, StateManager};

use common::{advance, harness};

#[tokio::test(start_paused = true)]
async fn waypoints_set_from_chat_survive_a_reload() {
    let h = harness(SimWorld::new("minebot").with_position(Vec3::new(10.7, 64.0, -3.2)));

    h.say("steve", "minebot set home").await;
    advance(700).await;
    assert!(h.world.said("Home set at (10 64 -4)."));

    h.world.set_position(Vec3::new(-20.0, 70.0, 5.0));
    h.say("steve", "minebot mark Mine").await;
    advance(700).await;
    assert!(h.world.said("Marked 'mine' at (-20 70 5)."));

    let reloaded = StateManager::new(h.dir.path()).unwrap();
    let waypoints = reloaded.waypoints();
    assert_eq!(
        waypoints.home(),
        Some(&Waypoint::at(Vec3::new(10.7, 64.0, -3.2), "overworld"))
    );
    assert_eq!(waypoints.get("MINE").map(|w| (w.x, w.y, w.z)), Some((-20, 70, 5)));
}

#[tokio::test(start_paused = true)]
async fn go_to_unknown_waypoint_and_missing_home() {
    let h = harness(SimWorld::new("minebot"));

    h.say("steve", "minebot go nowhere").await;
    advance(700).await;
    h.say("steve", "minebot go home").await;
    advance(700).await;

    assert!(h.world.said("No waypoint named 'nowhere'."));
    assert!(h.world.said("Home is not set. Use \"set home\" first."));
    assert_eq!(h.world.current_goal(), None);
}

#[tokio::test(start_paused = true)]
async fn deleted_waypoints_stay_deleted() {
    let h = harness(SimWorld::new("minebot"));
    h.say("steve", "minebot mark camp").await;
    advance(700).await;
    h.say("steve", "minebot delete waypoint camp").await;
    advance(700).await;
    assert!(h.world.said("Deleted waypoint 'camp'."));

    let reloaded = StateManager::new(h.dir.path()).unwrap();
    assert!(reloaded.waypoints().get("camp").is_none());
}

#[tokio::test(start_paused = true)]
async fn enabled_whitelist_only_obeys_listed_players() {
    let h = harness(SimWorld::new("minebot"));
    {
        let mut store = h.ctx().store.lock().await;
        store.whitelist_mut().add("Steve").unwrap();
        store.whitelist_mut().set_enabled(true).unwrap();
    }

    h.say("griefer", "minebot inventory").await;
    advance(700).await;
    assert!(h.world.chat_log().is_empty());

    h.say("STEVE", "minebot inventory").await;
    advance(700).await;
    assert!(h.world.said("Inventory empty."));

    let reloaded = StateManager::new(h.dir.path()).unwrap();
    assert!(reloaded.whitelist().is_enabled());
    assert!(reloaded.whitelist().contains("steve"));
    assert!(!reloaded.whitelist().allows("griefer"));
}
