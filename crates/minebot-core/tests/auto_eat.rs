mod common;

use minebot_core::{ModeKind, SimWorld};

use common::{advance, harness};

const NO_FOOD: &str = "Hungry but no food available!";

#[tokio::test(start_paused = true)]
async fn eats_until_the_threshold_is_reached() {
    let h = harness(SimWorld::new("minebot").with_food(10).with_item("bread", 3));
    h.agent.boot().await.unwrap();
    assert!(h.ctx().driver.is_active(ModeKind::AutoEat));

    advance(3_100).await;
    assert_eq!(h.world.item_count("bread"), 2);

    advance(3_000).await;
    assert_eq!(h.world.item_count("bread"), 1);

    // 20/20 is above the threshold; nothing more is eaten.
    advance(6_000).await;
    assert_eq!(h.world.item_count("bread"), 1);
    assert!(!h.ctx().modes.auto_eat.lock().await.eating);
}

#[tokio::test(start_paused = true)]
async fn a_full_bar_is_left_alone() {
    let h = harness(SimWorld::new("minebot").with_food(16).with_item("bread", 3));
    h.agent.boot().await.unwrap();
    advance(9_100).await;
    assert_eq!(h.world.item_count("bread"), 3);
    assert!(h.world.actions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn warns_about_missing_food_once_per_shortage() {
    let h = harness(SimWorld::new("minebot").with_food(10));
    h.agent.boot().await.unwrap();
    let warnings = || h.world.chat_log().iter().filter(|l| *l == NO_FOOD).count();

    advance(3_100).await;
    assert_eq!(warnings(), 1);
    advance(6_000).await;
    assert_eq!(warnings(), 1);

    // Food shows up, gets eaten, and the next shortage is announced again.
    h.world.add_item("bread", 1);
    advance(3_000).await;
    assert_eq!(h.world.item_count("bread"), 0);
    assert!(!h.ctx().modes.auto_eat.lock().await.warned_no_food);
    advance(3_000).await;
    assert_eq!(warnings(), 2);
}
