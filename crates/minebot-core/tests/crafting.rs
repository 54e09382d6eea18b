mod common;

use minebot_core::geometry::BlockPos;
use minebot_core::world::Block;
use minebot_core::SimWorld;

use common::{advance, harness};

#[tokio::test(start_paused = true)]
async fn places_a_crafting_table_when_the_recipe_needs_one() {
    let h = harness(
        SimWorld::new("minebot")
            .with_item("oak_planks", 3)
            .with_item("stick", 2)
            .with_item("crafting_table", 1),
    );
    h.say("steve", "minebot craft wooden pickaxe").await;
    advance(100).await;

    assert!(h.world.said("Crafted 1 wooden_pickaxe."));
    assert_eq!(h.world.item_count("wooden_pickaxe"), 1);
    assert_eq!(h.world.item_count("crafting_table"), 0);
    assert_eq!(h.world.block(BlockPos::new(1, 64, 0)).name, "crafting_table");
}

#[tokio::test(start_paused = true)]
async fn uses_a_nearby_table_and_skips_it_for_simple_recipes() {
    let h = harness(
        SimWorld::new("minebot")
            .with_block(Block::new(BlockPos::new(3, 64, 2), "crafting_table"))
            .with_item("cobblestone", 3)
            .with_item("stick", 2)
            .with_item("oak_log", 2),
    );
    h.say("steve", "minebot craft stone pickaxe").await;
    advance(100).await;
    assert!(h.world.said("Crafted 1 stone_pickaxe."));
    assert!(!h.world.actions().iter().any(|a| a.starts_with("place")));

    h.world.clear_logs();
    h.say("steve", "minebot craft oak planks 2").await;
    advance(700).await;
    assert!(h.world.said("Crafted 2 oak_planks."));
    assert_eq!(h.world.item_count("oak_planks"), 8);
    assert!(!h.world.actions().iter().any(|a| a.starts_with("goal")));
}

#[tokio::test(start_paused = true)]
async fn crafting_failures_are_explained() {
    let h = harness(SimWorld::new("minebot").with_item("oak_planks", 3).with_item("stick", 2));
    h.say("steve", "minebot craft wooden pickaxe").await;
    advance(100).await;
    assert!(h.world.said("Need a crafting table and I don't have one."));
    assert_eq!(h.world.item_count("oak_planks"), 3);

    h.say("steve", "minebot craft beacon").await;
    advance(700).await;
    assert!(h.world.said("No recipe for 'beacon'."));
}

#[tokio::test(start_paused = true)]
async fn smelts_in_a_placed_furnace() {
    let h = harness(
        SimWorld::new("minebot")
            .with_item("furnace", 1)
            .with_item("iron_ore", 3)
            .with_item("coal", 1),
    );
    h.say("steve", "minebot smelt iron ingot 3").await;
    advance(100).await;

    assert!(h.world.said("Smelted 3 iron_ingot."));
    assert_eq!(h.world.item_count("iron_ingot"), 3);
    assert_eq!(h.world.item_count("iron_ore"), 0);
    assert_eq!(h.world.block(BlockPos::new(1, 64, 0)).name, "furnace");

    h.say("steve", "minebot smelt diamond").await;
    advance(700).await;
    assert!(h.world.said("No smelting recipe for 'diamond'."));
}

#[tokio::test(start_paused = true)]
async fn sleeps_only_at_night() {
    let h = harness(SimWorld::new("minebot").with_item("red_bed", 1));
    h.say("steve", "minebot sleep").await;
    advance(100).await;
    assert!(h.world.said("It's not night time."));
    assert_eq!(h.world.item_count("red_bed"), 1);

    let h = harness(SimWorld::new("minebot").with_time(18_000).with_item("red_bed", 1));
    h.say("steve", "minebot sleep").await;
    advance(100).await;
    assert!(h.world.said("Slept until morning."));
    assert_eq!(h.world.current_time(), 0);
    assert_eq!(h.world.block(BlockPos::new(1, 64, 0)).name, "red_bed");
}

#[tokio::test(start_paused = true)]
async fn sleep_without_a_bed_says_so() {
    let h = harness(SimWorld::new("minebot").with_time(13_000));
    h.say("steve", "minebot sleep").await;
    advance(100).await;
    assert!(h.world.said("Need a bed and I don't have one."));
}
