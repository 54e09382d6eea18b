mod common;

use minebot_core::geometry::BlockPos;
use minebot_core::modes::woodcutter::{self, FinishReason};
use minebot_core::world::{Block, ItemStack};
use minebot_core::{CommandError, ModeKind, ModeRequest, SimWorld};

use common::{advance, harness};

fn log(x: i32, y: i32, z: i32) -> Block {
    Block::new(BlockPos::new(x, y, z), "oak_log")
}

#[tokio::test(start_paused = true)]
async fn clears_logs_inside_the_area_only() {
    let h = harness(
        SimWorld::new("minebot")
            .with_item("stone_axe", 1)
            .with_block(log(2, 64, 0))
            .with_block(log(2, 65, 0))
            .with_block(log(0, 64, 3))
            .with_block(log(12, 64, 0)),
    );
    let ctx = h.ctx();
    ctx.start_mode(ModeRequest::Woodcutter { diameter: 10 })
        .await
        .unwrap();

    advance(7_000).await;
    assert!(!ctx.driver.is_active(ModeKind::Woodcutter));
    assert_eq!(h.world.item_count("oak_log"), 3);
    assert_eq!(h.world.block(BlockPos::new(12, 64, 0)).name, "oak_log");
    assert!(h.world.said(
        "Woodcutting finished (no more logs in the area). No chest nearby to store the wood."
    ));
}

#[tokio::test(start_paused = true)]
async fn finish_runs_once_when_every_reason_applies() {
    let chest = BlockPos::new(3, 64, 0);
    let h = harness(
        SimWorld::new("minebot")
            .with_slots(1)
            .with_item("oak_log", 5)
            .with_block(Block::new(chest, "chest")),
    );
    let ctx = h.ctx();
    ctx.start_mode(ModeRequest::Woodcutter { diameter: 10 })
        .await
        .unwrap();

    advance(1_600).await;
    woodcutter::finish(ctx, FinishReason::NoAxe).await;
    advance(5_000).await;

    let finishes = h
        .world
        .chat_log()
        .into_iter()
        .filter(|line| line.starts_with("Woodcutting finished"))
        .collect::<Vec<_>>();
    assert_eq!(
        finishes,
        vec!["Woodcutting finished (inventory full). Stored 5 wood in the chest."]
    );
    assert_eq!(h.world.container(chest), vec![ItemStack::new("oak_log", 5)]);
    assert!(!ctx.driver.is_active(ModeKind::Woodcutter));

    let journaled = ctx
        .events
        .read_recent(10)
        .into_iter()
        .filter(|e| e.event_type == "mode_finished")
        .count();
    assert_eq!(journaled, 1);
}

#[tokio::test(start_paused = true)]
async fn restart_after_finish_runs_a_fresh_session() {
    let h = harness(SimWorld::new("minebot").with_item("iron_axe", 1));
    let ctx = h.ctx();

    ctx.start_mode(ModeRequest::Woodcutter { diameter: 6 })
        .await
        .unwrap();
    advance(1_600).await;
    assert!(!ctx.driver.is_active(ModeKind::Woodcutter));

    h.world.set_block(log(1, 64, 1));
    ctx.start_mode(ModeRequest::Woodcutter { diameter: 6 })
        .await
        .unwrap();
    assert!(!ctx.modes.woodcutter.lock().await.finished);
    advance(1_600).await;
    assert_eq!(h.world.item_count("oak_log"), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_diameter_is_rejected() {
    let h = harness(SimWorld::new("minebot"));
    let result = h
        .ctx()
        .start_mode(ModeRequest::Woodcutter { diameter: 0 })
        .await;
    assert!(matches!(result, Err(CommandError::Usage(_))));
}
