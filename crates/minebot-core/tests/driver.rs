mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use minebot_core::geometry::BlockPos;
use minebot_core::world::Block;
use minebot_core::{LoopDriver, ModeKind, ModeRequest, SimWorld, StartOutcome};

use common::{advance, harness};

#[tokio::test(start_paused = true)]
async fn start_while_active_and_stop_while_inactive_are_noops() {
    let h = harness(SimWorld::new("minebot"));
    let ctx = h.ctx();

    assert_eq!(ctx.start_mode(ModeRequest::Roam).await.unwrap(), StartOutcome::Started);
    assert_eq!(
        ctx.start_mode(ModeRequest::Roam).await.unwrap(),
        StartOutcome::AlreadyActive
    );
    assert_eq!(ctx.driver.active_modes(), vec![ModeKind::Roam]);

    assert!(ctx.stop_mode(ModeKind::Roam).await);
    assert!(!ctx.stop_mode(ModeKind::Roam).await);
    assert!(ctx.driver.active_modes().is_empty());

    let journal: Vec<String> = ctx
        .events
        .read_recent(10)
        .into_iter()
        .map(|e| format!("{} {}", e.event_type, e.mode.unwrap_or_default()))
        .collect();
    assert_eq!(journal, vec!["mode_started roam", "mode_stopped roam"]);
}

#[tokio::test(start_paused = true)]
async fn ticks_of_one_mode_never_overlap() {
    let driver = LoopDriver::new();
    let running = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let ticks = Arc::new(AtomicUsize::new(0));

    let (r, p, t) = (running.clone(), peak.clone(), ticks.clone());
    driver.start(ModeKind::Farmer, Duration::from_millis(500), move || {
        let (r, p, t) = (r.clone(), p.clone(), t.clone());
        async move {
            let now = r.fetch_add(1, Ordering::SeqCst) + 1;
            p.fetch_max(now, Ordering::SeqCst);
            t.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(2000)).await;
            r.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    });

    advance(6000).await;
    driver.shutdown();

    assert!(ticks.load(Ordering::SeqCst) >= 2);
    assert_eq!(peak.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_and_panicking_ticks_keep_the_timer() {
    let driver = LoopDriver::new();
    let ticks = Arc::new(AtomicUsize::new(0));

    let t = ticks.clone();
    driver.start(ModeKind::Survival, Duration::from_millis(100), move || {
        let t = t.clone();
        async move {
            let n = t.fetch_add(1, Ordering::SeqCst);
            if n == 1 {
                panic!("tick blew up");
            }
            Err(anyhow::anyhow!("tick {n} failed"))
        }
    });

    advance(450).await;
    assert_eq!(ticks.load(Ordering::SeqCst), 4);
    assert!(driver.is_active(ModeKind::Survival));
    driver.shutdown();
    assert!(!driver.is_active(ModeKind::Survival));
}

#[tokio::test(start_paused = true)]
async fn stop_lets_the_in_flight_tick_finish() {
    let driver = LoopDriver::new();
    let finished = Arc::new(AtomicBool::new(false));
    let ticks = Arc::new(AtomicUsize::new(0));

    let (f, t) = (finished.clone(), ticks.clone());
    driver.start(ModeKind::Woodcutter, Duration::from_millis(500), move || {
        let (f, t) = (f.clone(), t.clone());
        async move {
            t.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(1000)).await;
            f.store(true, Ordering::SeqCst);
            Ok(())
        }
    });

    advance(600).await;
    assert!(driver.stop(ModeKind::Woodcutter));
    assert!(!finished.load(Ordering::SeqCst));

    advance(3000).await;
    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(ticks.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_starts_register_one_loop() {
    let h = harness(SimWorld::new("minebot"));
    let ctx = h.ctx();

    let (a, b) = tokio::join!(
        ctx.start_mode(ModeRequest::Guard { radius: None }),
        ctx.start_mode(ModeRequest::Guard { radius: Some(5) }),
    );
    let mut outcomes = vec![a.unwrap(), b.unwrap()];
    outcomes.sort_by_key(|o| *o == StartOutcome::AlreadyActive);
    assert_eq!(outcomes, vec![StartOutcome::Started, StartOutcome::AlreadyActive]);

    let started = ctx
        .events
        .read_recent(10)
        .into_iter()
        .filter(|e| e.event_type == "mode_started")
        .count();
    assert_eq!(started, 1);
}

#[tokio::test(start_paused = true)]
async fn a_failed_start_releases_the_mode() {
    let h = harness(SimWorld::new("minebot"));
    let ctx = h.ctx();
    assert!(ctx.start_mode(ModeRequest::Farmer).await.is_err());

    h.world.set_block(Block::new(BlockPos::new(2, 63, 2), "farmland"));
    assert_eq!(ctx.start_mode(ModeRequest::Farmer).await.unwrap(), StartOutcome::Started);
    assert!(ctx.driver.is_active(ModeKind::Farmer));
}
