//! Roam mode - wander to random spots with pauses in between.

use std::f64::consts::TAU;
use std::time::Duration;

use tokio::time::Instant;

use crate::agent::AgentContext;
use crate::commands::CommandError;
use crate::geometry::Vec3;
use crate::world::Goal;

const MIN_ALTITUDE: f64 = 60.0;

const FLAVOR_LINES: &[&str] = &[
    "Exploring...",
    "Let's see what's over here.",
    "Just wandering around.",
    "Nice day for a walk.",
    "I wonder what's that way.",
];

#[derive(Debug, Clone, Default)]
pub struct RoamState {
    pub last_move: Option<Instant>,
    pub dwell: Duration,
    pub current_target: Option<Vec3>,
}

pub(crate) async fn prepare(ctx: &AgentContext) -> Result<(), CommandError> {
    *ctx.modes.roam.lock().await = RoamState::default();
    Ok(())
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    let world = ctx.world.as_ref();
    world.stop_attack().await;
    world.cancel_collect().await;

    let RoamState {
        last_move, dwell, ..
    } = ctx.modes.roam.lock().await.clone();
    let due = last_move.map_or(true, |at| at.elapsed() >= dwell);

    if due {
        let pos = world.position().await;
        let (target, next_dwell, flavor) = ctx.with_rng(|rng| {
            let angle = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(20.0..50.0);
            let dy = rng.gen_range(-5.0..5.0);
            let mut target = pos.offset(angle.cos() * distance, dy, angle.sin() * distance);
            target.y = target.y.max(MIN_ALTITUDE);
            let dwell = Duration::from_secs_f64(rng.gen_range(3.0..8.0));
            let flavor = if rng.chance(0.3) {
                rng.pick(FLAVOR_LINES).copied()
            } else {
                None
            };
            (target, dwell, flavor)
        });

        world.set_goal(Goal::Near { pos: target, range: 3.0 }).await;
        *ctx.modes.roam.lock().await = RoamState {
            last_move: Some(Instant::now()),
            dwell: next_dwell,
            current_target: Some(target),
        };
        tracing::debug!(target_pos = %target, dwell_ms = next_dwell.as_millis() as u64, "roaming");
        if let Some(line) = flavor {
            world.chat(line).await;
        }
    }

    let glance = ctx.with_rng(|rng| {
        rng.chance(0.1)
            .then(|| (rng.gen_range(0.0..TAU), rng.gen_range(-0.5..0.5)))
    });
    if let Some((yaw, pitch)) = glance {
        world.look(yaw, pitch).await;
    }
    Ok(())
}
