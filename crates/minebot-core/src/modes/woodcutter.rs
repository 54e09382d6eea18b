//! Woodcutter mode - clear every log in a circular area, then store the wood.

use std::time::Duration;

use crate::agent::AgentContext;
use crate::commands::CommandError;
use crate::geometry::Vec3;
use crate::items;
use crate::world::{self, Block};

use super::gather_wood::dig_down_to;
use super::ModeKind;

#[derive(Debug, Clone, Default)]
pub struct WoodcutterState {
    pub center: Option<Vec3>,
    pub radius: f64,
    /// Finish already ran for this session
    pub finished: bool,
}

/// Why a woodcutting session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    InventoryFull,
    NoAxe,
    AreaCleared,
}

impl FinishReason {
    fn describe(self) -> &'static str {
        match self {
            Self::InventoryFull => "inventory full",
            Self::NoAxe => "no axe left",
            Self::AreaCleared => "no more logs in the area",
        }
    }
}

pub(crate) async fn prepare(ctx: &AgentContext, diameter: u32) -> Result<(), CommandError> {
    if diameter == 0 {
        return Err(CommandError::Usage("woodcutter <diameter>"));
    }
    let center = ctx.world.position().await;
    *ctx.modes.woodcutter.lock().await = WoodcutterState {
        center: Some(center),
        radius: diameter as f64 / 2.0,
        finished: false,
    };
    tracing::info!(center = %center, diameter, "woodcutter area set");
    Ok(())
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    let state = ctx.modes.woodcutter.lock().await.clone();
    let Some(center) = state.center else {
        return Ok(());
    };
    if state.finished {
        return Ok(());
    }
    let world = ctx.world.as_ref();
    if world.is_collecting().await {
        return Ok(());
    }

    let inventory = world.inventory().await;
    let axe = items::best_axe(&inventory);
    if world.empty_slots().await == 0 {
        finish(ctx, FinishReason::InventoryFull).await;
        return Ok(());
    }
    let Some(axe) = axe else {
        finish(ctx, FinishReason::NoAxe).await;
        return Ok(());
    };

    // Trees reach well above the center, so scan a taller sphere and trim to the cylinder.
    let radius = state.radius;
    let mut logs: Vec<Block> = world
        .find_blocks(center, radius + 16.0, &|b: &Block| items::is_log(&b.name), 256)
        .await
        .into_iter()
        .filter(|b| b.pos.as_vec3().offset(0.5, 0.0, 0.5).horizontal_distance_to(center) <= radius)
        .collect();

    let pos = world.position().await;
    logs.sort_by(|a, b| {
        let da = a.pos.as_vec3().distance_to(pos);
        let db = b.pos.as_vec3().distance_to(pos);
        da.total_cmp(&db)
    });
    let Some(log) = logs.into_iter().next() else {
        finish(ctx, FinishReason::AreaCleared).await;
        return Ok(());
    };

    dig_down_to(world, log.pos).await?;
    world.equip(&axe).await?;
    tracing::debug!(log = %log.name, pos = %log.pos, "woodcutter collecting");
    world.collect(&[log.pos]).await?;
    Ok(())
}

/// End the session: stop the timer, store wood in a chest near the area and
/// announce the result. Runs at most once per session.
pub async fn finish(ctx: &AgentContext, reason: FinishReason) {
    let (center, radius) = {
        let mut state = ctx.modes.woodcutter.lock().await;
        if state.finished {
            return;
        }
        state.finished = true;
        (state.center, state.radius)
    };
    ctx.driver.stop(ModeKind::Woodcutter);
    ctx.world.cancel_collect().await;
    tracing::info!(reason = reason.describe(), "woodcutter finishing");

    let world = ctx.world.as_ref();
    let mut message = format!("Woodcutting finished ({}).", reason.describe());
    let chest = match center {
        Some(center) => world::find_chest_near(world, center, radius * 2.0).await,
        None => None,
    };
    match chest {
        Some(chest) => {
            world::go_near(world, chest.pos.as_vec3(), 2.0, Duration::from_secs(15)).await;
            match world::deposit_items(world, chest.pos, items::is_wood_item).await {
                Ok(stored) => {
                    let total: u32 = stored.iter().map(|s| s.count).sum();
                    message.push_str(&format!(" Stored {total} wood in the chest."));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to store wood");
                    message.push_str(" Couldn't store the wood.");
                }
            }
        }
        None => message.push_str(" No chest nearby to store the wood."),
    }

    ctx.record_mode_event("mode_finished", ModeKind::Woodcutter, &message);
    world.chat(&message).await;
}
