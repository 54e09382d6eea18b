//! Crafting, smelting and sleeping. Each needs a station block, which is
//! placed from the inventory when none is close by.

use std::time::Duration;

use crate::agent::AgentContext;
use crate::geometry::BlockPos;
use crate::items;
use crate::world::{self, Block, World, WorldError};

use super::CommandError;

const STATION_APPROACH: Duration = Duration::from_secs(8);

/// Spots tried, in order, when placing a station next to the agent.
const PLACEMENT_OFFSETS: [(i32, i32, i32); 8] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
    (1, 1, 0),
    (-1, 1, 0),
    (0, 1, 1),
    (0, 1, -1),
];

struct Station {
    label: &'static str,
    radius: f64,
    matches: fn(&str) -> bool,
}

fn is_crafting_table(name: &str) -> bool {
    name == "crafting_table"
}

fn is_furnace(name: &str) -> bool {
    name == "furnace"
}

const CRAFTING_TABLE: Station = Station {
    label: "crafting table",
    radius: 8.0,
    matches: is_crafting_table,
};

const FURNACE: Station = Station {
    label: "furnace",
    radius: 8.0,
    matches: is_furnace,
};

const BED: Station = Station {
    label: "bed",
    radius: 16.0,
    matches: items::is_bed,
};

/// Nearest matching block, or one placed from the inventory.
async fn find_or_place(world: &dyn World, station: &Station) -> Result<BlockPos, CommandError> {
    let origin = world.position().await;
    let nearby = world
        .find_blocks(origin, station.radius, &|b: &Block| (station.matches)(&b.name), 1)
        .await;
    if let Some(block) = nearby.into_iter().next() {
        return Ok(block.pos);
    }

    let item = world
        .inventory()
        .await
        .into_iter()
        .find(|stack| (station.matches)(&stack.name))
        .map(|stack| stack.name)
        .ok_or(CommandError::NoStation(station.label))?;

    let base = origin.floored();
    for (dx, dy, dz) in PLACEMENT_OFFSETS {
        let pos = base.offset(dx, dy, dz);
        if !world.block_at(pos).await.is_some_and(|b| b.is_air()) {
            continue;
        }
        match world.place_block(&item, pos).await {
            Ok(()) => {
                tracing::debug!(item = %item, %pos, "placed station");
                return Ok(pos);
            }
            Err(e) => tracing::debug!(item = %item, %pos, error = %e, "placement failed"),
        }
    }
    Err(CommandError::NoPlacement(station.label))
}

pub(super) async fn craft(ctx: &AgentContext, item: &str, count: u32) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let recipe_error = |e: WorldError| match e {
        WorldError::NoRecipe(_) => CommandError::Failed(format!("No recipe for '{item}'.")),
        other => CommandError::Actuation {
            action: "craft",
            source: other,
        },
    };

    match world.craft(item, count, None).await {
        Ok(()) => {}
        Err(WorldError::NeedsCraftingTable) => {
            let table = find_or_place(world, &CRAFTING_TABLE).await?;
            world::go_near(world, table.as_vec3(), 1.6, STATION_APPROACH).await;
            world
                .craft(item, count, Some(table))
                .await
                .map_err(recipe_error)?;
        }
        Err(e) => return Err(recipe_error(e)),
    }
    world.chat(&format!("Crafted {count} {item}.")).await;
    Ok(())
}

pub(super) async fn smelt(ctx: &AgentContext, item: &str, count: u32) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let furnace = find_or_place(world, &FURNACE).await?;
    world::go_near(world, furnace.as_vec3(), 1.6, STATION_APPROACH).await;
    world
        .smelt(item, count, furnace)
        .await
        .map_err(|e| match e {
            WorldError::NoRecipe(_) => {
                CommandError::Failed(format!("No smelting recipe for '{item}'."))
            }
            other => CommandError::Actuation {
                action: "smelt",
                source: other,
            },
        })?;
    world.chat(&format!("Smelted {count} {item}.")).await;
    Ok(())
}

pub(super) async fn sleep(ctx: &AgentContext) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    if !world::is_night(world.time_of_day().await) {
        return Err(CommandError::NotNight);
    }
    let bed = find_or_place(world, &BED).await?;
    world::go_near(world, bed.as_vec3(), 1.6, STATION_APPROACH).await;
    world
        .sleep(bed)
        .await
        .map_err(CommandError::actuation("sleep"))?;
    world.chat("Slept until morning.").await;
    Ok(())
}
