//! Farmer mode - alternate planting and harvesting inside a fixed farm area.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::agent::AgentContext;
use crate::commands::CommandError;
use crate::geometry::{Bounds, Vec3};
use crate::items;
use crate::world::{self, Block, EntityKind, World};

const APPROACH_TIMEOUT: Duration = Duration::from_secs(6);
const DROP_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Planting,
    Harvesting,
}

impl Phase {
    fn other(self) -> Self {
        match self {
            Self::Planting => Self::Harvesting,
            Self::Harvesting => Self::Planting,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planting => f.write_str("planting"),
            Self::Harvesting => f.write_str("harvesting"),
        }
    }
}

/// Farm layout computed once at start plus the current phase.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmerArea {
    pub center: Vec3,
    pub bounds: Bounds,
    pub phase: Phase,
    /// Neither phase had work on the last tick
    pub waiting: bool,
}

/// Next phase to run, or `None` when nothing can be done.
pub fn choose_phase(current: Phase, can_plant: bool, can_harvest: bool) -> Option<Phase> {
    let has_work = |phase| match phase {
        Phase::Planting => can_plant,
        Phase::Harvesting => can_harvest,
    };
    if has_work(current) {
        Some(current)
    } else if has_work(current.other()) {
        Some(current.other())
    } else {
        None
    }
}

pub(crate) async fn prepare(ctx: &AgentContext) -> Result<(), CommandError> {
    let pos = ctx.world.position().await;
    let farmland = ctx
        .world
        .find_blocks(
            pos,
            ctx.config.farmer.scan_radius,
            &|b: &Block| b.name == "farmland",
            4096,
        )
        .await;
    let mut bounds =
        Bounds::enclosing(farmland.iter().map(|b| b.pos)).ok_or(CommandError::NoFarmland)?;
    bounds.max_y += 1;

    let area = FarmerArea {
        center: bounds.center(),
        bounds,
        phase: Phase::Planting,
        waiting: false,
    };
    tracing::info!(
        cells = farmland.len(),
        center = %area.center,
        radius = bounds.radius(),
        "farm area mapped"
    );
    *ctx.modes.farmer.lock().await = Some(area);
    Ok(())
}

/// Seed counts in the inventory.
fn seed_counts(inventory: &[world::ItemStack]) -> BTreeMap<String, u32> {
    let mut seeds = BTreeMap::new();
    for stack in inventory.iter().filter(|s| items::is_seed(&s.name)) {
        *seeds.entry(stack.name.clone()).or_insert(0) += stack.count;
    }
    seeds
}

/// Farmland cells inside the bounds with nothing planted on top.
async fn empty_farmland(world: &dyn World, area: &FarmerArea) -> Vec<Block> {
    let bounds = area.bounds;
    let cells = world
        .find_blocks(
            area.center,
            bounds.radius() + 2.0,
            &move |b: &Block| b.name == "farmland" && bounds.contains_block(b.pos),
            4096,
        )
        .await;
    let mut empty = Vec::new();
    for cell in cells {
        let free = world
            .block_at(cell.pos.above())
            .await
            .map_or(true, |b| b.is_air());
        if free {
            empty.push(cell);
        }
    }
    empty
}

async fn mature_crops(world: &dyn World, area: &FarmerArea) -> Vec<Block> {
    let bounds = area.bounds;
    world
        .find_blocks(
            area.center,
            bounds.radius() + 2.0,
            &move |b: &Block| items::is_mature(b) && bounds.contains_block(b.pos),
            4096,
        )
        .await
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    let Some(area) = ctx.modes.farmer.lock().await.clone() else {
        return Ok(());
    };
    let world = ctx.world.as_ref();
    let margin = ctx.config.farmer.bounds_margin;

    if !area.bounds.contains(world.position().await, margin) {
        tracing::debug!(center = %area.center, "outside farm, walking back");
        world::go_near(world, area.center, 2.0, Duration::from_secs(10)).await;
        return Ok(());
    }

    let seeds = seed_counts(&world.inventory().await);
    let empty = empty_farmland(world, &area).await;
    let mature = mature_crops(world, &area).await;
    let can_plant = !seeds.is_empty() && !empty.is_empty();
    let can_harvest = !mature.is_empty();

    let Some(phase) = choose_phase(area.phase, can_plant, can_harvest) else {
        if !area.waiting {
            tracing::info!(phase = %area.phase, "farm idle, waiting for crops or seeds");
        }
        write_back(ctx, area.phase, true).await;
        return Ok(());
    };

    let next = match phase {
        Phase::Planting => {
            let planted = plant(ctx, &empty, seeds).await;
            if planted > 0 && !mature_crops(world, &area).await.is_empty() {
                Phase::Harvesting
            } else {
                Phase::Planting
            }
        }
        Phase::Harvesting => {
            let harvested = harvest(ctx, &mature).await;
            let seeds_left = !seed_counts(&world.inventory().await).is_empty();
            if harvested > 0 && seeds_left && !empty_farmland(world, &area).await.is_empty() {
                Phase::Planting
            } else {
                Phase::Harvesting
            }
        }
    };
    write_back(ctx, next, false).await;
    Ok(())
}

async fn write_back(ctx: &AgentContext, phase: Phase, waiting: bool) {
    let mut state = ctx.modes.farmer.lock().await;
    if let Some(area) = state.as_mut() {
        if area.phase != phase {
            tracing::info!(from = %area.phase, to = %phase, "farm phase change");
        }
        area.phase = phase;
        area.waiting = waiting;
    }
}

async fn plant(ctx: &AgentContext, cells: &[Block], mut seeds: BTreeMap<String, u32>) -> usize {
    let world = ctx.world.as_ref();
    let mut planted = 0;
    for cell in cells {
        if ctx.defense.is_defending() {
            break;
        }
        let Some(seed) = seeds
            .iter()
            .find(|(_, count)| **count > 0)
            .map(|(name, _)| name.clone())
        else {
            break;
        };

        if let Err(e) = world.equip(&seed).await {
            tracing::warn!(seed = %seed, error = %e, "failed to equip seed");
            seeds.remove(&seed);
            continue;
        }
        world::go_near(world, cell.pos.above().as_vec3(), 2.0, APPROACH_TIMEOUT).await;
        match world.activate_block(cell.pos).await {
            Ok(()) => {
                planted += 1;
                if let Some(count) = seeds.get_mut(&seed) {
                    *count -= 1;
                }
            }
            Err(e) => tracing::debug!(pos = %cell.pos, error = %e, "planting failed"),
        }
    }
    if planted > 0 {
        tracing::info!(planted, "planting pass done");
    }
    planted
}

async fn harvest(ctx: &AgentContext, crops: &[Block]) -> usize {
    let world = ctx.world.as_ref();
    let low_water = ctx.config.farmer.low_water_slots;
    let mut harvested = 0;
    for crop in crops {
        if ctx.defense.is_defending() {
            break;
        }
        if world.empty_slots().await < low_water {
            store_produce(ctx).await;
        }

        world::go_near(world, crop.pos.as_vec3(), 2.0, APPROACH_TIMEOUT).await;
        if let Err(e) = world.dig(crop.pos).await {
            tracing::debug!(pos = %crop.pos, error = %e, "harvest failed");
            continue;
        }
        harvested += 1;

        let spot = crop.pos.as_vec3();
        let drops: Vec<_> = world
            .entities()
            .await
            .into_iter()
            .filter(|e| e.kind == EntityKind::Object && e.position.distance_to(spot) <= DROP_RADIUS)
            .collect();
        for drop in drops {
            world::go_near(world, drop.position, 0.5, Duration::from_secs(2)).await;
        }
    }
    if harvested > 0 {
        tracing::info!(harvested, "harvest pass done");
    }
    harvested
}

/// Put non-seed produce into a nearby chest, if there is one.
async fn store_produce(ctx: &AgentContext) {
    let world = ctx.world.as_ref();
    let Some(chest) = world::find_nearest_chest(world, ctx.config.farmer.chest_radius).await else {
        tracing::warn!("inventory nearly full and no chest near the farm");
        return;
    };
    world::go_near(world, chest.pos.as_vec3(), 2.0, APPROACH_TIMEOUT).await;
    match world::deposit_items(world, chest.pos, items::is_farm_produce).await {
        Ok(stored) => tracing::info!(stacks = stored.len(), "stored produce"),
        Err(e) => tracing::warn!(error = %e, "failed to store produce"),
    }
}
