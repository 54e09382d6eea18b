//! Inventory and container commands.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::agent::AgentContext;
use crate::items;
use crate::world::{self, ContainerSession, ItemStack};

use super::CommandError;

const CHEST_RADIUS: f64 = 16.0;
const SUMMARY_LIMIT: usize = 15;

fn totals(stacks: &[ItemStack]) -> BTreeMap<String, u32> {
    let mut totals = BTreeMap::new();
    for stack in stacks {
        *totals.entry(stack.name.clone()).or_insert(0) += stack.count;
    }
    totals
}

pub(super) async fn list(ctx: &AgentContext) -> Result<(), CommandError> {
    let totals = totals(&ctx.world.inventory().await);
    let reply = if totals.is_empty() {
        "Inventory empty.".to_string()
    } else {
        totals
            .iter()
            .take(SUMMARY_LIMIT)
            .map(|(name, count)| format!("{name}:{count}"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    ctx.world.chat(&reply).await;
    Ok(())
}

pub(super) async fn give(
    ctx: &AgentContext,
    actor: &str,
    item: &str,
    count: Option<u32>,
) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let totals = totals(&world.inventory().await);
    let matches = items::resolve_term(item, totals.keys().map(String::as_str));
    let (name, held) = matches
        .iter()
        .filter_map(|n| totals.get(n).map(|c| (n.clone(), *c)))
        .max_by_key(|(_, c)| *c)
        .ok_or_else(|| CommandError::ItemNotHeld(item.to_string()))?;
    let amount = count.map_or(held, |c| c.min(held));

    let player = ctx
        .find_player(actor)
        .await
        .ok_or_else(|| CommandError::PlayerNotVisible("you".to_string()))?;
    world::go_near(world, player.position, 2.0, Duration::from_secs(10)).await;
    world
        .toss(&name, amount)
        .await
        .map_err(CommandError::actuation("toss items"))?;
    world
        .chat(&format!("Gave you {amount} of your requested '{item}'."))
        .await;
    Ok(())
}

pub(super) async fn toss_all(ctx: &AgentContext, term: &str) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let totals = totals(&world.inventory().await);
    let matches = items::resolve_term(term, totals.keys().map(String::as_str));
    if matches.is_empty() {
        return Err(CommandError::ItemNotHeld(term.to_string()));
    }
    for name in matches {
        if let Some(count) = totals.get(&name) {
            world
                .toss(&name, *count)
                .await
                .map_err(CommandError::actuation("toss"))?;
        }
    }
    world.chat(&format!("Tossed all '{term}'.")).await;
    Ok(())
}

pub(super) async fn deposit(ctx: &AgentContext, term: Option<&str>) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let chest = world::find_nearest_chest(world, CHEST_RADIUS)
        .await
        .ok_or(CommandError::NoChest)?;

    let selected: Option<Vec<String>> = match term {
        None => None,
        Some(term) => {
            let totals = totals(&world.inventory().await);
            let matches = items::resolve_term(term, totals.keys().map(String::as_str));
            if matches.is_empty() {
                return Err(CommandError::ItemNotHeld(term.to_string()));
            }
            Some(matches)
        }
    };

    world::go_near(world, chest.pos.as_vec3(), 1.6, Duration::from_secs(12)).await;
    world::deposit_items(world, chest.pos, |name| {
        selected
            .as_ref()
            .map_or(true, |names| names.iter().any(|n| n == name))
    })
    .await
    .map_err(CommandError::actuation("deposit"))?;

    let reply = match term {
        Some(term) => format!("Deposited '{term}'."),
        None => "Deposited all.".to_string(),
    };
    world.chat(&reply).await;
    Ok(())
}

pub(super) async fn withdraw(
    ctx: &AgentContext,
    item: &str,
    count: Option<u32>,
) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let chest = world::find_nearest_chest(world, CHEST_RADIUS)
        .await
        .ok_or(CommandError::NoChest)?;
    world::go_near(world, chest.pos.as_vec3(), 1.6, Duration::from_secs(12)).await;

    let session = ContainerSession::open(world, chest.pos)
        .await
        .map_err(CommandError::actuation("open the chest"))?;
    let result = take_from(&session, item, count).await;
    session.close().await;
    let taken = result?;

    if taken == 0 {
        return Err(CommandError::Failed(format!("The chest has no '{item}'.")));
    }
    world
        .chat(&format!("Withdrew '{item}' x{taken}."))
        .await;
    Ok(())
}

async fn take_from(
    session: &ContainerSession<'_>,
    item: &str,
    count: Option<u32>,
) -> Result<u32, CommandError> {
    let stored = totals(
        &session
            .items()
            .await
            .map_err(CommandError::actuation("read the chest"))?,
    );
    let mut remaining = count.unwrap_or(u32::MAX);
    let mut taken = 0;
    for name in items::resolve_term(item, stored.keys().map(String::as_str)) {
        if remaining == 0 {
            break;
        }
        let available = stored.get(&name).copied().unwrap_or(0);
        let take = available.min(remaining);
        if take == 0 {
            continue;
        }
        session
            .withdraw(&name, take)
            .await
            .map_err(CommandError::actuation("withdraw"))?;
        remaining -= take;
        taken += take;
    }
    Ok(taken)
}
