//! Read-only report commands. These run immediately, bypassing the queue.

use crate::agent::AgentContext;
use crate::items;
use crate::kernel::QueueStatus;
use crate::modes::{combat, ModeKind};

use super::{Command, CommandError};

const THREATS_SHOWN: usize = 3;

pub async fn threats(ctx: &AgentContext) -> Result<(), CommandError> {
    let range = ctx.combat_range() as f64;
    let all = combat::threat_snapshot(ctx, f64::MAX).await;
    let (inside, beyond): (Vec<_>, Vec<_>) = all.into_iter().partition(|t| t.distance <= range);

    let describe = |threats: &[combat::Threat]| {
        threats
            .iter()
            .take(THREATS_SHOWN)
            .map(|t| format!("{} ({:.0}m)", t.entity.display_name(), t.distance))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let reply = match (inside.is_empty(), beyond.is_empty()) {
        (true, true) => "No threats detected.".to_string(),
        (false, _) => format!(
            "{} threat(s) within {range:.0} blocks: {}",
            inside.len(),
            describe(&inside)
        ),
        (true, false) => format!(
            "No threats within {range:.0} blocks. Beyond range: {}",
            describe(&beyond)
        ),
    };
    ctx.world.chat(&reply).await;
    Ok(())
}

fn active_summary(modes: &[ModeKind]) -> String {
    if modes.is_empty() {
        "idle".to_string()
    } else {
        modes
            .iter()
            .map(ModeKind::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub async fn status(ctx: &AgentContext) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let pos = world.position().await.floored();
    let reply = format!(
        "HP {:.0}/20, food {}/20 at ({} {} {}). Modes: {}{}",
        world.health().await,
        world.food().await,
        pos.x,
        pos.y,
        pos.z,
        active_summary(&ctx.driver.active_modes()),
        if ctx.defense.is_defending() {
            ". Defending!"
        } else {
            "."
        },
    );
    world.chat(&reply).await;
    Ok(())
}

pub async fn status_full(ctx: &AgentContext) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let pos = world.position().await.floored();
    let held = world
        .held_item()
        .await
        .map(|stack| stack.name)
        .unwrap_or_else(|| "nothing".to_string());
    let (home, marks, whitelist) = {
        let store = ctx.store.lock().await;
        let home = store
            .waypoints()
            .home()
            .map(|h| format!("({} {} {})", h.x, h.y, h.z))
            .unwrap_or_else(|| "not set".to_string());
        let whitelist = if store.whitelist().is_enabled() {
            "on"
        } else {
            "off"
        };
        (home, store.waypoints().marks().count(), whitelist)
    };

    let lines = [
        format!(
            "HP {:.0}/20, food {}/20, holding {held}.",
            world.health().await,
            world.food().await
        ),
        format!(
            "At ({} {} {}) in {}, time {}.",
            pos.x,
            pos.y,
            pos.z,
            world.dimension().await,
            world.time_of_day().await
        ),
        format!("Modes: {}.", active_summary(&ctx.driver.active_modes())),
        format!(
            "Combat range {}, self-defense {}.",
            ctx.combat_range(),
            if ctx.defense.is_defending() {
                "engaged"
            } else {
                "ready"
            }
        ),
        format!("Home {home}, {marks} waypoint(s), whitelist {whitelist}."),
    ];
    for line in lines {
        world.chat(&line).await;
    }
    Ok(())
}

pub async fn self_defense(ctx: &AgentContext) -> Result<(), CommandError> {
    let reply = match ctx.defense.session().await {
        Some(session) => {
            let resume = session
                .saved_task
                .map(|m| format!(" Will resume {m} afterwards."))
                .unwrap_or_default();
            format!(
                "Self-defense: ACTIVE against {}.{resume}",
                session.attacker_name
            )
        }
        None => "Self-defense: enabled (always on), no current threat.".to_string(),
    };
    ctx.world.chat(&reply).await;
    Ok(())
}

/// Log every inventory item's food value; chat the edible ones.
pub async fn check_food(ctx: &AgentContext) -> Result<(), CommandError> {
    let inventory = ctx.world.inventory().await;
    for stack in &inventory {
        match items::food_value(&stack.name) {
            Some(points) => {
                tracing::info!(item = %stack.name, count = stack.count, points, "food item")
            }
            None => tracing::info!(item = %stack.name, count = stack.count, "not food"),
        }
    }
    let foods: Vec<&str> = inventory
        .iter()
        .filter(|stack| items::is_food(&stack.name))
        .map(|stack| stack.name.as_str())
        .collect();
    ctx.world
        .chat(&format!(
            "Found {} food items: {}",
            foods.len(),
            foods.join(", ")
        ))
        .await;
    Ok(())
}

pub async fn debug_survival(ctx: &AgentContext) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let eating = ctx.modes.auto_eat.lock().await.eating;
    let weapon_equipped = ctx.modes.survival.lock().await.weapon_equipped;
    let hostiles = combat::threat_snapshot(ctx, f64::MAX).await;
    let food = world.food().await;
    let health = world.health().await;
    tracing::info!(
        survival = ctx.driver.is_active(ModeKind::Survival),
        auto_eat = ctx.driver.is_active(ModeKind::AutoEat),
        combat_range = ctx.combat_range(),
        eating,
        weapon_equipped,
        food,
        health,
        hostiles = hostiles.len(),
        "survival debug"
    );
    for threat in &hostiles {
        tracing::info!(
            name = threat.entity.display_name(),
            distance = threat.distance.round(),
            "hostile"
        );
    }
    world.chat("Debug info logged to console.").await;
    Ok(())
}

pub async fn whitelist(ctx: &AgentContext, command: &Command) -> Result<(), CommandError> {
    let reply = {
        let store = ctx.store.lock().await;
        let whitelist = store.whitelist();
        let players: Vec<&str> = whitelist.players().map(String::as_str).collect();
        let listed = if players.is_empty() {
            "(empty)".to_string()
        } else {
            players.join(", ")
        };
        match command {
            Command::WhitelistShow => format!(
                "Whitelist is {}. Players: {listed}",
                if whitelist.is_enabled() {
                    "ON"
                } else {
                    "OFF"
                }
            ),
            _ => format!("Whitelisted players: {listed}"),
        }
    };
    ctx.world.chat(&reply).await;
    Ok(())
}

/// One-line summary of the action queue.
pub fn format_queue(status: &QueueStatus) -> String {
    let mut reply = format!("Queue: {} pending", status.pending.len());
    if let Some(entry) = &status.in_flight {
        reply.push_str(&format!(", running '{}'", entry.command));
    }
    if status.paused {
        reply.push_str(" (paused)");
    }
    if !status.pending.is_empty() {
        let next: Vec<String> = status
            .pending
            .iter()
            .take(THREATS_SHOWN)
            .map(|e| e.command.to_string())
            .collect();
        reply.push_str(&format!(". Next: {}", next.join(", ")));
    }
    reply.push('.');
    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::QueueEntry;

    #[test]
    fn queue_summary_mentions_paused_and_next() {
        let status = QueueStatus {
            pending: vec![
                QueueEntry::new(Command::GatherWood, "steve", false),
                QueueEntry::new(Command::Inventory, "steve", false),
            ],
            in_flight: Some(QueueEntry::new(Command::Come, "alex", false)),
            paused: true,
            running: false,
        };
        let text = format_queue(&status);
        assert_eq!(
            text,
            "Queue: 2 pending, running 'come' (paused). Next: gather wood, inventory."
        );
        assert_eq!(format_queue(&QueueStatus::default()), "Queue: 0 pending.");
    }
}
