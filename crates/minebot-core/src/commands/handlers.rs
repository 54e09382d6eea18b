//! Command execution against the agent context.

use std::sync::Arc;

use crate::agent::AgentContext;
use crate::items::WeaponPriority;
use crate::kernel::StartOutcome;
use crate::modes::{combat, guard, ModeKind, ModeRequest};
use crate::state::Waypoint;
use crate::world::{EntityKind, Goal};

use super::{crafting, gathering, inventory, report, Command, CommandError};

const FOLLOW_RANGE: f64 = 2.0;
const KILL_SEARCH_RADIUS: f64 = 64.0;

/// Run a command to completion on behalf of `actor`.
///
/// Replies for successful commands are chatted here; an `Err` carries the
/// reply for an expected failure.
pub async fn execute(
    ctx: &Arc<AgentContext>,
    command: &Command,
    actor: &str,
) -> Result<(), CommandError> {
    match command {
        Command::FollowMe => follow(ctx, actor, "you").await,
        Command::Follow(player) => follow(ctx, player, player).await,
        Command::Come => come(ctx, actor).await,
        Command::RoamOn => {
            start(ctx, ModeRequest::Roam, "Roaming mode enabled.", "Already roaming.").await
        }
        Command::RoamOff => {
            stop(ctx, ModeKind::Roam, "Roaming mode disabled.", "I'm not roaming.").await
        }

        Command::Fight(target) => fight(ctx, target.as_deref()).await,
        Command::Kill(mob) => kill(ctx, mob).await,

        Command::GatherWood => gathering::gather_wood(ctx).await,
        Command::GatherOre { ore, count } => gathering::gather_ore(ctx, ore, *count).await,
        Command::GatherBlocks { block, count } => {
            gathering::gather_blocks(ctx, block, *count).await
        }
        Command::Pickup { radius } => gathering::pickup(ctx, *radius).await,
        Command::WoodcutterStart { diameter } => {
            let diameter = diameter.unwrap_or(ctx.config.woodcutter.default_diameter);
            let started = format!("Woodcutting a {diameter}-block area.");
            start(
                ctx,
                ModeRequest::Woodcutter { diameter },
                &started,
                "Already woodcutting.",
            )
            .await
        }
        Command::WoodcutterStop => {
            stop(ctx, ModeKind::Woodcutter, "Woodcutter stopped.", "I'm not woodcutting.").await
        }
        Command::FarmOn => start(ctx, ModeRequest::Farmer, "Farming started.", "Already farming.").await,
        Command::FarmOff => stop(ctx, ModeKind::Farmer, "Farming stopped.", "I'm not farming.").await,

        Command::SetHome => set_home(ctx).await,
        Command::GoHome => go_to(ctx, "home").await,
        Command::Mark(name) => mark(ctx, name).await,
        Command::Go(name) => go_to(ctx, name).await,
        Command::ListWaypoints => list_waypoints(ctx).await,
        Command::DeleteWaypoint(name) => {
            let removed = ctx.store.lock().await.waypoints_mut().remove(name)?;
            if !removed {
                return Err(CommandError::UnknownWaypoint(name.clone()));
            }
            ctx.world.chat(&format!("Deleted waypoint '{name}'.")).await;
            Ok(())
        }
        Command::Patrol(names) => {
            let started = format!("Patrolling: {}.", names.join(" -> "));
            start(
                ctx,
                ModeRequest::Patrol {
                    names: names.clone(),
                },
                &started,
                "Already patrolling.",
            )
            .await
        }
        Command::StopPatrol => stop(ctx, ModeKind::Patrol, "Patrol stopped.", "I'm not patrolling.").await,

        Command::SurvivalOn => {
            start(ctx, ModeRequest::Survival, "Survival mode enabled.", "Survival mode is already on.").await
        }
        Command::SurvivalOff => {
            stop(ctx, ModeKind::Survival, "Survival mode disabled.", "Survival mode is already off.").await
        }
        Command::AutoEatOn => start(ctx, ModeRequest::AutoEat, "Auto-eat enabled.", "Auto-eat is already on.").await,
        Command::AutoEatOff => stop(ctx, ModeKind::AutoEat, "Auto-eat disabled.", "Auto-eat is already off.").await,
        Command::Eat => {
            let item = crate::modes::auto_eat::eat_best(ctx).await?;
            ctx.world.chat(&format!("Ate {item}!")).await;
            Ok(())
        }
        Command::CheckFood => report::check_food(ctx).await,
        Command::DebugSurvival => report::debug_survival(ctx).await,
        Command::GuardHere { radius } => {
            let r = guard::effective_radius(*radius, ctx.config.guard.default_radius);
            let started = format!("Guarding this spot (r={r}).");
            start(
                ctx,
                ModeRequest::Guard { radius: *radius },
                &started,
                "Already guarding. Say \"guard stop\" first to move the guard point.",
            )
            .await
        }
        Command::GuardStop => stop(ctx, ModeKind::Guard, "Stopped guarding.", "I'm not guarding.").await,
        Command::CombatRange(range) => combat_range(ctx, *range).await,
        Command::Threats => report::threats(ctx).await,
        Command::Status => report::status(ctx).await,
        Command::StatusFull => report::status_full(ctx).await,
        Command::SelfDefenseStatus => report::self_defense(ctx).await,
        Command::SelfDefenseOn => {
            ctx.world
                .chat("Self-defense is always enabled. I will fight back when attacked.")
                .await;
            Ok(())
        }
        Command::SelfDefenseOff => {
            ctx.world
                .chat("Self-defense cannot be disabled. I will always defend myself.")
                .await;
            Ok(())
        }
        Command::Stop => stop_everything(ctx).await,

        Command::Inventory => inventory::list(ctx).await,
        Command::GiveMe { item, count } => inventory::give(ctx, actor, item, *count).await,
        Command::TossAll(term) => inventory::toss_all(ctx, term).await,
        Command::Deposit(term) => inventory::deposit(ctx, term.as_deref()).await,
        Command::Withdraw { item, count } => inventory::withdraw(ctx, item, *count).await,

        Command::Craft { item, count } => crafting::craft(ctx, item, *count).await,
        Command::Smelt { item, count } => crafting::smelt(ctx, item, *count).await,
        Command::Sleep => crafting::sleep(ctx).await,

        Command::WhitelistOn => {
            let players = {
                let mut store = ctx.store.lock().await;
                store.whitelist_mut().set_enabled(true)?;
                store.whitelist().players().cloned().collect::<Vec<_>>()
            };
            ctx.world
                .chat(&format!(
                    "Whitelist enabled. I will only respond to: {}",
                    players.join(", ")
                ))
                .await;
            Ok(())
        }
        Command::WhitelistOff => {
            ctx.store.lock().await.whitelist_mut().set_enabled(false)?;
            ctx.world
                .chat("Whitelist disabled. I will respond to everyone.")
                .await;
            Ok(())
        }
        Command::WhitelistAdd(player) => {
            let added = ctx.store.lock().await.whitelist_mut().add(player)?;
            let reply = if added {
                format!("Added {player} to whitelist.")
            } else {
                format!("{player} is already whitelisted.")
            };
            ctx.world.chat(&reply).await;
            Ok(())
        }
        Command::WhitelistRemove(player) => {
            let removed = ctx.store.lock().await.whitelist_mut().remove(player)?;
            let reply = if removed {
                format!("Removed {player} from whitelist.")
            } else {
                format!("{player} is not in the whitelist.")
            };
            ctx.world.chat(&reply).await;
            Ok(())
        }
        Command::WhitelistList | Command::WhitelistShow => report::whitelist(ctx, command).await,

        Command::QueueStatus | Command::QueueClear | Command::QueuePause | Command::QueueResume => {
            tracing::debug!(command = %command, "queue control reached the executor, ignoring");
            Ok(())
        }
    }
}

async fn start(
    ctx: &Arc<AgentContext>,
    request: ModeRequest,
    started: &str,
    already: &str,
) -> Result<(), CommandError> {
    let reply = match ctx.start_mode(request).await? {
        StartOutcome::Started => started,
        StartOutcome::AlreadyActive => already,
    };
    ctx.world.chat(reply).await;
    Ok(())
}

async fn stop(
    ctx: &AgentContext,
    kind: ModeKind,
    stopped: &str,
    inactive: &str,
) -> Result<(), CommandError> {
    let reply = if ctx.stop_mode(kind).await {
        stopped
    } else {
        inactive
    };
    ctx.world.chat(reply).await;
    Ok(())
}

async fn follow(ctx: &AgentContext, player: &str, spoken: &str) -> Result<(), CommandError> {
    let target = ctx
        .find_player(player)
        .await
        .ok_or_else(|| CommandError::PlayerNotVisible(spoken.to_string()))?;
    ctx.stop_mode(ModeKind::Roam).await;
    ctx.stop_mode(ModeKind::Patrol).await;
    ctx.world
        .set_goal(Goal::Follow {
            entity: target.id,
            range: FOLLOW_RANGE,
        })
        .await;
    ctx.world
        .chat(&format!("Following {}.", target.display_name()))
        .await;
    Ok(())
}

async fn come(ctx: &AgentContext, actor: &str) -> Result<(), CommandError> {
    let player = ctx
        .find_player(actor)
        .await
        .ok_or_else(|| CommandError::PlayerNotVisible("you".to_string()))?;
    ctx.world
        .set_goal(Goal::Near {
            pos: player.position,
            range: 1.0,
        })
        .await;
    ctx.world.chat("On my way.").await;
    Ok(())
}

async fn fight(ctx: &AgentContext, player: Option<&str>) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let target = match player {
        Some(name) => {
            if ctx.store.lock().await.whitelist().protects(name) {
                return Err(CommandError::ProtectedPlayer(name.to_string()));
            }
            ctx.find_player(name)
                .await
                .ok_or_else(|| CommandError::PlayerNotVisible(name.to_string()))?
        }
        None => combat::threat_snapshot(ctx, ctx.combat_range() as f64)
            .await
            .into_iter()
            .next()
            .map(|t| t.entity)
            .ok_or(CommandError::NoTarget)?,
    };

    match combat::equip_weapon(world, WeaponPriority::Engage).await {
        Some(weapon) => world.chat(&format!("Equipped {weapon}.")).await,
        None => world.chat("No weapon found in inventory. Fighting with bare hands!").await,
    }
    world
        .attack(target.id)
        .await
        .map_err(CommandError::actuation("attack"))?;
    world.chat("Engaging target.").await;
    Ok(())
}

async fn kill(ctx: &AgentContext, mob: &str) -> Result<(), CommandError> {
    let world = ctx.world.as_ref();
    let origin = world.position().await;
    let target = world
        .entities()
        .await
        .into_iter()
        .filter(|e| e.valid && e.kind == EntityKind::Mob && e.name.eq_ignore_ascii_case(mob))
        .map(|e| (e.position.distance_to(origin), e))
        .filter(|(d, _)| *d <= KILL_SEARCH_RADIUS)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, e)| e)
        .ok_or_else(|| CommandError::MobNotFound(mob.to_string()))?;

    combat::equip_weapon(world, WeaponPriority::Engage).await;
    world
        .attack(target.id)
        .await
        .map_err(CommandError::actuation("attack"))?;
    world.chat(&format!("Engaging {mob}.")).await;
    Ok(())
}

async fn combat_range(ctx: &AgentContext, range: Option<u32>) -> Result<(), CommandError> {
    match range {
        Some(r) if (1..=64).contains(&r) => {
            ctx.set_combat_range(r);
            ctx.world
                .chat(&format!("Combat range set to {r} blocks."))
                .await;
            Ok(())
        }
        Some(_) => Err(CommandError::Usage("combat range <1-64>")),
        None => {
            ctx.world
                .chat(&format!(
                    "Current combat range: {} blocks. Usage: combat range <1-64>",
                    ctx.combat_range()
                ))
                .await;
            Ok(())
        }
    }
}

async fn set_home(ctx: &AgentContext) -> Result<(), CommandError> {
    let waypoint = Waypoint::at(ctx.world.position().await, ctx.world.dimension().await);
    let reply = format!("Home set at ({} {} {}).", waypoint.x, waypoint.y, waypoint.z);
    ctx.store.lock().await.waypoints_mut().set_home(waypoint)?;
    ctx.world.chat(&reply).await;
    Ok(())
}

async fn mark(ctx: &AgentContext, name: &str) -> Result<(), CommandError> {
    let waypoint = Waypoint::at(ctx.world.position().await, ctx.world.dimension().await);
    let reply = format!(
        "Marked '{name}' at ({} {} {}).",
        waypoint.x, waypoint.y, waypoint.z
    );
    ctx.store.lock().await.waypoints_mut().mark(name, waypoint)?;
    ctx.world.chat(&reply).await;
    Ok(())
}

async fn go_to(ctx: &AgentContext, name: &str) -> Result<(), CommandError> {
    let waypoint = ctx.store.lock().await.waypoints().get(name).cloned();
    let Some(waypoint) = waypoint else {
        return Err(if name.eq_ignore_ascii_case(crate::state::HOME) {
            CommandError::HomeNotSet
        } else {
            CommandError::UnknownWaypoint(name.to_string())
        });
    };
    ctx.world
        .set_goal(Goal::Near {
            pos: waypoint.position(),
            range: 1.0,
        })
        .await;
    let reply = if name.eq_ignore_ascii_case(crate::state::HOME) {
        "Heading home.".to_string()
    } else {
        format!("Heading to '{name}'.")
    };
    ctx.world.chat(&reply).await;
    Ok(())
}

async fn list_waypoints(ctx: &AgentContext) -> Result<(), CommandError> {
    let reply = {
        let store = ctx.store.lock().await;
        let waypoints = store.waypoints();
        let mut entries: Vec<String> = Vec::new();
        if let Some(home) = waypoints.home() {
            entries.push(format!("home({} {} {})", home.x, home.y, home.z));
        }
        entries.extend(
            waypoints
                .marks()
                .map(|(name, w)| format!("{name}({} {} {})", w.x, w.y, w.z)),
        );
        if entries.is_empty() {
            "No waypoints yet. Use \"mark <name>\" to add one.".to_string()
        } else {
            format!("Waypoints: {}", entries.join(", "))
        }
    };
    ctx.world.chat(&reply).await;
    Ok(())
}

/// Halt every task, combat and movement. Survival and auto-eat keep running.
async fn stop_everything(ctx: &AgentContext) -> Result<(), CommandError> {
    for kind in ModeKind::LONG_RUNNING.into_iter().chain([ModeKind::Guard]) {
        ctx.stop_mode(kind).await;
    }
    ctx.defense.stop_defense(ctx).await;
    let world = ctx.world.as_ref();
    world.stop_attack().await;
    world.cancel_collect().await;
    world.clear_goal().await;
    world.chat("Stopped current actions.").await;
    Ok(())
}
