//! Patrol mode - walk a loop of named waypoints.

use crate::agent::AgentContext;
use crate::commands::CommandError;
use crate::world::Goal;

const ARRIVAL_DISTANCE: f64 = 2.0;

#[derive(Debug, Clone, Default)]
pub struct PatrolState {
    pub names: Vec<String>,
    pub index: usize,
}

pub(crate) async fn prepare(ctx: &AgentContext, names: &[String]) -> Result<(), CommandError> {
    if names.len() < 2 {
        return Err(CommandError::PatrolTooShort);
    }
    let names: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
    {
        let store = ctx.store.lock().await;
        let unknown = store.waypoints().unknown(&names);
        if !unknown.is_empty() {
            return Err(CommandError::UnknownPatrolWaypoints(
                unknown.into_iter().map(str::to_string).collect(),
            ));
        }
    }
    *ctx.modes.patrol.lock().await = PatrolState { names, index: 0 };
    Ok(())
}

pub(crate) async fn tick(ctx: &AgentContext) -> anyhow::Result<()> {
    let PatrolState { names, index } = ctx.modes.patrol.lock().await.clone();
    let Some(name) = names.get(index) else {
        return Ok(());
    };

    let waypoint = ctx.store.lock().await.waypoints().get(name).cloned();
    let next = (index + 1) % names.len();
    let Some(waypoint) = waypoint else {
        tracing::warn!(waypoint = %name, "patrol waypoint vanished, skipping");
        ctx.modes.patrol.lock().await.index = next;
        return Ok(());
    };

    let target = waypoint.position();
    if ctx.world.position().await.distance_to(target) > ARRIVAL_DISTANCE {
        ctx.world
            .set_goal(Goal::Near {
                pos: target,
                range: 1.0,
            })
            .await;
        return Ok(());
    }

    tracing::debug!(waypoint = %name, next = %names[next], "patrol waypoint reached");
    let mut state = ctx.modes.patrol.lock().await;
    if state.names == names {
        state.index = next;
    }
    Ok(())
}
