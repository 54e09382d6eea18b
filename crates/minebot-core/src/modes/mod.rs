//! Modes - interval-polled background behaviors.
//!
//! Each mode is a tick function run by the loop driver plus a state record
//! held in `ModeStates`. Ticks copy what they need out of their state, drop
//! the lock, do their awaited world work, then write results back.

pub mod auto_eat;
pub mod combat;
pub mod farmer;
pub mod gather_wood;
pub mod guard;
pub mod patrol;
pub mod roam;
pub mod survival;
pub mod woodcutter;

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::agent::AgentContext;
use crate::commands::CommandError;

pub use auto_eat::AutoEatState;
pub use farmer::{FarmerArea, Phase};
pub use guard::GuardState;
pub use patrol::PatrolState;
pub use roam::RoamState;
pub use survival::SurvivalState;
pub use woodcutter::WoodcutterState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    Survival,
    AutoEat,
    Guard,
    Patrol,
    Roam,
    GatherWood,
    Woodcutter,
    Farmer,
}

impl ModeKind {
    pub const ALL: [ModeKind; 8] = [
        Self::Survival,
        Self::AutoEat,
        Self::Guard,
        Self::Patrol,
        Self::Roam,
        Self::GatherWood,
        Self::Woodcutter,
        Self::Farmer,
    ];

    /// Tasks snapshotted by self-defense, in the order they are checked.
    pub const LONG_RUNNING: [ModeKind; 5] = [
        Self::GatherWood,
        Self::Woodcutter,
        Self::Farmer,
        Self::Patrol,
        Self::Roam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Survival => "survival",
            Self::AutoEat => "auto-eat",
            Self::Guard => "guard",
            Self::Patrol => "patrol",
            Self::Roam => "roam",
            Self::GatherWood => "gather-wood",
            Self::Woodcutter => "woodcutter",
            Self::Farmer => "farmer",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start parameters for a mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeRequest {
    Survival,
    AutoEat,
    /// Guard the agent's current position
    Guard { radius: Option<u32> },
    Patrol { names: Vec<String> },
    Roam,
    GatherWood,
    Woodcutter { diameter: u32 },
    Farmer,
}

impl ModeRequest {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Survival => ModeKind::Survival,
            Self::AutoEat => ModeKind::AutoEat,
            Self::Guard { .. } => ModeKind::Guard,
            Self::Patrol { .. } => ModeKind::Patrol,
            Self::Roam => ModeKind::Roam,
            Self::GatherWood => ModeKind::GatherWood,
            Self::Woodcutter { .. } => ModeKind::Woodcutter,
            Self::Farmer => ModeKind::Farmer,
        }
    }
}

/// Per-mode state records.
#[derive(Default)]
pub struct ModeStates {
    pub survival: Mutex<SurvivalState>,
    pub auto_eat: Mutex<AutoEatState>,
    pub guard: Mutex<GuardState>,
    pub patrol: Mutex<PatrolState>,
    pub roam: Mutex<RoamState>,
    pub woodcutter: Mutex<WoodcutterState>,
    pub farmer: Mutex<Option<FarmerArea>>,
}

/// Initialize a mode's state before its timer is registered.
pub(crate) async fn prepare(ctx: &AgentContext, request: &ModeRequest) -> Result<(), CommandError> {
    match request {
        ModeRequest::Survival => survival::prepare(ctx).await,
        ModeRequest::AutoEat => auto_eat::prepare(ctx).await,
        ModeRequest::Guard { radius } => guard::prepare(ctx, *radius).await,
        ModeRequest::Patrol { names } => patrol::prepare(ctx, names).await,
        ModeRequest::Roam => roam::prepare(ctx).await,
        ModeRequest::GatherWood => Ok(()),
        ModeRequest::Woodcutter { diameter } => woodcutter::prepare(ctx, *diameter).await,
        ModeRequest::Farmer => farmer::prepare(ctx).await,
    }
}

/// One tick of `kind`. Skips all actuation while self-defense is engaged.
pub(crate) async fn tick(ctx: &AgentContext, kind: ModeKind) -> anyhow::Result<()> {
    if ctx.defense.is_defending() {
        tracing::trace!(mode = %kind, "tick preempted by self-defense");
        return Ok(());
    }
    match kind {
        ModeKind::Survival => survival::tick(ctx).await,
        ModeKind::AutoEat => auto_eat::tick(ctx).await,
        ModeKind::Guard => guard::tick(ctx).await,
        ModeKind::Patrol => patrol::tick(ctx).await,
        ModeKind::Roam => roam::tick(ctx).await,
        ModeKind::GatherWood => gather_wood::tick(ctx).await,
        ModeKind::Woodcutter => woodcutter::tick(ctx).await,
        ModeKind::Farmer => farmer::tick(ctx).await,
    }
}

/// Reset a mode's state and release its actuators after its timer stopped.
pub(crate) async fn teardown(ctx: &AgentContext, kind: ModeKind) {
    let world = ctx.world.as_ref();
    match kind {
        ModeKind::Survival => *ctx.modes.survival.lock().await = SurvivalState::default(),
        ModeKind::AutoEat => *ctx.modes.auto_eat.lock().await = AutoEatState::default(),
        ModeKind::Guard => {
            *ctx.modes.guard.lock().await = GuardState::new(ctx.config.guard.default_radius);
            world.stop_attack().await;
            world.clear_goal().await;
        }
        ModeKind::Patrol => {
            *ctx.modes.patrol.lock().await = PatrolState::default();
            world.clear_goal().await;
        }
        ModeKind::Roam => {
            *ctx.modes.roam.lock().await = RoamState::default();
            world.clear_goal().await;
        }
        ModeKind::GatherWood => world.cancel_collect().await,
        ModeKind::Woodcutter => {
            *ctx.modes.woodcutter.lock().await = WoodcutterState::default();
            world.cancel_collect().await;
        }
        ModeKind::Farmer => {
            *ctx.modes.farmer.lock().await = None;
            world.clear_goal().await;
        }
    }
}
