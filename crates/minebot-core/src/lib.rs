//! Minebot Core - behavior arbitration for an autonomous game agent
//!
//! This crate runs a bot's concurrent behaviors (survival, guard, patrol,
//! roam, woodcutting, farming) as interval-driven modes, preempts them with
//! a self-defense interrupt, and serializes chat commands through an action
//! queue. The game itself sits behind the `World` trait.

pub mod agent;
pub mod commands;
pub mod config;
pub mod defense;
pub mod geometry;
pub mod items;
pub mod kernel;
pub mod modes;
pub mod observability;
pub mod rng;
pub mod sim;
pub mod state;
pub mod world;

pub use agent::{Agent, AgentContext};
pub use commands::{Command, CommandError};
pub use config::BotConfig;
pub use kernel::{ActionQueue, Dispatcher, LoopDriver, QueueStatus, Route, StartOutcome};
pub use modes::{ModeKind, ModeRequest};
pub use sim::SimWorld;
pub use state::StateManager;
pub use world::{World, WorldError, WorldEvent};
