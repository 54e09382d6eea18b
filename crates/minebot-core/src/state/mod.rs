//! State management - waypoints and the whitelist.

mod manager;
mod waypoints;
mod whitelist;

pub use manager::StateManager;
pub use waypoints::{Waypoint, WaypointStore, HOME};
pub use whitelist::Whitelist;
