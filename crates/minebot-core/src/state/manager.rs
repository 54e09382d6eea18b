//! State manager - persistent agent state.

use std::path::Path;

use anyhow::Result;

use super::waypoints::WaypointStore;
use super::whitelist::Whitelist;

/// Owns the on-disk stores under the data directory.
pub struct StateManager {
    waypoints: WaypointStore,
    whitelist: Whitelist,
}

impl StateManager {
    /// Load (or create) every store under `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        Ok(Self {
            waypoints: WaypointStore::load(data_dir)?,
            whitelist: Whitelist::load(data_dir)?,
        })
    }

    pub fn waypoints(&self) -> &WaypointStore {
        &self.waypoints
    }

    pub fn waypoints_mut(&mut self) -> &mut WaypointStore {
        &mut self.waypoints
    }

    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    pub fn whitelist_mut(&mut self) -> &mut Whitelist {
        &mut self.whitelist
    }
}
