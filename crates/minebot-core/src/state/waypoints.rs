//! Named waypoints with a reserved `home` slot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::{BlockPos, Vec3};

pub const HOME: &str = "home";

/// Block-floored location plus the dimension it was recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub dimension: String,
}

impl Waypoint {
    pub fn at(pos: Vec3, dimension: impl Into<String>) -> Self {
        let BlockPos { x, y, z } = pos.floored();
        Self {
            x,
            y,
            z,
            dimension: dimension.into(),
        }
    }

    /// Center of the waypoint block.
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x as f64 + 0.5, self.y as f64, self.z as f64 + 0.5)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct WaypointFile {
    #[serde(default)]
    home: Option<Waypoint>,
    #[serde(default)]
    marks: BTreeMap<String, Waypoint>,
}

/// Waypoint store backed by `<data_dir>/waypoints.json`.
///
/// Every mutation is written through before returning.
#[derive(Debug)]
pub struct WaypointStore {
    path: PathBuf,
    data: WaypointFile,
}

impl WaypointStore {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("waypoints.json");
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            WaypointFile::default()
        };
        Ok(Self { path, data })
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn home(&self) -> Option<&Waypoint> {
        self.data.home.as_ref()
    }

    pub fn set_home(&mut self, waypoint: Waypoint) -> Result<()> {
        self.data.home = Some(waypoint);
        self.save()
    }

    /// Resolve a name; `home` maps to the home slot.
    pub fn get(&self, name: &str) -> Option<&Waypoint> {
        let name = name.to_lowercase();
        if name == HOME {
            self.home()
        } else {
            self.data.marks.get(&name)
        }
    }

    pub fn mark(&mut self, name: &str, waypoint: Waypoint) -> Result<()> {
        let name = name.to_lowercase();
        if name == HOME {
            return self.set_home(waypoint);
        }
        self.data.marks.insert(name, waypoint);
        self.save()
    }

    /// Remove a mark. Returns false when no such mark exists.
    pub fn remove(&mut self, name: &str) -> Result<bool> {
        let name = name.to_lowercase();
        let removed = if name == HOME {
            self.data.home.take().is_some()
        } else {
            self.data.marks.remove(&name).is_some()
        };
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Marks in name order, excluding home.
    pub fn marks(&self) -> impl Iterator<Item = (&String, &Waypoint)> {
        self.data.marks.iter()
    }

    /// Names from `names` that resolve to nothing.
    pub fn unknown<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .filter(|n| self.get(n).is_none())
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WaypointStore::load(dir.path()).unwrap();
        store
            .mark("Mine", Waypoint::at(Vec3::new(10.7, 64.0, -3.2), "overworld"))
            .unwrap();
        store
            .set_home(Waypoint::at(Vec3::new(0.0, 70.0, 0.0), "overworld"))
            .unwrap();

        let store = WaypointStore::load(dir.path()).unwrap();
        let mine = store.get("mine").unwrap();
        assert_eq!((mine.x, mine.y, mine.z), (10, 64, -4));
        assert_eq!(store.get("home").unwrap().y, 70);
    }

    #[test]
    fn remove_missing_mark_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WaypointStore::load(dir.path()).unwrap();
        assert!(!store.remove("nowhere").unwrap());
        assert!(!dir.path().join("waypoints.json").exists());
    }
}
