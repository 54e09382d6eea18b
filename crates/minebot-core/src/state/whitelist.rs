//! Protected players and command authorization.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct WhitelistFile {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    players: BTreeSet<String>,
}

/// Whitelist backed by `<data_dir>/whitelist.json`, created on first load.
///
/// Listed players are never combat targets whether or not the list is
/// enabled. Enabling it restricts chat commands to listed players.
#[derive(Debug)]
pub struct Whitelist {
    path: PathBuf,
    data: WhitelistFile,
}

impl Whitelist {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("whitelist.json");
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let data = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            return Ok(Self { path, data });
        }
        let whitelist = Self {
            path,
            data: WhitelistFile::default(),
        };
        whitelist.save()?;
        Ok(whitelist)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn is_enabled(&self) -> bool {
        self.data.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        self.data.enabled = enabled;
        self.save()
    }

    /// Returns false if the player was already listed.
    pub fn add(&mut self, player: &str) -> Result<bool> {
        let added = self.data.players.insert(player.to_lowercase());
        if added {
            self.save()?;
        }
        Ok(added)
    }

    pub fn remove(&mut self, player: &str) -> Result<bool> {
        let removed = self.data.players.remove(&player.to_lowercase());
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    pub fn contains(&self, player: &str) -> bool {
        self.data.players.contains(&player.to_lowercase())
    }

    /// Never attack this player.
    pub fn protects(&self, player: &str) -> bool {
        self.contains(player)
    }

    /// May this player issue commands?
    pub fn allows(&self, player: &str) -> bool {
        !self.data.enabled || self.contains(player)
    }

    pub fn players(&self) -> impl Iterator<Item = &String> {
        self.data.players.iter()
    }
}
