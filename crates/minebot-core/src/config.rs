//! Agent configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::modes::ModeKind;

/// Main agent configuration, loaded from .minebot/config.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// In-game name; chat lines must start with it to address the agent
    #[serde(default = "default_username")]
    pub username: String,

    /// Directory holding waypoints, whitelist and the event journal
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Fixed RNG seed (entropy when unset)
    pub seed: Option<u64>,

    /// Per-mode tick periods
    #[serde(default)]
    pub intervals: IntervalConfig,

    /// Threat detection and self-defense ranges
    #[serde(default)]
    pub combat: CombatConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub farmer: FarmerConfig,

    #[serde(default)]
    pub woodcutter: WoodcutterConfig,

    #[serde(default)]
    pub auto_eat: AutoEatConfig,
}

fn default_username() -> String {
    "minebot".to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".minebot")
}

/// Tick periods in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    pub survival_ms: u64,
    pub auto_eat_ms: u64,
    pub guard_ms: u64,
    pub patrol_ms: u64,
    pub roam_ms: u64,
    pub gather_wood_ms: u64,
    pub woodcutter_ms: u64,
    pub farmer_ms: u64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            survival_ms: 2000,
            auto_eat_ms: 3000,
            guard_ms: 800,
            patrol_ms: 800,
            roam_ms: 1000,
            gather_wood_ms: 2000,
            woodcutter_ms: 1500,
            farmer_ms: 2000,
        }
    }
}

impl IntervalConfig {
    pub fn period(&self, mode: ModeKind) -> Duration {
        let ms = match mode {
            ModeKind::Survival => self.survival_ms,
            ModeKind::AutoEat => self.auto_eat_ms,
            ModeKind::Guard => self.guard_ms,
            ModeKind::Patrol => self.patrol_ms,
            ModeKind::Roam => self.roam_ms,
            ModeKind::GatherWood => self.gather_wood_ms,
            ModeKind::Woodcutter => self.woodcutter_ms,
            ModeKind::Farmer => self.farmer_ms,
        };
        Duration::from_millis(ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Hostiles farther than this are ignored by the survival loop
    pub range: u32,
    /// Health at or below which the agent retreats when unengaged
    pub critical_health: f32,
    /// Radius searched for an attacker after taking damage
    pub defense_scan_radius: f64,
    /// Defense ends once the attacker is farther than this
    pub defense_max_range: f64,
    /// Last-resort radius for blaming a nearby player
    pub close_player_radius: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            range: 16,
            critical_health: 4.0,
            defense_scan_radius: 16.0,
            defense_max_range: 32.0,
            close_player_radius: 4.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub default_radius: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { default_radius: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Pause between two queued commands
    pub inter_action_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            inter_action_delay_ms: 500,
        }
    }
}

impl QueueConfig {
    pub fn inter_action_delay(&self) -> Duration {
        Duration::from_millis(self.inter_action_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmerConfig {
    /// Radius scanned for farmland when farming starts
    pub scan_radius: f64,
    /// Slack around the farm bounds before the agent walks back
    pub bounds_margin: f64,
    /// Deposit produce once free slots drop below this
    pub low_water_slots: usize,
    /// Radius searched for a chest to deposit produce into
    pub chest_radius: f64,
}

impl Default for FarmerConfig {
    fn default() -> Self {
        Self {
            scan_radius: 32.0,
            bounds_margin: 3.0,
            low_water_slots: 3,
            chest_radius: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WoodcutterConfig {
    pub default_diameter: u32,
}

impl Default for WoodcutterConfig {
    fn default() -> Self {
        Self {
            default_diameter: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoEatConfig {
    /// Start the auto-eat loop when the agent boots
    pub enabled: bool,
    /// Eat when the hunger bar is below this
    pub threshold: u32,
}

impl Default for AutoEatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 16,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            data_dir: default_data_dir(),
            seed: None,
            intervals: IntervalConfig::default(),
            combat: CombatConfig::default(),
            guard: GuardConfig::default(),
            queue: QueueConfig::default(),
            farmer: FarmerConfig::default(),
            woodcutter: WoodcutterConfig::default(),
            auto_eat: AutoEatConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from project root (looks for .minebot/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".minebot/config.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        self.data_dir = project_root.join(&self.data_dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: BotConfig = serde_yaml::from_str(
            "username: Alex\ncombat:\n  range: 24\nintervals:\n  guard_ms: 500\n",
        )
        .unwrap();
        assert_eq!(config.username, "Alex");
        assert_eq!(config.combat.range, 24);
        assert_eq!(config.combat.defense_max_range, 32.0);
        assert_eq!(config.intervals.period(ModeKind::Guard), Duration::from_millis(500));
        assert_eq!(config.intervals.period(ModeKind::Patrol), Duration::from_millis(800));
        assert_eq!(config.queue.inter_action_delay_ms, 500);
    }
}
