//! World port - everything the agent knows about and does to the game.
//!
//! The agent never speaks protocol or plans paths itself. A `World`
//! implementation answers queries about the surroundings and performs
//! actuation on the agent's behalf; `SimWorld` is the in-memory one.

mod actuation;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{BlockPos, Vec3};

pub use actuation::{deposit_items, find_chest_near, find_nearest_chest, go_near, ContainerSession};

pub type EntityId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Mob,
    Object,
}

/// Entity snapshot as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Mob type (`zombie`) or `player`
    pub name: String,
    pub username: Option<String>,
    pub position: Vec3,
    pub health: Option<f32>,
    /// Entity this one is currently attacking
    pub target: Option<EntityId>,
    #[serde(default = "default_valid")]
    pub valid: bool,
}

fn default_valid() -> bool {
    true
}

impl Entity {
    pub fn mob(id: EntityId, name: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            kind: EntityKind::Mob,
            name: name.into(),
            username: None,
            position,
            health: Some(20.0),
            target: None,
            valid: true,
        }
    }

    pub fn player(id: EntityId, username: impl Into<String>, position: Vec3) -> Self {
        Self {
            id,
            kind: EntityKind::Player,
            name: "player".to_string(),
            username: Some(username.into()),
            position,
            health: Some(20.0),
            target: None,
            valid: true,
        }
    }

    pub fn targeting(mut self, target: EntityId) -> Self {
        self.target = Some(target);
        self
    }

    /// Name used in chat: the username for players, the mob type otherwise.
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.name)
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub pos: BlockPos,
    pub name: String,
    /// Crop growth stage
    #[serde(default)]
    pub age: Option<u8>,
}

impl Block {
    pub fn new(pos: BlockPos, name: impl Into<String>) -> Self {
        Self {
            pos,
            name: name.into(),
            age: None,
        }
    }

    pub fn with_age(mut self, age: u8) -> Self {
        self.age = Some(age);
        self
    }

    pub fn is_air(&self) -> bool {
        matches!(self.name.as_str(), "air" | "cave_air" | "void_air")
    }

    pub fn is_water(&self) -> bool {
        self.name == "water"
    }

    pub fn is_lava(&self) -> bool {
        self.name == "lava"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub name: String,
    pub count: u32,
}

impl ItemStack {
    pub fn new(name: impl Into<String>, count: u32) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Pathfinding goal handed to the provider. Setting a new goal replaces the old one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Goal {
    Near { pos: Vec3, range: f64 },
    Follow { entity: EntityId, range: f64 },
}

/// Events the provider pushes into the agent.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// The agent lost health
    Damaged,
    /// Physics tick
    Tick,
    Chat { username: String, message: String },
}

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("no block at {0}")]
    NoBlock(BlockPos),

    #[error("missing item: {0}")]
    MissingItem(String),

    #[error("no container is open")]
    NoContainer,

    #[error("no recipe for {0}")]
    NoRecipe(String),

    #[error("a crafting table is required")]
    NeedsCraftingTable,

    #[error("{0}")]
    Actuation(String),
}

pub type WorldResult<T> = std::result::Result<T, WorldError>;

/// Ticks of the day (0..24000) during which a bed can be used.
pub const NIGHT: std::ops::RangeInclusive<u32> = 12_542..=23_459;

pub fn is_night(time_of_day: u32) -> bool {
    NIGHT.contains(&(time_of_day % 24_000))
}

/// Block predicate passed to `find_blocks`.
pub type BlockFilter<'a> = &'a (dyn Fn(&Block) -> bool + Send + Sync);

/// Query and actuation surface of the game world.
#[async_trait]
pub trait World: Send + Sync {
    // Queries

    async fn self_id(&self) -> EntityId;

    async fn position(&self) -> Vec3;

    async fn dimension(&self) -> String;

    async fn health(&self) -> f32;

    async fn food(&self) -> u32;

    async fn time_of_day(&self) -> u32;

    /// Every known entity except the agent itself.
    async fn entities(&self) -> Vec<Entity>;

    async fn entity(&self, id: EntityId) -> Option<Entity>;

    async fn block_at(&self, pos: BlockPos) -> Option<Block>;

    /// Up to `count` matching blocks within `max_distance` of `center`, nearest first.
    async fn find_blocks(
        &self,
        center: Vec3,
        max_distance: f64,
        matching: BlockFilter<'_>,
        count: usize,
    ) -> Vec<Block>;

    async fn inventory(&self) -> Vec<ItemStack>;

    async fn empty_slots(&self) -> usize;

    async fn held_item(&self) -> Option<ItemStack>;

    // Movement and combat

    async fn set_goal(&self, goal: Goal);

    async fn clear_goal(&self);

    async fn attack(&self, target: EntityId) -> WorldResult<()>;

    async fn stop_attack(&self);

    async fn attack_target(&self) -> Option<EntityId>;

    // Blocks and items

    async fn can_dig(&self, pos: BlockPos) -> bool;

    async fn dig(&self, pos: BlockPos) -> WorldResult<()>;

    /// Walk to and harvest every target, picking up the drops.
    async fn collect(&self, targets: &[BlockPos]) -> WorldResult<()>;

    async fn cancel_collect(&self);

    async fn is_collecting(&self) -> bool;

    async fn activate_block(&self, pos: BlockPos) -> WorldResult<()>;

    async fn look(&self, yaw: f64, pitch: f64);

    async fn equip(&self, item: &str) -> WorldResult<()>;

    async fn consume(&self) -> WorldResult<()>;

    async fn toss(&self, item: &str, count: u32) -> WorldResult<()>;

    /// Place one `item` from the inventory into the air block at `pos`.
    async fn place_block(&self, item: &str, pos: BlockPos) -> WorldResult<()>;

    // Crafting and rest

    /// Apply the recipe for `item` `count` times. Recipes that need a
    /// crafting table fail with `NeedsCraftingTable` when `table` is `None`.
    async fn craft(&self, item: &str, count: u32, table: Option<BlockPos>) -> WorldResult<()>;

    /// Smelt `count` of `item` (the output) in the furnace at `furnace`.
    async fn smelt(&self, item: &str, count: u32, furnace: BlockPos) -> WorldResult<()>;

    /// Sleep in the bed at `bed` until morning.
    async fn sleep(&self, bed: BlockPos) -> WorldResult<()>;

    // Containers and chat

    async fn open_container(&self, pos: BlockPos) -> WorldResult<()>;

    async fn container_items(&self) -> WorldResult<Vec<ItemStack>>;

    async fn deposit(&self, item: &str, count: u32) -> WorldResult<()>;

    async fn withdraw(&self, item: &str, count: u32) -> WorldResult<()>;

    async fn close_container(&self);

    async fn chat(&self, message: &str);
}
