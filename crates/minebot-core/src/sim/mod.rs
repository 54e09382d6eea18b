//! SimWorld - an in-memory `World`.
//!
//! Movement is instantaneous: setting a goal teleports the agent onto it.
//! Every actuation call is appended to an action log so tests can assert on
//! what the agent did, and every chat line is kept.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::geometry::{BlockPos, Vec3};
use crate::items;
use crate::world::{
    self, Block, BlockFilter, Entity, EntityId, Goal, ItemStack, World, WorldError, WorldResult,
};

pub const SELF_ID: EntityId = 1;
const DEFAULT_SLOTS: usize = 36;
const CONTAINERS: [&str; 3] = ["chest", "trapped_chest", "barrel"];
const ITEMS_PER_FUEL: u32 = 8;

struct Recipe {
    output: &'static str,
    yields: u32,
    inputs: &'static [(&'static str, u32)],
    table: bool,
}

const RECIPES: &[Recipe] = &[
    Recipe { output: "oak_planks", yields: 4, inputs: &[("oak_log", 1)], table: false },
    Recipe { output: "birch_planks", yields: 4, inputs: &[("birch_log", 1)], table: false },
    Recipe { output: "spruce_planks", yields: 4, inputs: &[("spruce_log", 1)], table: false },
    Recipe { output: "stick", yields: 4, inputs: &[("oak_planks", 2)], table: false },
    Recipe { output: "crafting_table", yields: 1, inputs: &[("oak_planks", 4)], table: false },
    Recipe { output: "torch", yields: 4, inputs: &[("coal", 1), ("stick", 1)], table: false },
    Recipe { output: "chest", yields: 1, inputs: &[("oak_planks", 8)], table: true },
    Recipe { output: "furnace", yields: 1, inputs: &[("cobblestone", 8)], table: true },
    Recipe { output: "wooden_pickaxe", yields: 1, inputs: &[("oak_planks", 3), ("stick", 2)], table: true },
    Recipe { output: "stone_pickaxe", yields: 1, inputs: &[("cobblestone", 3), ("stick", 2)], table: true },
    Recipe { output: "iron_pickaxe", yields: 1, inputs: &[("iron_ingot", 3), ("stick", 2)], table: true },
    Recipe { output: "stone_axe", yields: 1, inputs: &[("cobblestone", 3), ("stick", 2)], table: true },
    Recipe { output: "stone_sword", yields: 1, inputs: &[("cobblestone", 2), ("stick", 1)], table: true },
    Recipe { output: "iron_sword", yields: 1, inputs: &[("iron_ingot", 2), ("stick", 1)], table: true },
];

/// Furnace output and its input.
const SMELTING: &[(&str, &str)] = &[
    ("iron_ingot", "iron_ore"),
    ("gold_ingot", "gold_ore"),
    ("copper_ingot", "copper_ore"),
    ("stone", "cobblestone"),
    ("glass", "sand"),
    ("charcoal", "oak_log"),
    ("cooked_beef", "beef"),
    ("cooked_porkchop", "porkchop"),
    ("cooked_chicken", "chicken"),
    ("cooked_mutton", "mutton"),
    ("baked_potato", "potato"),
];

const FUELS: &[&str] = &["coal", "charcoal", "oak_log", "oak_planks"];

struct SimState {
    username: String,
    position: Vec3,
    dimension: String,
    health: f32,
    food: u32,
    time_of_day: u32,
    blocks: HashMap<BlockPos, Block>,
    /// Every unlisted block at or below this height is stone
    floor: Option<i32>,
    entities: Vec<Entity>,
    inventory: Vec<ItemStack>,
    slots: usize,
    held: Option<String>,
    goal: Option<Goal>,
    attacking: Option<EntityId>,
    collecting: bool,
    containers: HashMap<BlockPos, Vec<ItemStack>>,
    open_container: Option<BlockPos>,
    chat: Vec<String>,
    actions: Vec<String>,
}

impl SimState {
    fn block(&self, pos: BlockPos) -> Block {
        if let Some(block) = self.blocks.get(&pos) {
            return block.clone();
        }
        match self.floor {
            Some(floor) if pos.y <= floor => Block::new(pos, "stone"),
            _ => Block::new(pos, "air"),
        }
    }

    fn add_item(&mut self, name: &str, count: u32) {
        if count == 0 {
            return;
        }
        match self.inventory.iter_mut().find(|s| s.name == name) {
            Some(stack) => stack.count += count,
            None => self.inventory.push(ItemStack::new(name, count)),
        }
    }

    /// Remove up to `count`; returns how many were removed.
    fn take_item(&mut self, name: &str, count: u32) -> u32 {
        let Some(index) = self.inventory.iter().position(|s| s.name == name) else {
            return 0;
        };
        let stack = &mut self.inventory[index];
        let taken = stack.count.min(count);
        stack.count -= taken;
        if stack.count == 0 {
            self.inventory.remove(index);
            if self.held.as_deref() == Some(name) {
                self.held = None;
            }
        }
        taken
    }

    fn count(&self, name: &str) -> u32 {
        self.inventory
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.count)
            .sum()
    }

    /// Break the block at `pos`, leaving air and pocketing its drops.
    fn break_block(&mut self, pos: BlockPos) -> WorldResult<()> {
        let block = self.block(pos);
        if block.is_air() || block.is_water() || block.is_lava() {
            return Err(WorldError::NoBlock(pos));
        }
        self.blocks.insert(pos, Block::new(pos, "air"));
        for (item, count) in drops(&block) {
            self.add_item(&item, count);
        }
        Ok(())
    }

    fn place(&mut self, block: Block) {
        if CONTAINERS.contains(&block.name.as_str()) {
            self.containers.entry(block.pos).or_default();
        }
        self.blocks.insert(block.pos, block);
    }

    fn log(&mut self, action: String) {
        tracing::trace!(action = %action, "sim actuation");
        self.actions.push(action);
    }
}

/// Items a broken block leaves behind.
fn drops(block: &Block) -> Vec<(String, u32)> {
    let name = block.name.as_str();
    if items::is_crop(name) {
        if !items::is_mature(block) {
            return Vec::new();
        }
        return match name {
            "wheat" => vec![("wheat".into(), 1), ("wheat_seeds".into(), 2)],
            "carrots" => vec![("carrot".into(), 3)],
            "potatoes" => vec![("potato".into(), 3)],
            "beetroots" => vec![("beetroot".into(), 1), ("beetroot_seeds".into(), 2)],
            other => vec![(other.to_string(), 1)],
        };
    }
    let item = match name {
        "stone" => "cobblestone",
        "grass_block" | "farmland" => "dirt",
        other => other
            .strip_prefix("deepslate_")
            .unwrap_or(other)
            .strip_suffix("_ore")
            .map_or(other, |ore| match ore {
                "iron" | "gold" | "copper" => other,
                "lapis" => "lapis_lazuli",
                _ => ore,
            }),
    };
    vec![(item.to_string(), 1)]
}

/// In-memory world for tests and offline runs.
pub struct SimWorld {
    state: Mutex<SimState>,
}

impl SimWorld {
    /// Empty flat world: stone up to y=63, agent standing at (0, 64, 0).
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(SimState {
                username: username.into(),
                position: Vec3::new(0.0, 64.0, 0.0),
                dimension: "overworld".to_string(),
                health: 20.0,
                food: 20,
                time_of_day: 1000,
                blocks: HashMap::new(),
                floor: Some(63),
                entities: Vec::new(),
                inventory: Vec::new(),
                slots: DEFAULT_SLOTS,
                held: None,
                goal: None,
                attacking: None,
                collecting: false,
                containers: HashMap::new(),
                open_container: None,
                chat: Vec::new(),
                actions: Vec::new(),
            }),
        }
    }

    /// A small homestead: two trees, a planted field, a chest and a zombie.
    pub fn demo(username: impl Into<String>) -> Self {
        let mut world = Self::new(username)
            .with_item("iron_axe", 1)
            .with_item("stone_pickaxe", 1)
            .with_item("iron_sword", 1)
            .with_item("wheat_seeds", 6)
            .with_item("bread", 4)
            .with_food(14)
            .with_block(Block::new(BlockPos::new(2, 64, -3), "chest"))
            .with_block(Block::new(BlockPos::new(-12, 60, 9), "coal_ore"))
            .with_block(Block::new(BlockPos::new(-13, 60, 9), "coal_ore"))
            .with_entity(Entity::mob(40, "zombie", Vec3::new(24.0, 64.0, 18.0)));
        for (x, z) in [(8, 4), (10, -6)] {
            for y in 64..68 {
                world = world.with_block(Block::new(BlockPos::new(x, y, z), "oak_log"));
            }
        }
        for x in -6..=-4 {
            for z in 4..=6 {
                world = world.with_block(Block::new(BlockPos::new(x, 63, z), "farmland"));
            }
        }
        world
            .with_block(Block::new(BlockPos::new(-5, 64, 5), "wheat").with_age(7))
            .with_block(Block::new(BlockPos::new(-4, 64, 4), "wheat").with_age(3))
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Builders

    pub fn with_position(self, position: Vec3) -> Self {
        self.state().position = position;
        self
    }

    /// `None` leaves nothing but explicit blocks (and air) below the agent.
    pub fn with_floor(self, floor: Option<i32>) -> Self {
        self.state().floor = floor;
        self
    }

    pub fn with_block(self, block: Block) -> Self {
        self.set_block(block);
        self
    }

    pub fn with_entity(self, entity: Entity) -> Self {
        self.add_entity(entity);
        self
    }

    pub fn with_item(self, name: &str, count: u32) -> Self {
        self.add_item(name, count);
        self
    }

    pub fn with_slots(self, slots: usize) -> Self {
        self.state().slots = slots;
        self
    }

    pub fn with_health(self, health: f32) -> Self {
        self.state().health = health;
        self
    }

    pub fn with_food(self, food: u32) -> Self {
        self.state().food = food;
        self
    }

    pub fn with_time(self, time_of_day: u32) -> Self {
        self.state().time_of_day = time_of_day;
        self
    }

    // Runtime changes

    pub fn set_block(&self, block: Block) {
        self.state().place(block);
    }

    pub fn add_entity(&self, entity: Entity) {
        let mut state = self.state();
        state.entities.retain(|e| e.id != entity.id);
        state.entities.push(entity);
    }

    /// Apply `f` to an entity; returns false when it does not exist.
    pub fn update_entity(&self, id: EntityId, f: impl FnOnce(&mut Entity)) -> bool {
        match self.state().entities.iter_mut().find(|e| e.id == id) {
            Some(entity) => {
                f(entity);
                true
            }
            None => false,
        }
    }

    pub fn remove_entity(&self, id: EntityId) {
        self.state().entities.retain(|e| e.id != id);
    }

    pub fn add_item(&self, name: &str, count: u32) {
        self.state().add_item(name, count);
    }

    pub fn set_health(&self, health: f32) {
        self.state().health = health;
    }

    pub fn set_food(&self, food: u32) {
        self.state().food = food;
    }

    pub fn current_time(&self) -> u32 {
        self.state().time_of_day
    }

    pub fn set_position(&self, position: Vec3) {
        self.state().position = position;
    }

    pub fn set_collecting(&self, collecting: bool) {
        self.state().collecting = collecting;
    }

    pub fn fill_container(&self, pos: BlockPos, stacks: Vec<ItemStack>) {
        self.state().containers.insert(pos, stacks);
    }

    // Inspection

    pub fn current_position(&self) -> Vec3 {
        self.state().position
    }

    pub fn current_goal(&self) -> Option<Goal> {
        self.state().goal
    }

    pub fn current_target(&self) -> Option<EntityId> {
        self.state().attacking
    }

    pub fn held(&self) -> Option<String> {
        self.state().held.clone()
    }

    pub fn item_count(&self, name: &str) -> u32 {
        self.state().count(name)
    }

    pub fn block(&self, pos: BlockPos) -> Block {
        self.state().block(pos)
    }

    pub fn container(&self, pos: BlockPos) -> Vec<ItemStack> {
        self.state()
            .containers
            .get(&pos)
            .cloned()
            .unwrap_or_default()
    }

    pub fn chat_log(&self) -> Vec<String> {
        self.state().chat.clone()
    }

    /// Whether any chat line contains `needle`.
    pub fn said(&self, needle: &str) -> bool {
        self.state().chat.iter().any(|line| line.contains(needle))
    }

    /// Actuation calls in order, e.g. `attack 7` or `dig (1, 64, 0)`.
    pub fn actions(&self) -> Vec<String> {
        self.state().actions.clone()
    }

    pub fn clear_logs(&self) {
        let mut state = self.state();
        state.chat.clear();
        state.actions.clear();
    }
}

#[async_trait]
impl World for SimWorld {
    async fn self_id(&self) -> EntityId {
        SELF_ID
    }

    async fn position(&self) -> Vec3 {
        self.state().position
    }

    async fn dimension(&self) -> String {
        self.state().dimension.clone()
    }

    async fn health(&self) -> f32 {
        self.state().health
    }

    async fn food(&self) -> u32 {
        self.state().food
    }

    async fn time_of_day(&self) -> u32 {
        self.state().time_of_day
    }

    async fn entities(&self) -> Vec<Entity> {
        self.state().entities.clone()
    }

    async fn entity(&self, id: EntityId) -> Option<Entity> {
        self.state().entities.iter().find(|e| e.id == id).cloned()
    }

    async fn block_at(&self, pos: BlockPos) -> Option<Block> {
        Some(self.state().block(pos))
    }

    async fn find_blocks(
        &self,
        center: Vec3,
        max_distance: f64,
        matching: BlockFilter<'_>,
        count: usize,
    ) -> Vec<Block> {
        let state = self.state();
        let mut found: Vec<(f64, Block)> = state
            .blocks
            .values()
            .filter(|b| matching(b))
            .map(|b| (b.pos.as_vec3().distance_to(center), b.clone()))
            .filter(|(d, _)| *d <= max_distance)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.pos.cmp(&b.1.pos)));
        found.into_iter().take(count).map(|(_, b)| b).collect()
    }

    async fn inventory(&self) -> Vec<ItemStack> {
        self.state().inventory.clone()
    }

    async fn empty_slots(&self) -> usize {
        let state = self.state();
        state.slots.saturating_sub(state.inventory.len())
    }

    async fn held_item(&self) -> Option<ItemStack> {
        let state = self.state();
        let name = state.held.clone()?;
        Some(ItemStack::new(name.as_str(), state.count(&name)))
    }

    async fn set_goal(&self, goal: Goal) {
        let mut state = self.state();
        let destination = match goal {
            Goal::Near { pos, .. } => Some(pos),
            Goal::Follow { entity, .. } => state
                .entities
                .iter()
                .find(|e| e.id == entity)
                .map(|e| e.position),
        };
        if let Some(destination) = destination {
            state.position = destination;
        }
        state.goal = Some(goal);
        state.log(format!("goal {goal:?}"));
    }

    async fn clear_goal(&self) {
        let mut state = self.state();
        if state.goal.take().is_some() {
            state.log("clear goal".to_string());
        }
    }

    async fn attack(&self, target: EntityId) -> WorldResult<()> {
        let mut state = self.state();
        if !state.entities.iter().any(|e| e.id == target && e.valid) {
            return Err(WorldError::EntityNotFound(target));
        }
        state.attacking = Some(target);
        state.log(format!("attack {target}"));
        Ok(())
    }

    async fn stop_attack(&self) {
        let mut state = self.state();
        if state.attacking.take().is_some() {
            state.log("stop attack".to_string());
        }
    }

    async fn attack_target(&self) -> Option<EntityId> {
        self.state().attacking
    }

    async fn can_dig(&self, pos: BlockPos) -> bool {
        let block = self.state().block(pos);
        !(block.is_air() || block.is_water() || block.is_lava() || block.name == "bedrock")
    }

    async fn dig(&self, pos: BlockPos) -> WorldResult<()> {
        let mut state = self.state();
        state.break_block(pos)?;
        state.log(format!("dig {pos}"));
        Ok(())
    }

    async fn collect(&self, targets: &[BlockPos]) -> WorldResult<()> {
        let mut state = self.state();
        for pos in targets {
            let y = state.position.y;
            state.position = Vec3::new(pos.x as f64 + 0.5, y, pos.z as f64 + 0.5);
            state.break_block(*pos)?;
            state.log(format!("collect {pos}"));
        }
        Ok(())
    }

    async fn cancel_collect(&self) {
        let mut state = self.state();
        if state.collecting {
            state.collecting = false;
            state.log("cancel collect".to_string());
        }
    }

    async fn is_collecting(&self) -> bool {
        self.state().collecting
    }

    async fn activate_block(&self, pos: BlockPos) -> WorldResult<()> {
        let mut state = self.state();
        let target = state.block(pos);
        if target.name != "farmland" {
            return Err(WorldError::Actuation(format!("nothing to use on {}", target.name)));
        }
        if !state.block(pos.above()).is_air() {
            return Err(WorldError::Actuation(format!("{pos} is already planted")));
        }
        let seed = state
            .held
            .clone()
            .filter(|h| items::is_seed(h))
            .ok_or_else(|| WorldError::MissingItem("seeds".to_string()))?;
        let crop = items::SEEDS
            .iter()
            .find(|(item, _)| *item == seed)
            .map(|(_, crop)| *crop)
            .ok_or_else(|| WorldError::MissingItem(seed.clone()))?;
        state.take_item(&seed, 1);
        let above = pos.above();
        state.blocks.insert(above, Block::new(above, crop).with_age(0));
        state.log(format!("plant {seed} {above}"));
        Ok(())
    }

    async fn look(&self, yaw: f64, pitch: f64) {
        self.state().log(format!("look {yaw:.2} {pitch:.2}"));
    }

    async fn equip(&self, item: &str) -> WorldResult<()> {
        let mut state = self.state();
        if state.count(item) == 0 {
            return Err(WorldError::MissingItem(item.to_string()));
        }
        state.held = Some(item.to_string());
        state.log(format!("equip {item}"));
        Ok(())
    }

    async fn consume(&self) -> WorldResult<()> {
        let mut state = self.state();
        let held = state
            .held
            .clone()
            .ok_or_else(|| WorldError::MissingItem("food".to_string()))?;
        let value = items::food_value(&held)
            .ok_or_else(|| WorldError::Actuation(format!("{held} is not edible")))?;
        state.take_item(&held, 1);
        state.food = (state.food + value).min(20);
        state.log(format!("eat {held}"));
        Ok(())
    }

    async fn toss(&self, item: &str, count: u32) -> WorldResult<()> {
        let mut state = self.state();
        if state.take_item(item, count) == 0 {
            return Err(WorldError::MissingItem(item.to_string()));
        }
        state.log(format!("toss {item} {count}"));
        Ok(())
    }

    async fn place_block(&self, item: &str, pos: BlockPos) -> WorldResult<()> {
        let mut state = self.state();
        if state.count(item) == 0 {
            return Err(WorldError::MissingItem(item.to_string()));
        }
        if !state.block(pos).is_air() {
            return Err(WorldError::Actuation(format!("{pos} is occupied")));
        }
        state.take_item(item, 1);
        state.place(Block::new(pos, item));
        state.log(format!("place {item} {pos}"));
        Ok(())
    }

    async fn craft(&self, item: &str, count: u32, table: Option<BlockPos>) -> WorldResult<()> {
        let mut state = self.state();
        let recipe = RECIPES
            .iter()
            .find(|r| r.output == item)
            .ok_or_else(|| WorldError::NoRecipe(item.to_string()))?;
        if recipe.table {
            let pos = table.ok_or(WorldError::NeedsCraftingTable)?;
            if state.block(pos).name != "crafting_table" {
                return Err(WorldError::Actuation(format!("no crafting table at {pos}")));
            }
        }
        if let Some((input, _)) = recipe
            .inputs
            .iter()
            .find(|(input, n)| state.count(input) < n * count)
        {
            return Err(WorldError::MissingItem(input.to_string()));
        }
        for (input, n) in recipe.inputs {
            state.take_item(input, n * count);
        }
        state.add_item(item, recipe.yields * count);
        state.log(format!("craft {item} {count}"));
        Ok(())
    }

    async fn smelt(&self, item: &str, count: u32, furnace: BlockPos) -> WorldResult<()> {
        let mut state = self.state();
        if state.block(furnace).name != "furnace" {
            return Err(WorldError::Actuation(format!("no furnace at {furnace}")));
        }
        let input = SMELTING
            .iter()
            .find(|(output, _)| *output == item)
            .map(|(_, input)| *input)
            .ok_or_else(|| WorldError::NoRecipe(item.to_string()))?;
        if state.count(input) < count {
            return Err(WorldError::MissingItem(input.to_string()));
        }
        let fuel_needed = count.div_ceil(ITEMS_PER_FUEL);
        let fuel = FUELS
            .iter()
            .find(|f| **f != input && state.count(f) >= fuel_needed)
            .ok_or_else(|| WorldError::MissingItem("fuel".to_string()))?;
        state.take_item(fuel, fuel_needed);
        state.take_item(input, count);
        state.add_item(item, count);
        state.log(format!("smelt {item} {count}"));
        Ok(())
    }

    async fn sleep(&self, bed: BlockPos) -> WorldResult<()> {
        let mut state = self.state();
        if !items::is_bed(&state.block(bed).name) {
            return Err(WorldError::Actuation(format!("no bed at {bed}")));
        }
        if !world::is_night(state.time_of_day) {
            return Err(WorldError::Actuation("you can only sleep at night".to_string()));
        }
        state.time_of_day = 0;
        state.log(format!("sleep {bed}"));
        Ok(())
    }

    async fn open_container(&self, pos: BlockPos) -> WorldResult<()> {
        let mut state = self.state();
        if !state.containers.contains_key(&pos) {
            return Err(WorldError::Actuation(format!("no container at {pos}")));
        }
        state.open_container = Some(pos);
        state.log(format!("open {pos}"));
        Ok(())
    }

    async fn container_items(&self) -> WorldResult<Vec<ItemStack>> {
        let state = self.state();
        let pos = state.open_container.ok_or(WorldError::NoContainer)?;
        Ok(state.containers.get(&pos).cloned().unwrap_or_default())
    }

    async fn deposit(&self, item: &str, count: u32) -> WorldResult<()> {
        let mut state = self.state();
        let pos = state.open_container.ok_or(WorldError::NoContainer)?;
        let moved = state.take_item(item, count);
        if moved == 0 {
            return Err(WorldError::MissingItem(item.to_string()));
        }
        let contents = state.containers.entry(pos).or_default();
        match contents.iter_mut().find(|s| s.name == item) {
            Some(stack) => stack.count += moved,
            None => contents.push(ItemStack::new(item, moved)),
        }
        state.log(format!("deposit {item} {moved}"));
        Ok(())
    }

    async fn withdraw(&self, item: &str, count: u32) -> WorldResult<()> {
        let mut state = self.state();
        let pos = state.open_container.ok_or(WorldError::NoContainer)?;
        let contents = state.containers.entry(pos).or_default();
        let Some(index) = contents.iter().position(|s| s.name == item) else {
            return Err(WorldError::MissingItem(item.to_string()));
        };
        let moved = contents[index].count.min(count);
        contents[index].count -= moved;
        if contents[index].count == 0 {
            contents.remove(index);
        }
        state.add_item(item, moved);
        state.log(format!("withdraw {item} {moved}"));
        Ok(())
    }

    async fn close_container(&self) {
        let mut state = self.state();
        if let Some(pos) = state.open_container.take() {
            state.log(format!("close {pos}"));
        }
    }

    async fn chat(&self, message: &str) {
        let mut state = self.state();
        tracing::info!(username = %state.username, "<{}> {message}", state.username);
        state.chat.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn planting_turns_farmland_into_a_crop() {
        let soil = BlockPos::new(0, 63, 2);
        let world = SimWorld::new("bot")
            .with_block(Block::new(soil, "farmland"))
            .with_item("wheat_seeds", 2);

        assert!(world.activate_block(soil).await.is_err());
        world.equip("wheat_seeds").await.unwrap();
        world.activate_block(soil).await.unwrap();

        assert_eq!(world.block(soil.above()).name, "wheat");
        assert_eq!(world.item_count("wheat_seeds"), 1);
        assert!(world.activate_block(soil).await.is_err());
    }

    #[tokio::test]
    async fn containers_move_items_both_ways() {
        let chest = BlockPos::new(1, 64, 1);
        let world = SimWorld::new("bot")
            .with_block(Block::new(chest, "chest"))
            .with_item("oak_log", 10);

        assert!(matches!(world.deposit("oak_log", 1).await, Err(WorldError::NoContainer)));
        world.open_container(chest).await.unwrap();
        world.deposit("oak_log", 10).await.unwrap();
        world.withdraw("oak_log", 4).await.unwrap();
        world.close_container().await;

        assert_eq!(world.item_count("oak_log"), 4);
        assert_eq!(world.container(chest), vec![ItemStack::new("oak_log", 6)]);
    }

    #[tokio::test]
    async fn crafting_consumes_inputs_and_checks_the_table() {
        let table = BlockPos::new(1, 64, 0);
        let world = SimWorld::new("bot").with_item("oak_log", 2).with_item("cobblestone", 3);

        world.craft("oak_planks", 2, None).await.unwrap();
        world.craft("stick", 1, None).await.unwrap();
        assert_eq!(world.item_count("oak_planks"), 6);
        assert_eq!(world.item_count("stick"), 4);

        assert!(matches!(
            world.craft("stone_pickaxe", 1, None).await,
            Err(WorldError::NeedsCraftingTable)
        ));
        assert!(matches!(
            world.craft("beacon", 1, None).await,
            Err(WorldError::NoRecipe(_))
        ));
        world.add_item("crafting_table", 1);
        world.place_block("crafting_table", table).await.unwrap();
        world.craft("stone_pickaxe", 1, Some(table)).await.unwrap();
        assert_eq!(world.item_count("stone_pickaxe"), 1);
        assert_eq!(world.item_count("cobblestone"), 0);
    }

    #[tokio::test]
    async fn smelting_burns_fuel() {
        let furnace = BlockPos::new(0, 64, 1);
        let world = SimWorld::new("bot")
            .with_block(Block::new(furnace, "furnace"))
            .with_item("iron_ore", 9);

        assert!(matches!(
            world.smelt("iron_ingot", 9, furnace).await,
            Err(WorldError::MissingItem(fuel)) if fuel == "fuel"
        ));
        world.add_item("coal", 3);
        world.smelt("iron_ingot", 9, furnace).await.unwrap();
        assert_eq!(world.item_count("iron_ingot"), 9);
        assert_eq!(world.item_count("coal"), 1);
    }

    #[tokio::test]
    async fn beds_only_work_at_night() {
        let bed = BlockPos::new(1, 64, 1);
        let world = SimWorld::new("bot").with_block(Block::new(bed, "red_bed"));
        assert!(world.sleep(bed).await.is_err());

        let world = world.with_time(18_000);
        world.sleep(bed).await.unwrap();
        assert_eq!(world.current_time(), 0);
        assert!(world.sleep(BlockPos::new(5, 64, 5)).await.is_err());
    }

    #[test]
    fn ore_drops() {
        let drop = |name: &str| drops(&Block::new(BlockPos::default(), name))[0].0.clone();
        assert_eq!(drop("coal_ore"), "coal");
        assert_eq!(drop("deepslate_diamond_ore"), "diamond");
        assert_eq!(drop("iron_ore"), "iron_ore");
        assert_eq!(drop("oak_log"), "oak_log");
        assert!(drops(&Block::new(BlockPos::default(), "wheat").with_age(2)).is_empty());
    }
}
