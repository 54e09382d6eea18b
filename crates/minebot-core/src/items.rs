//! Static block, item and mob classification tables.

use crate::world::{Block, Entity, EntityKind, ItemStack};

/// Tool materials, strongest first.
pub const MATERIALS: [&str; 6] = ["netherite", "diamond", "iron", "stone", "golden", "wooden"];

pub const HOSTILE_MOBS: &[&str] = &[
    "zombie",
    "skeleton",
    "spider",
    "creeper",
    "enderman",
    "witch",
    "pillager",
    "vindicator",
    "evoker",
    "phantom",
    "blaze",
    "ghast",
    "hoglin",
    "piglin_brute",
    "wither_skeleton",
    "drowned",
    "husk",
    "stray",
    "cave_spider",
    "silverfish",
    "zoglin",
    "ravager",
    "vex",
    "guardian",
    "elder_guardian",
    "shulker",
    "slime",
    "magma_cube",
];

pub const LOG_BLOCKS: &[&str] = &[
    "oak_log",
    "spruce_log",
    "birch_log",
    "jungle_log",
    "acacia_log",
    "dark_oak_log",
    "mangrove_log",
    "cherry_log",
    "pale_oak_log",
];

/// Seed item and the crop block it grows into.
pub const SEEDS: &[(&str, &str)] = &[
    ("wheat_seeds", "wheat"),
    ("beetroot_seeds", "beetroots"),
    ("carrot", "carrots"),
    ("potato", "potatoes"),
    ("pumpkin_seeds", "pumpkin_stem"),
    ("melon_seeds", "melon_stem"),
];

/// Crop block and the age at which it can be harvested.
const CROP_MATURITY: &[(&str, u8)] = &[
    ("wheat", 7),
    ("carrots", 7),
    ("potatoes", 7),
    ("beetroots", 3),
    ("nether_wart", 3),
];

/// Harvestable items that are never replanted.
const FARM_PRODUCE: &[&str] = &[
    "wheat",
    "beetroot",
    "pumpkin",
    "melon",
    "melon_slice",
    "poisonous_potato",
];

/// Food item and the hunger points it restores.
pub const FOODS: &[(&str, u32)] = &[
    ("golden_carrot", 6),
    ("cooked_beef", 8),
    ("cooked_porkchop", 8),
    ("cooked_mutton", 6),
    ("cooked_salmon", 6),
    ("cooked_chicken", 6),
    ("cooked_cod", 5),
    ("cooked_rabbit", 5),
    ("rabbit_stew", 10),
    ("mushroom_stew", 6),
    ("beetroot_soup", 6),
    ("bread", 5),
    ("baked_potato", 5),
    ("pumpkin_pie", 8),
    ("apple", 4),
    ("golden_apple", 4),
    ("carrot", 3),
    ("beef", 3),
    ("porkchop", 3),
    ("mutton", 2),
    ("chicken", 2),
    ("cod", 2),
    ("salmon", 2),
    ("melon_slice", 2),
    ("sweet_berries", 2),
    ("cookie", 2),
    ("potato", 1),
    ("beetroot", 1),
];

/// Ordering used when picking a weapon from the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponPriority {
    /// Sword, axe, trident. Used when defending against an attacker.
    Melee,
    /// Sword, axe, pickaxe. Used by the survival and guard loops.
    Sustained,
    /// Sword, axe, trident, bow/crossbow (with arrows), shovel.
    Engage,
}

impl WeaponPriority {
    fn candidates(self, has_arrows: bool) -> Vec<String> {
        let tiered = |kind: &str| -> Vec<String> {
            MATERIALS.iter().map(|m| format!("{m}_{kind}")).collect()
        };
        let mut names = tiered("sword");
        names.extend(tiered("axe"));
        match self {
            Self::Melee => names.push("trident".to_string()),
            Self::Sustained => names.extend(tiered("pickaxe")),
            Self::Engage => {
                names.push("trident".to_string());
                if has_arrows {
                    names.push("bow".to_string());
                    names.push("crossbow".to_string());
                }
                names.extend(tiered("shovel"));
            }
        }
        names
    }
}

pub fn is_hostile(entity: &Entity) -> bool {
    entity.kind == EntityKind::Mob && HOSTILE_MOBS.contains(&entity.name.to_lowercase().as_str())
}

/// Best weapon in `inventory` according to `priority`.
pub fn best_weapon(inventory: &[ItemStack], priority: WeaponPriority) -> Option<String> {
    let has_arrows = inventory
        .iter()
        .any(|i| matches!(i.name.as_str(), "arrow" | "spectral_arrow" | "tipped_arrow"));
    priority
        .candidates(has_arrows)
        .into_iter()
        .find(|name| inventory.iter().any(|i| &i.name == name))
}

pub fn is_weapon(name: &str) -> bool {
    name.ends_with("_sword")
        || name.ends_with("_axe")
        || name.ends_with("_pickaxe")
        || name == "trident"
}

pub fn best_axe(inventory: &[ItemStack]) -> Option<String> {
    MATERIALS
        .iter()
        .map(|m| format!("{m}_axe"))
        .find(|name| inventory.iter().any(|i| &i.name == name))
}

pub fn pickaxe_tier(name: &str) -> Option<u8> {
    match name {
        "wooden_pickaxe" | "golden_pickaxe" => Some(0),
        "stone_pickaxe" => Some(1),
        "iron_pickaxe" => Some(2),
        "diamond_pickaxe" => Some(3),
        "netherite_pickaxe" => Some(4),
        _ => None,
    }
}

/// Minimum pickaxe tier needed to mine an ore.
pub fn required_pickaxe_tier(ore: &str) -> u8 {
    let ore = ore.to_lowercase();
    let has = |needle: &str| ore.contains(needle);
    if has("obsidian") || has("ancient") || has("debris") {
        3
    } else if has("gold") || has("redstone") || has("diamond") || has("emerald") {
        2
    } else if has("iron") || has("lapis") {
        1
    } else {
        0
    }
}

pub fn tier_name(tier: u8) -> &'static str {
    match tier {
        0 => "any pickaxe",
        1 => "stone pickaxe",
        2 => "iron pickaxe",
        _ => "diamond pickaxe",
    }
}

/// Weakest pickaxe that can still mine `ore`, keeping stronger tools in reserve.
pub fn pickaxe_for(inventory: &[ItemStack], ore: &str) -> Option<String> {
    let required = required_pickaxe_tier(ore);
    inventory
        .iter()
        .filter_map(|i| pickaxe_tier(&i.name).map(|t| (t, &i.name)))
        .filter(|(t, _)| *t >= required)
        .min_by_key(|(t, _)| *t)
        .map(|(_, name)| name.clone())
}

/// Block name for a user-supplied ore term.
pub fn ore_block(term: &str) -> String {
    const ORES: &[(&str, &str)] = &[
        ("cobblestone", "cobblestone"),
        ("stone", "stone"),
        ("coal", "coal_ore"),
        ("iron", "iron_ore"),
        ("gold", "gold_ore"),
        ("lapis", "lapis_ore"),
        ("redstone", "redstone_ore"),
        ("diamond", "diamond_ore"),
        ("emerald", "emerald_ore"),
        ("obsidian", "obsidian"),
        ("ancient", "ancient_debris"),
        ("debris", "ancient_debris"),
    ];
    let term = normalize(term);
    ORES.iter()
        .find(|(key, _)| term.contains(key))
        .map(|(_, block)| block.to_string())
        .unwrap_or(term)
}

pub fn is_log(name: &str) -> bool {
    LOG_BLOCKS.contains(&name)
}

pub fn is_wood_item(name: &str) -> bool {
    name.ends_with("_log") || name.ends_with("_wood") || name.ends_with("_planks")
}

pub fn is_seed(name: &str) -> bool {
    SEEDS.iter().any(|(seed, _)| *seed == name)
}

pub fn is_farm_produce(name: &str) -> bool {
    FARM_PRODUCE.contains(&name) && !is_seed(name)
}

pub fn is_crop(name: &str) -> bool {
    matches!(name, "pumpkin" | "melon") || CROP_MATURITY.iter().any(|(crop, _)| *crop == name)
}

/// Whether a crop block is ready to harvest. Pumpkins and melons always are.
pub fn is_mature(block: &Block) -> bool {
    match block.name.as_str() {
        "pumpkin" | "melon" => true,
        name => CROP_MATURITY
            .iter()
            .find(|(crop, _)| *crop == name)
            .is_some_and(|(_, age)| block.age.unwrap_or(0) >= *age),
    }
}

pub fn is_bed(name: &str) -> bool {
    name.ends_with("_bed")
}

pub fn food_value(name: &str) -> Option<u32> {
    FOODS.iter().find(|(food, _)| *food == name).map(|(_, v)| *v)
}

pub fn is_food(name: &str) -> bool {
    food_value(name).is_some()
}

/// Replace whitespace runs with `_` and lowercase.
pub fn normalize(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Names from `available` matching a user term.
///
/// An exact match wins; `wood`/`log`/`planks` and `food` select categories;
/// anything else falls back to substring matching.
pub fn resolve_term<'a, I>(term: &str, available: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let term = normalize(term);
    let names: Vec<&str> = available.into_iter().collect();

    if names.contains(&term.as_str()) {
        return vec![term];
    }

    let matches: Vec<&str> = match term.as_str() {
        "wood" | "log" | "logs" | "planks" | "wood_planks" => {
            names.into_iter().filter(|n| is_wood_item(n)).collect()
        }
        "food" => names.into_iter().filter(|n| is_food(n)).collect(),
        _ => names.into_iter().filter(|n| n.contains(&term)).collect(),
    };

    let mut out: Vec<String> = matches.into_iter().map(str::to_string).collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BlockPos;

    fn stack(name: &str) -> ItemStack {
        ItemStack::new(name, 1)
    }

    #[test]
    fn melee_prefers_sword_over_better_axe() {
        let inv = vec![stack("netherite_axe"), stack("wooden_sword"), stack("trident")];
        assert_eq!(best_weapon(&inv, WeaponPriority::Melee).as_deref(), Some("wooden_sword"));
    }

    #[test]
    fn bow_needs_arrows() {
        let inv = vec![stack("bow"), stack("stone_shovel")];
        assert_eq!(best_weapon(&inv, WeaponPriority::Engage).as_deref(), Some("stone_shovel"));
        let inv = vec![stack("bow"), stack("arrow"), stack("stone_shovel")];
        assert_eq!(best_weapon(&inv, WeaponPriority::Engage).as_deref(), Some("bow"));
    }

    #[test]
    fn pickaxe_selection_respects_tier() {
        let inv = vec![stack("wooden_pickaxe"), stack("iron_pickaxe"), stack("diamond_pickaxe")];
        assert_eq!(pickaxe_for(&inv, "coal").as_deref(), Some("wooden_pickaxe"));
        assert_eq!(pickaxe_for(&inv, "diamond").as_deref(), Some("iron_pickaxe"));
        assert_eq!(pickaxe_for(&[stack("stone_pickaxe")], "gold"), None);
    }

    #[test]
    fn ore_tiers() {
        assert_eq!(required_pickaxe_tier("stone"), 0);
        assert_eq!(required_pickaxe_tier("deepslate_coal_ore"), 0);
        assert_eq!(required_pickaxe_tier("iron_ore"), 1);
        assert_eq!(required_pickaxe_tier("redstone_ore"), 2);
        assert_eq!(required_pickaxe_tier("deepslate_redstone_ore"), 2);
        assert_eq!(required_pickaxe_tier("obsidian"), 3);
        assert_eq!(pickaxe_for(&[stack("stone_pickaxe")], "redstone_ore"), None);
    }

    #[test]
    fn crop_maturity() {
        let block = |name: &str, age| Block::new(BlockPos::default(), name).with_age(age);
        assert!(is_mature(&block("wheat", 7)));
        assert!(!is_mature(&block("wheat", 6)));
        assert!(is_mature(&block("beetroots", 3)));
        assert!(is_mature(&Block::new(BlockPos::default(), "pumpkin")));
        assert!(!is_mature(&block("oak_log", 7)));
    }

    #[test]
    fn term_resolution() {
        let names = ["oak_log", "birch_planks", "bread", "iron_ingot"];
        assert_eq!(resolve_term("wood", names), vec!["birch_planks", "oak_log"]);
        assert_eq!(resolve_term("food", names), vec!["bread"]);
        assert_eq!(resolve_term("iron ingot", names), vec!["iron_ingot"]);
        assert_eq!(resolve_term("iron", names), vec!["iron_ingot"]);
        assert!(resolve_term("diamond", names).is_empty());
    }

    #[test]
    fn seeds_are_not_produce() {
        assert!(is_farm_produce("wheat"));
        assert!(!is_farm_produce("carrot"));
        assert!(!is_farm_produce("wheat_seeds"));
    }
}
