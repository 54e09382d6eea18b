//! Chat commands - parsing, errors and execution.

mod crafting;
mod gathering;
mod handlers;
mod inventory;
pub mod report;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::items;
use crate::world::WorldError;

pub use handlers::execute;

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Command {
    // Movement
    FollowMe,
    Follow(String),
    Come,
    RoamOn,
    RoamOff,

    // Combat
    Fight(Option<String>),
    Kill(String),

    // Gathering
    GatherWood,
    GatherOre { ore: String, count: u32 },
    GatherBlocks { block: String, count: u32 },
    Pickup { radius: Option<u32> },
    WoodcutterStart { diameter: Option<u32> },
    WoodcutterStop,
    FarmOn,
    FarmOff,

    // Waypoints
    SetHome,
    GoHome,
    Mark(String),
    Go(String),
    ListWaypoints,
    DeleteWaypoint(String),
    Patrol(Vec<String>),
    StopPatrol,

    // Survival
    SurvivalOn,
    SurvivalOff,
    AutoEatOn,
    AutoEatOff,
    Eat,
    CheckFood,
    DebugSurvival,
    GuardHere { radius: Option<u32> },
    GuardStop,
    CombatRange(Option<u32>),
    Threats,
    Status,
    StatusFull,
    SelfDefenseStatus,
    SelfDefenseOn,
    SelfDefenseOff,
    Stop,

    // Inventory and containers
    Inventory,
    GiveMe { item: String, count: Option<u32> },
    TossAll(String),
    Deposit(Option<String>),
    Withdraw { item: String, count: Option<u32> },

    // Crafting and rest
    Craft { item: String, count: u32 },
    Smelt { item: String, count: u32 },
    Sleep,

    // Admin
    WhitelistOn,
    WhitelistOff,
    WhitelistAdd(String),
    WhitelistRemove(String),
    WhitelistList,
    WhitelistShow,

    // Queue control
    QueueStatus,
    QueueClear,
    QueuePause,
    QueueResume,
}

/// Split a trailing count off a multi-word term: `iron ingot 3` -> (`iron ingot`, 3).
fn term_and_count(words: &[&str]) -> Option<(String, Option<u32>)> {
    match words {
        [] => None,
        [term @ .., last] if !term.is_empty() => match last.parse::<u32>() {
            Ok(n) => Some((term.join(" "), Some(n))),
            Err(_) => Some((words.join(" "), None)),
        },
        _ => Some((words.join(" "), None)),
    }
}

fn number(word: &str) -> Option<u32> {
    word.parse().ok()
}

impl Command {
    /// Parse the text after the bot's name. Unknown text yields `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.trim().to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let owned = |w: &&str| w.to_string();

        let command = match words.as_slice() {
            ["follow", "me"] => Self::FollowMe,
            ["follow", player] => Self::Follow(player.to_string()),
            ["come"] | ["come", "here"] | ["come", "to", "me"] => Self::Come,
            ["roam"] | ["roam", "on"] => Self::RoamOn,
            ["roam", "off"] | ["stop", "roam"] | ["stop", "roaming"] => Self::RoamOff,

            ["fight"] => Self::Fight(None),
            ["fight", player] => Self::Fight(Some(player.to_string())),
            ["kill", mob @ ..] if !mob.is_empty() => Self::Kill(mob.join("_")),

            ["gather" | "collect", "wood"] | ["wood"] => Self::GatherWood,
            ["gather", "ore", rest @ ..] => match rest {
                [n, ore @ ..] if !ore.is_empty() && number(n).is_some() => Self::GatherOre {
                    ore: ore.join(" "),
                    count: number(n)?,
                },
                [] => return None,
                ore => {
                    let (ore, count) = term_and_count(ore)?;
                    Self::GatherOre {
                        ore,
                        count: count.unwrap_or(1),
                    }
                }
            },
            ["gather", n, block @ ..] if !block.is_empty() && number(n).is_some() => {
                Self::GatherBlocks {
                    block: block.join("_"),
                    count: number(n)?,
                }
            }
            ["pickup"] => Self::Pickup { radius: None },
            ["pickup", r] => Self::Pickup {
                radius: Some(number(r)?),
            },

            ["woodcutter", "off" | "stop"] | ["stop", "woodcutter"] => Self::WoodcutterStop,
            ["woodcutter"] => Self::WoodcutterStart { diameter: None },
            ["woodcutter", d] => Self::WoodcutterStart {
                diameter: Some(number(d)?),
            },
            ["farm", "on"] | ["farm"] => Self::FarmOn,
            ["farm", "off"] | ["stop", "farm" | "farming"] => Self::FarmOff,

            ["set", "home"] => Self::SetHome,
            ["go", "home"] => Self::GoHome,
            ["mark", name] => Self::Mark(name.to_string()),
            ["go", "to", name] | ["go", name] => Self::Go(name.to_string()),
            ["list"] | ["waypoints"] | ["list", "waypoints"] => Self::ListWaypoints,
            ["delete" | "del", "waypoint", name] | ["unmark", name] => {
                Self::DeleteWaypoint(name.to_string())
            }
            ["patrol", names @ ..] if !names.is_empty() => {
                Self::Patrol(names.iter().map(owned).collect())
            }
            ["stop", "patrol"] | ["patrol", "off"] => Self::StopPatrol,

            ["survival", "on"] => Self::SurvivalOn,
            ["survival", "off"] => Self::SurvivalOff,
            ["auto", "eat", "on"] | ["autoeat", "on"] => Self::AutoEatOn,
            ["auto", "eat", "off"] | ["autoeat", "off"] => Self::AutoEatOff,
            ["eat"] | ["eat", "now"] => Self::Eat,
            ["check", "food"] => Self::CheckFood,
            ["debug", "survival"] => Self::DebugSurvival,
            ["guard", "here"] => Self::GuardHere { radius: None },
            ["guard", "here", r] => Self::GuardHere {
                radius: Some(number(r)?),
            },
            ["stop", "guard"] | ["guard", "stop" | "off"] => Self::GuardStop,
            ["combat", "range"] => Self::CombatRange(None),
            ["combat", "range", n] => Self::CombatRange(Some(number(n)?)),
            ["threats"] => Self::Threats,
            ["status"] => Self::Status,
            ["status", "full"] => Self::StatusFull,
            ["self", "defense", "status"] => Self::SelfDefenseStatus,
            ["self", "defense", "on"] => Self::SelfDefenseOn,
            ["self", "defense", "off"] => Self::SelfDefenseOff,
            ["stop"] | ["halt"] | ["cancel"] => Self::Stop,

            ["inventory"] | ["inv"] => Self::Inventory,
            ["give", "me", rest @ ..] => {
                let (item, count) = term_and_count(rest)?;
                Self::GiveMe { item, count }
            }
            ["toss", "all", term @ ..] if !term.is_empty() => Self::TossAll(term.join(" ")),
            ["deposit"] | ["deposit", "all"] => Self::Deposit(None),
            ["deposit", term @ ..] => Self::Deposit(Some(term.join(" "))),
            ["withdraw", rest @ ..] => {
                let (item, count) = term_and_count(rest)?;
                Self::Withdraw { item, count }
            }

            ["craft", rest @ ..] => {
                let (item, count) = term_and_count(rest)?;
                Self::Craft {
                    item: items::normalize(&item),
                    count: count.unwrap_or(1),
                }
            }
            ["smelt", rest @ ..] => {
                let (item, count) = term_and_count(rest)?;
                Self::Smelt {
                    item: items::normalize(&item),
                    count: count.unwrap_or(1),
                }
            }
            ["sleep"] => Self::Sleep,

            ["whitelist", "on"] => Self::WhitelistOn,
            ["whitelist", "off"] => Self::WhitelistOff,
            ["whitelist", "add", player] => Self::WhitelistAdd(player.to_string()),
            ["whitelist", "remove", player] => Self::WhitelistRemove(player.to_string()),
            ["whitelist", "list"] => Self::WhitelistList,
            ["whitelist"] | ["whitelist", "show"] => Self::WhitelistShow,

            ["queue"] | ["queue", "status"] => Self::QueueStatus,
            ["queue", "clear"] => Self::QueueClear,
            ["queue", "pause"] => Self::QueuePause,
            ["queue", "resume"] => Self::QueueResume,

            _ => return None,
        };
        Some(command)
    }

    /// Commands whose only effect is to stop something.
    pub fn is_stop(&self) -> bool {
        matches!(
            self,
            Self::RoamOff
                | Self::WoodcutterStop
                | Self::FarmOff
                | Self::StopPatrol
                | Self::SurvivalOff
                | Self::AutoEatOff
                | Self::GuardStop
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opt = |n: &Option<u32>| n.map(|n| format!(" {n}")).unwrap_or_default();
        match self {
            Self::FollowMe => write!(f, "follow me"),
            Self::Follow(p) => write!(f, "follow {p}"),
            Self::Come => write!(f, "come"),
            Self::RoamOn => write!(f, "roam on"),
            Self::RoamOff => write!(f, "roam off"),
            Self::Fight(None) => write!(f, "fight"),
            Self::Fight(Some(p)) => write!(f, "fight {p}"),
            Self::Kill(m) => write!(f, "kill {m}"),
            Self::GatherWood => write!(f, "gather wood"),
            Self::GatherOre { ore, count } => write!(f, "gather ore {count} {ore}"),
            Self::GatherBlocks { block, count } => write!(f, "gather {count} {block}"),
            Self::Pickup { radius } => write!(f, "pickup{}", opt(radius)),
            Self::WoodcutterStart { diameter } => write!(f, "woodcutter{}", opt(diameter)),
            Self::WoodcutterStop => write!(f, "woodcutter off"),
            Self::FarmOn => write!(f, "farm on"),
            Self::FarmOff => write!(f, "farm off"),
            Self::SetHome => write!(f, "set home"),
            Self::GoHome => write!(f, "go home"),
            Self::Mark(n) => write!(f, "mark {n}"),
            Self::Go(n) => write!(f, "go {n}"),
            Self::ListWaypoints => write!(f, "waypoints"),
            Self::DeleteWaypoint(n) => write!(f, "delete waypoint {n}"),
            Self::Patrol(names) => write!(f, "patrol {}", names.join(" ")),
            Self::StopPatrol => write!(f, "stop patrol"),
            Self::SurvivalOn => write!(f, "survival on"),
            Self::SurvivalOff => write!(f, "survival off"),
            Self::AutoEatOn => write!(f, "auto eat on"),
            Self::AutoEatOff => write!(f, "auto eat off"),
            Self::Eat => write!(f, "eat"),
            Self::CheckFood => write!(f, "check food"),
            Self::DebugSurvival => write!(f, "debug survival"),
            Self::GuardHere { radius } => write!(f, "guard here{}", opt(radius)),
            Self::GuardStop => write!(f, "guard stop"),
            Self::CombatRange(n) => write!(f, "combat range{}", opt(n)),
            Self::Threats => write!(f, "threats"),
            Self::Status => write!(f, "status"),
            Self::StatusFull => write!(f, "status full"),
            Self::SelfDefenseStatus => write!(f, "self defense status"),
            Self::SelfDefenseOn => write!(f, "self defense on"),
            Self::SelfDefenseOff => write!(f, "self defense off"),
            Self::Stop => write!(f, "stop"),
            Self::Inventory => write!(f, "inventory"),
            Self::GiveMe { item, count } => write!(f, "give me {item}{}", opt(count)),
            Self::TossAll(t) => write!(f, "toss all {t}"),
            Self::Deposit(None) => write!(f, "deposit"),
            Self::Deposit(Some(t)) => write!(f, "deposit {t}"),
            Self::Withdraw { item, count } => write!(f, "withdraw {item}{}", opt(count)),
            Self::Craft { item, count } => write!(f, "craft {item} {count}"),
            Self::Smelt { item, count } => write!(f, "smelt {item} {count}"),
            Self::Sleep => write!(f, "sleep"),
            Self::WhitelistOn => write!(f, "whitelist on"),
            Self::WhitelistOff => write!(f, "whitelist off"),
            Self::WhitelistAdd(p) => write!(f, "whitelist add {p}"),
            Self::WhitelistRemove(p) => write!(f, "whitelist remove {p}"),
            Self::WhitelistList => write!(f, "whitelist list"),
            Self::WhitelistShow => write!(f, "whitelist show"),
            Self::QueueStatus => write!(f, "queue"),
            Self::QueueClear => write!(f, "queue clear"),
            Self::QueuePause => write!(f, "queue pause"),
            Self::QueueResume => write!(f, "queue resume"),
        }
    }
}

/// Expected negative outcomes. The `Display` text is sent back as a chat reply.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("I can't see {0}.")]
    PlayerNotVisible(String),

    #[error("No waypoint named '{0}'.")]
    UnknownWaypoint(String),

    #[error("Home is not set. Use \"set home\" first.")]
    HomeNotSet,

    #[error("Unknown waypoints: {}", .0.join(", "))]
    UnknownPatrolWaypoints(Vec<String>),

    #[error("Provide at least two waypoints: patrol <wp1> <wp2>")]
    PatrolTooShort,

    #[error("I don't recognize '{0}'.")]
    UnknownItem(String),

    #[error("I don't have any '{0}'.")]
    ItemNotHeld(String),

    #[error("I don't see any '{0}'.")]
    MobNotFound(String),

    #[error("No valid target to fight.")]
    NoTarget,

    #[error("{0} is whitelisted, I won't attack them.")]
    ProtectedPlayer(String),

    #[error("No chest nearby.")]
    NoChest,

    #[error("I don't have an axe! I need an axe to gather wood.")]
    NoAxe,

    #[error("I don't have a {required}! I need a {required} to mine {ore}.")]
    NoPickaxe { required: &'static str, ore: String },

    #[error("No farmland nearby.")]
    NoFarmland,

    #[error("I have no food in my inventory!")]
    NoFood,

    #[error("Need a {0} and I don't have one.")]
    NoStation(&'static str),

    #[error("No suitable place for {0} nearby.")]
    NoPlacement(&'static str),

    #[error("It's not night time.")]
    NotNight,

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("{0}")]
    Failed(String),

    #[error("Failed to {action}: {source}")]
    Actuation {
        action: &'static str,
        #[source]
        source: WorldError,
    },

    #[error("Couldn't save: {0}")]
    Persistence(String),
}

impl CommandError {
    pub fn actuation(action: &'static str) -> impl FnOnce(WorldError) -> Self {
        move |source| Self::Actuation { action, source }
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(e: anyhow::Error) -> Self {
        Self::Persistence(format!("{e:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longer_prefixes_win() {
        assert_eq!(Command::parse("follow me"), Some(Command::FollowMe));
        assert_eq!(Command::parse("Follow Steve"), Some(Command::Follow("steve".into())));
        assert_eq!(Command::parse("go home"), Some(Command::GoHome));
        assert_eq!(Command::parse("go mine"), Some(Command::Go("mine".into())));
        assert_eq!(Command::parse("status full"), Some(Command::StatusFull));
        assert_eq!(Command::parse("stop patrol"), Some(Command::StopPatrol));
        assert_eq!(Command::parse("stop"), Some(Command::Stop));
        assert_eq!(Command::parse("woodcutter off"), Some(Command::WoodcutterStop));
    }

    #[test]
    fn spoken_aliases() {
        for text in ["gather wood", "collect wood", "wood"] {
            assert_eq!(Command::parse(text), Some(Command::GatherWood));
        }
        assert_eq!(Command::parse("come to me"), Some(Command::Come));
        assert_eq!(Command::parse("eat now"), Some(Command::Eat));
        assert_eq!(Command::parse("check food"), Some(Command::CheckFood));
        assert_eq!(Command::parse("debug survival"), Some(Command::DebugSurvival));
        assert_eq!(Command::parse("sleep"), Some(Command::Sleep));
    }

    #[test]
    fn craft_and_smelt_take_an_item_and_count() {
        assert_eq!(
            Command::parse("craft stone pickaxe"),
            Some(Command::Craft { item: "stone_pickaxe".into(), count: 1 })
        );
        assert_eq!(
            Command::parse("craft Oak Planks 8"),
            Some(Command::Craft { item: "oak_planks".into(), count: 8 })
        );
        assert_eq!(
            Command::parse("smelt iron ingot 3"),
            Some(Command::Smelt { item: "iron_ingot".into(), count: 3 })
        );
        assert_eq!(Command::parse("craft"), None);
        assert_eq!(
            Command::Craft { item: "stick".into(), count: 4 }.to_string(),
            "craft stick 4"
        );
    }

    #[test]
    fn counts_and_terms() {
        assert_eq!(
            Command::parse("gather ore 5 iron"),
            Some(Command::GatherOre { ore: "iron".into(), count: 5 })
        );
        assert_eq!(
            Command::parse("gather ore diamond"),
            Some(Command::GatherOre { ore: "diamond".into(), count: 1 })
        );
        assert_eq!(
            Command::parse("gather 10 oak log"),
            Some(Command::GatherBlocks { block: "oak_log".into(), count: 10 })
        );
        assert_eq!(
            Command::parse("give me iron ingot 3"),
            Some(Command::GiveMe { item: "iron ingot".into(), count: Some(3) })
        );
        assert_eq!(
            Command::parse("withdraw bread"),
            Some(Command::Withdraw { item: "bread".into(), count: None })
        );
        assert_eq!(Command::parse("guard here 12"), Some(Command::GuardHere { radius: Some(12) }));
        assert_eq!(
            Command::parse("patrol a b"),
            Some(Command::Patrol(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn unknown_text_is_none() {
        assert_eq!(Command::parse("craft bread"), None);
        assert_eq!(Command::parse("woodcutter big"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let cmd = Command::GuardHere { radius: Some(12) };
        assert_eq!(Command::parse(&cmd.to_string()), Some(cmd));
    }
}
