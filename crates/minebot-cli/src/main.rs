//! Minebot CLI - offline tooling for the agent.
//!
//! Single binary that provides:
//! - `minebot init` - create `.minebot/` with a default config
//! - `minebot status` - stores and recent journal events
//! - `minebot waypoints` / `minebot whitelist` - edit persisted state
//! - `minebot simulate` - drive an agent over the in-memory world

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, EnvFilter};

use minebot_core::geometry::Vec3;
use minebot_core::observability::EventEmitter;
use minebot_core::world::Entity;
use minebot_core::{Agent, BotConfig, SimWorld, StateManager, WorldEvent};

#[derive(Parser)]
#[command(name = "minebot")]
#[command(about = "Autonomous game agent", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project
    Init,

    /// Show persisted state and recent events
    Status,

    /// Waypoint management
    Waypoints {
        #[command(subcommand)]
        command: WaypointCommands,
    },

    /// Whitelist management
    Whitelist {
        #[command(subcommand)]
        command: WhitelistCommands,
    },

    /// Feed a chat script to an agent in a simulated world
    Simulate {
        /// Script file: `<player>: <chat>`, `@wait <ms>`, `@damage`, `@tick`
        #[arg(long)]
        script: PathBuf,

        /// Keep running this long after the script ends
        #[arg(long, default_value = "2000")]
        linger_ms: u64,
    },
}

#[derive(Subcommand)]
enum WaypointCommands {
    /// List home and named waypoints
    Ls,

    /// Remove a named waypoint
    Rm { name: String },
}

#[derive(Subcommand)]
enum WhitelistCommands {
    /// List whitelisted players
    Ls,
    /// Add a player
    Add { player: String },
    /// Remove a player
    Rm { player: String },
    /// Only obey whitelisted players
    On,
    /// Obey everyone
    Off,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let project_root = match cli.project {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Init => init_project(&project_root),
        Commands::Status => show_status(&project_root),
        Commands::Waypoints { command } => handle_waypoints(&project_root, command),
        Commands::Whitelist { command } => handle_whitelist(&project_root, command),
        Commands::Simulate { script, linger_ms } => {
            simulate(&project_root, &script, Duration::from_millis(linger_ms)).await
        }
    }
}

fn load_config(project_root: &Path) -> Result<BotConfig> {
    let mut config = BotConfig::load_from_project(project_root)?;
    config.resolve_paths(project_root);
    Ok(config)
}

fn init_project(project_root: &Path) -> Result<()> {
    let minebot_dir = project_root.join(".minebot");
    std::fs::create_dir_all(&minebot_dir)?;

    let config_path = minebot_dir.join("config.yaml");
    if !config_path.exists() {
        let default_config = r#"# Minebot configuration

username: minebot
data_dir: .minebot

intervals:
  survival_ms: 2000
  guard_ms: 800
  patrol_ms: 800

combat:
  range: 16
  critical_health: 4

guard:
  default_radius: 10

queue:
  inter_action_delay_ms: 500

auto_eat:
  enabled: true
  threshold: 16
"#;
        std::fs::write(&config_path, default_config)?;
    }

    let config = load_config(project_root)?;
    StateManager::new(&config.data_dir)?;

    println!("Initialized minebot project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  .minebot/config.yaml - agent configuration");
    println!("  {}/whitelist.json - command whitelist", config.data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Write a chat script (e.g. \"steve: minebot gather wood\")");
    println!("  2. Run: minebot simulate --script <file>");

    Ok(())
}

fn show_status(project_root: &Path) -> Result<()> {
    let config = load_config(project_root)?;
    let state = StateManager::new(&config.data_dir)?;
    let events = EventEmitter::new(&config.data_dir);

    let waypoints = state.waypoints();
    let whitelist = state.whitelist();
    let recent_events = events.read_recent(10);

    println!("Minebot Status");
    println!("==============");
    println!();
    println!("Project: {}", project_root.display());
    println!("Username: {}", config.username);
    println!();
    match waypoints.home() {
        Some(home) => println!("Home: {} {} {} ({})", home.x, home.y, home.z, home.dimension),
        None => println!("Home: not set"),
    }
    println!("Waypoints: {}", waypoints.marks().count());
    println!(
        "Whitelist: {} ({} players)",
        if whitelist.is_enabled() { "on" } else { "off" },
        whitelist.players().count()
    );
    println!();
    println!("Recent events:");
    for event in &recent_events {
        let mode = event.mode.as_deref().map(|m| format!(" {m}")).unwrap_or_default();
        println!(
            "  {} [{}{}] {}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_type,
            mode,
            event.message
        );
    }

    Ok(())
}

fn handle_waypoints(project_root: &Path, command: WaypointCommands) -> Result<()> {
    let config = load_config(project_root)?;
    let mut state = StateManager::new(&config.data_dir)?;

    match command {
        WaypointCommands::Ls => {
            let waypoints = state.waypoints();
            if let Some(home) = waypoints.home() {
                println!("  home  {} {} {} ({})", home.x, home.y, home.z, home.dimension);
            }
            for (name, w) in waypoints.marks() {
                println!("  {name}  {} {} {} ({})", w.x, w.y, w.z, w.dimension);
            }
        }
        WaypointCommands::Rm { name } => {
            if !state.waypoints_mut().remove(&name)? {
                bail!("no waypoint named '{name}'");
            }
            println!("Removed waypoint '{name}'");
        }
    }

    Ok(())
}

fn handle_whitelist(project_root: &Path, command: WhitelistCommands) -> Result<()> {
    let config = load_config(project_root)?;
    let mut state = StateManager::new(&config.data_dir)?;
    let whitelist = state.whitelist_mut();

    match command {
        WhitelistCommands::Ls => {
            println!(
                "Whitelist is {}",
                if whitelist.is_enabled() { "on" } else { "off" }
            );
            for player in whitelist.players() {
                println!("  {player}");
            }
        }
        WhitelistCommands::Add { player } => {
            if whitelist.add(&player)? {
                println!("Added {player}");
            } else {
                println!("{player} is already whitelisted");
            }
        }
        WhitelistCommands::Rm { player } => {
            if whitelist.remove(&player)? {
                println!("Removed {player}");
            } else {
                println!("{player} is not whitelisted");
            }
        }
        WhitelistCommands::On => {
            whitelist.set_enabled(true)?;
            println!("Whitelist enabled");
        }
        WhitelistCommands::Off => {
            whitelist.set_enabled(false)?;
            println!("Whitelist disabled");
        }
    }

    Ok(())
}

/// One line of a simulation script.
#[derive(Debug)]
enum ScriptStep {
    Event(WorldEvent),
    Wait(Duration),
}

fn parse_script(content: &str) -> Result<Vec<ScriptStep>> {
    let mut steps = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step = match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["@wait", ms] => {
                let ms: u64 = ms
                    .parse()
                    .with_context(|| format!("line {}: bad wait '{ms}'", number + 1))?;
                ScriptStep::Wait(Duration::from_millis(ms))
            }
            ["@damage"] => ScriptStep::Event(WorldEvent::Damaged),
            ["@tick"] => ScriptStep::Event(WorldEvent::Tick),
            _ => {
                let Some((username, message)) = line.split_once(':') else {
                    bail!("line {}: expected '<player>: <message>'", number + 1);
                };
                ScriptStep::Event(WorldEvent::Chat {
                    username: username.trim().to_string(),
                    message: message.trim().to_string(),
                })
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

async fn simulate(project_root: &Path, script: &Path, linger: Duration) -> Result<()> {
    let content = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps = parse_script(&content)?;
    let config = load_config(project_root)?;

    tracing::info!(script = %script.display(), steps = steps.len(), "starting simulation");
    let world = Arc::new(SimWorld::demo(config.username.clone()));
    let mut speakers: Vec<&str> = Vec::new();
    for step in &steps {
        if let ScriptStep::Event(WorldEvent::Chat { username, .. }) = step {
            if !speakers.contains(&username.as_str()) {
                speakers.push(username);
            }
        }
    }
    for (i, speaker) in speakers.iter().enumerate() {
        world.add_entity(Entity::player(
            100 + i as u32,
            *speaker,
            Vec3::new(3.0 + i as f64, 64.0, 1.0),
        ));
    }

    let agent = Agent::new(world.clone(), config)?;
    agent.boot().await?;

    let (tx, rx) = mpsc::channel(64);
    let feeder = tokio::spawn(async move {
        for step in steps {
            match step {
                ScriptStep::Event(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                ScriptStep::Wait(duration) => tokio::time::sleep(duration).await,
            }
        }
        tokio::time::sleep(linger).await;
    });

    agent.run(rx).await;
    feeder.await.context("script feeder failed")?;

    println!();
    println!("Chat transcript:");
    for line in world.chat_log() {
        println!("  <bot> {line}");
    }
    let status = agent.queue_status();
    println!();
    println!(
        "Queue: {} pending, paused: {}",
        status.pending.len(),
        status.paused
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_parsing() {
        let steps = parse_script("# demo\nsteve: minebot come\n@wait 250\n@damage\n\n").unwrap();
        assert_eq!(steps.len(), 3);
        assert!(matches!(
            &steps[0],
            ScriptStep::Event(WorldEvent::Chat { username, message })
                if username == "steve" && message == "minebot come"
        ));
        assert!(matches!(steps[1], ScriptStep::Wait(d) if d == Duration::from_millis(250)));
        assert!(parse_script("no separator").is_err());
    }
}
