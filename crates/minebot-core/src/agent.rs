//! Agent - the owned context every mode, command and interrupt works against.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::Result;
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

use crate::commands::{self, report, Command, CommandError};
use crate::config::BotConfig;
use crate::defense::SelfDefense;
use crate::kernel::{
    ActionQueue, Dispatcher, LoopDriver, QueueStatus, Route, Runner, StartOutcome,
};
use crate::modes::{self, GuardState, ModeKind, ModeRequest, ModeStates};
use crate::observability::{BotEvent, EventEmitter};
use crate::rng::BotRng;
use crate::state::StateManager;
use crate::world::{Entity, World, WorldEvent};

/// Shared state handed to modes, commands and the self-defense interrupt.
pub struct AgentContext {
    pub world: Arc<dyn World>,
    pub config: BotConfig,
    pub driver: LoopDriver,
    pub defense: SelfDefense,
    pub modes: ModeStates,
    pub store: Mutex<StateManager>,
    pub events: EventEmitter,
    rng: StdMutex<BotRng>,
    combat_range: AtomicU32,
}

impl AgentContext {
    /// Build a context, loading (or creating) the stores under `config.data_dir`.
    pub fn new(world: Arc<dyn World>, config: BotConfig) -> Result<Arc<Self>> {
        let store = StateManager::new(&config.data_dir)?;
        let events = EventEmitter::new(&config.data_dir);
        let modes = ModeStates {
            guard: Mutex::new(GuardState::new(config.guard.default_radius)),
            ..ModeStates::default()
        };
        Ok(Arc::new(Self {
            world,
            driver: LoopDriver::new(),
            defense: SelfDefense::new(),
            modes,
            store: Mutex::new(store),
            events,
            rng: StdMutex::new(BotRng::new(config.seed)),
            combat_range: AtomicU32::new(config.combat.range),
            config,
        }))
    }

    /// Run `f` with exclusive access to the random source.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut BotRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    pub fn combat_range(&self) -> u32 {
        self.combat_range.load(Ordering::Relaxed)
    }

    pub fn set_combat_range(&self, range: u32) {
        self.combat_range.store(range, Ordering::Relaxed);
    }

    /// A visible player by username, ignoring case.
    pub async fn find_player(&self, username: &str) -> Option<Entity> {
        self.world.entities().await.into_iter().find(|e| {
            e.is_player()
                && e.valid
                && e.username
                    .as_deref()
                    .is_some_and(|u| u.eq_ignore_ascii_case(username))
        })
    }

    /// Prepare a mode's state and register its timer.
    ///
    /// A mode that is already active, or being started by another caller,
    /// is left untouched.
    pub async fn start_mode(
        self: &Arc<Self>,
        request: ModeRequest,
    ) -> Result<StartOutcome, CommandError> {
        let kind = request.kind();
        let Some(reservation) = self.driver.reserve(kind) else {
            return Ok(StartOutcome::AlreadyActive);
        };
        modes::prepare(self, &request).await?;

        let weak = Arc::downgrade(self);
        let outcome = reservation.start(self.config.intervals.period(kind), move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(ctx) => modes::tick(&ctx, kind).await,
                    None => Ok(()),
                }
            }
        });
        if outcome == StartOutcome::Started {
            self.record_mode_event("mode_started", kind, &format!("{kind} started"));
        }
        Ok(outcome)
    }

    /// Cancel a mode's timer, then reset its state and release its actuators.
    ///
    /// Returns false when the mode was not active.
    pub async fn stop_mode(&self, kind: ModeKind) -> bool {
        if !self.driver.stop(kind) {
            return false;
        }
        modes::teardown(self, kind).await;
        self.record_mode_event("mode_stopped", kind, &format!("{kind} stopped"));
        true
    }

    pub fn record_mode_event(&self, event_type: &str, kind: ModeKind, message: &str) {
        self.events
            .record(BotEvent::new(event_type, message).with_mode(kind));
    }
}

/// The agent: context, action queue and chat routing.
pub struct Agent {
    ctx: Arc<AgentContext>,
    queue: ActionQueue,
    dispatcher: Dispatcher,
}

impl Agent {
    pub fn new(world: Arc<dyn World>, config: BotConfig) -> Result<Self> {
        let ctx = AgentContext::new(world, config)?;
        let queue = ActionQueue::new(
            Arc::new(Runner::new(ctx.clone())),
            ctx.config.queue.inter_action_delay(),
        );
        let dispatcher = Dispatcher::new(ctx.config.username.clone());
        Ok(Self {
            ctx,
            queue,
            dispatcher,
        })
    }

    pub fn context(&self) -> &Arc<AgentContext> {
        &self.ctx
    }

    /// Start the modes that run from spawn.
    pub async fn boot(&self) -> Result<()> {
        if self.ctx.config.auto_eat.enabled {
            self.ctx
                .start_mode(ModeRequest::AutoEat)
                .await
                .map_err(|e| anyhow::anyhow!("failed to start auto-eat: {e}"))?;
        }
        tracing::info!(username = %self.ctx.config.username, "agent ready");
        Ok(())
    }

    /// Queue a command for `actor`. Mode-stopping commands jump the line.
    pub fn enqueue(&self, command: Command, actor: &str) -> Uuid {
        let priority = command.is_stop();
        self.queue.enqueue(command, actor, priority)
    }

    pub async fn start_mode(&self, request: ModeRequest) -> Result<StartOutcome, CommandError> {
        self.ctx.start_mode(request).await
    }

    pub async fn stop_mode(&self, kind: ModeKind) -> bool {
        self.ctx.stop_mode(kind).await
    }

    pub fn queue_status(&self) -> QueueStatus {
        self.queue.status()
    }

    pub fn is_defending(&self) -> bool {
        self.ctx.defense.is_defending()
    }

    /// Route one chat line.
    pub async fn handle_chat(&self, username: &str, message: &str) {
        if username.eq_ignore_ascii_case(self.dispatcher.username()) {
            return;
        }
        let Some(command) = self.dispatcher.parse(message) else {
            return;
        };
        if !self.ctx.store.lock().await.whitelist().allows(username) {
            tracing::debug!(player = username, command = %command, "ignoring command from unlisted player");
            return;
        }

        match self.dispatcher.route(&command) {
            Route::Immediate => self.run_immediate(&command, username).await,
            Route::Priority => {
                self.queue.enqueue(command, username, true);
            }
            Route::Queued => {
                self.queue.enqueue(command, username, false);
            }
        }
    }

    async fn run_immediate(&self, command: &Command, actor: &str) {
        let world = self.ctx.world.as_ref();
        match command {
            Command::QueueStatus => {
                world.chat(&report::format_queue(&self.queue.status())).await;
            }
            Command::QueueClear => {
                let dropped = self.queue.clear();
                world
                    .chat(&format!("Cleared {dropped} queued command(s)."))
                    .await;
            }
            Command::QueuePause => {
                self.queue.pause();
                world.chat("Queue paused.").await;
            }
            Command::QueueResume => {
                self.queue.resume();
                world.chat("Queue resumed.").await;
            }
            _ => {
                if *command == Command::Stop {
                    self.queue.clear();
                }
                if let Err(e) = commands::execute(&self.ctx, command, actor).await {
                    tracing::warn!(command = %command, actor, error = %e, "command failed");
                    let reply = e.to_string();
                    world.chat(&reply).await;
                    self.ctx.events.record(
                        BotEvent::new("command_failed", reply).with_metadata(serde_json::json!({
                            "command": command.to_string(),
                            "actor": actor,
                        })),
                    );
                }
            }
        }
    }

    pub async fn handle_event(&self, event: WorldEvent) {
        match event {
            WorldEvent::Damaged => self.ctx.defense.on_damage(&self.ctx).await,
            WorldEvent::Tick => self.ctx.defense.on_world_tick(&self.ctx).await,
            WorldEvent::Chat { username, message } => self.handle_chat(&username, &message).await,
        }
    }

    /// Process provider events until the channel closes, then shut down.
    pub async fn run(&self, mut events: mpsc::Receiver<WorldEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        tracing::info!("event stream closed");
        self.shutdown().await;
    }

    /// Stop every mode, drop pending commands and end any defense session.
    pub async fn shutdown(&self) {
        self.queue.clear();
        for kind in self.ctx.driver.active_modes() {
            self.ctx.stop_mode(kind).await;
        }
        self.ctx.driver.shutdown();
        self.ctx.defense.stop_defense(&self.ctx).await;
        tracing::info!("agent shut down");
    }
}
