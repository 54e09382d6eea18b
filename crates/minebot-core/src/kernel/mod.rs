//! Kernel - mode timers, the action queue, and command routing.

mod dispatcher;
mod driver;
mod queue;
mod runner;

pub use dispatcher::{Dispatcher, Route};
pub use driver::{LoopDriver, StartOutcome};
pub use queue::{ActionQueue, CommandExecutor, QueueEntry, QueueStatus};
pub use runner::Runner;
