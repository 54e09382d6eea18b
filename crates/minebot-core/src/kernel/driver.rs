//! Driver - recurring, per-mode tick loops.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::modes::ModeKind;

/// Result of asking the driver to start a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyActive,
}

struct ModeHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Owns one timer task per active mode.
///
/// A mode's handle exists exactly while the mode is active. Ticks of one mode
/// run one after another: the next scheduled tick is skipped if the previous
/// one is still running.
#[derive(Default)]
pub struct LoopDriver {
    handles: Mutex<HashMap<ModeKind, ModeHandle>>,
    /// Modes between `reserve` and `Reservation::start`
    reserved: Mutex<HashSet<ModeKind>>,
}

/// Exclusive claim on starting a mode. Dropping it without starting
/// releases the claim.
pub struct Reservation<'d> {
    driver: &'d LoopDriver,
    mode: ModeKind,
}

impl Reservation<'_> {
    pub fn mode(&self) -> ModeKind {
        self.mode
    }

    /// Start the reserved mode. See [`LoopDriver::start`].
    pub fn start<F, Fut>(self, period: Duration, tick: F) -> StartOutcome
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.driver.start(self.mode, period, tick)
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        self.driver.reserved().remove(&self.mode);
    }
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn handles(&self) -> MutexGuard<'_, HashMap<ModeKind, ModeHandle>> {
        self.handles.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reserved(&self) -> MutexGuard<'_, HashSet<ModeKind>> {
        self.reserved.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim `mode` for starting. `None` when it is active or already claimed.
    pub fn reserve(&self, mode: ModeKind) -> Option<Reservation<'_>> {
        let handles = self.handles();
        if handles.contains_key(&mode) || !self.reserved().insert(mode) {
            return None;
        }
        Some(Reservation { driver: self, mode })
    }

    /// Register `tick` to run every `period`, first firing one period from now.
    pub fn start<F, Fut>(&self, mode: ModeKind, period: Duration, tick: F) -> StartOutcome
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut handles = self.handles();
        if handles.contains_key(&mode) {
            return StartOutcome::AlreadyActive;
        }

        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    _ = interval.tick() => run_tick(mode, tick()).await,
                }
            }
            tracing::debug!(mode = %mode, "tick loop exited");
        });

        handles.insert(mode, ModeHandle { stop, task });
        tracing::info!(mode = %mode, period_ms = period.as_millis() as u64, "mode started");
        StartOutcome::Started
    }

    /// Cancel a mode's timer. An in-flight tick runs to completion.
    ///
    /// Returns false when the mode was not active.
    pub fn stop(&self, mode: ModeKind) -> bool {
        let Some(handle) = self.handles().remove(&mode) else {
            return false;
        };
        let _ = handle.stop.send(true);
        drop(handle.task);
        tracing::info!(mode = %mode, "mode stopped");
        true
    }

    pub fn is_active(&self, mode: ModeKind) -> bool {
        self.handles().contains_key(&mode)
    }

    /// Active modes in declaration order.
    pub fn active_modes(&self) -> Vec<ModeKind> {
        let mut modes: Vec<ModeKind> = self.handles().keys().copied().collect();
        modes.sort();
        modes
    }

    /// Stop every mode.
    pub fn shutdown(&self) {
        for mode in self.active_modes() {
            self.stop(mode);
        }
    }
}

impl Drop for LoopDriver {
    fn drop(&mut self) {
        for (_, handle) in self.handles().drain() {
            let _ = handle.stop.send(true);
        }
    }
}

async fn run_tick<Fut>(mode: ModeKind, tick: Fut)
where
    Fut: Future<Output = anyhow::Result<()>>,
{
    match AssertUnwindSafe(tick).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(mode = %mode, error = %e, "tick failed"),
        Err(_) => tracing::error!(mode = %mode, "tick panicked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_tick_fires_after_one_period() {
        let driver = LoopDriver::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        driver.start(ModeKind::Guard, Duration::from_millis(800), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        tokio::time::sleep(Duration::from_millis(799)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        driver.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn a_reserved_mode_cannot_be_claimed_twice() {
        let driver = LoopDriver::new();
        let first = driver.reserve(ModeKind::Roam).unwrap();
        assert!(driver.reserve(ModeKind::Roam).is_none());
        assert!(driver.reserve(ModeKind::Guard).is_some());
        drop(first);

        let again = driver.reserve(ModeKind::Roam).unwrap();
        assert_eq!(again.mode(), ModeKind::Roam);
        let outcome = again.start(Duration::from_secs(1), || async { Ok(()) });
        assert_eq!(outcome, StartOutcome::Started);
        assert!(driver.is_active(ModeKind::Roam));
        assert!(driver.reserve(ModeKind::Roam).is_none());

        driver.shutdown();
        assert!(driver.reserve(ModeKind::Roam).is_some());
    }
}
