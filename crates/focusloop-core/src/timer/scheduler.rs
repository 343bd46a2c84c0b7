//! Cancellable once-per-period tick source.
//!
//! The scheduler owns a tokio interval task that pushes [`Tick`]s into an
//! unbounded channel. `stop()` aborts the task and bumps the generation, so
//! a tick that was already queued before the stop is recognisably stale and
//! the consumer can drop it with [`TickScheduler::is_current`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// One elapsed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub struct TickScheduler {
    period: Duration,
    sender: mpsc::UnboundedSender<Tick>,
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TickScheduler {
    /// Create a stopped scheduler and the receiving end of its tick channel.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            period,
            sender,
            handle: None,
            generation: 0,
        };
        (scheduler, receiver)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether `tick` was issued since the last `stop()`.
    pub fn is_current(&self, tick: &Tick) -> bool {
        self.is_active() && tick.generation == self.generation
    }

    /// Begin ticking. The first tick arrives one full period from now.
    /// Must be called from within a tokio runtime. No-op when active.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            return;
        }
        let period = self.period;
        let generation = self.generation;
        let sender = self.sender.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                trace!(generation, "tick");
                if sender.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    /// Cancel the timer. Ticks already queued become stale.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Start or stop so the scheduler matches `running`.
    pub fn sync(&mut self, running: bool) {
        match (running, self.is_active()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => {}
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
