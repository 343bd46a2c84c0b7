//! Session driver.
//!
//! [`FocusSession`] is the single owner of a running timer: it feeds ticks
//! to the [`TimerEngine`], resolves every completion before the next tick
//! (ledger update, persistence, sound and notification), and applies
//! settings changes. All of this happens on the caller's thread, so a
//! completion is atomic with respect to tick delivery.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::Result;
use crate::events::{CompletionEvent, Event};
use crate::notify::{completion_message, Notifier, Permission};
use crate::settings::{self, Preset, Settings, SettingsPatch};
use crate::stats::StatsAggregate;
use crate::storage::{self, Store};
use crate::timer::TimerEngine;

pub struct FocusSession {
    engine: TimerEngine,
    stats: StatsAggregate,
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl FocusSession {
    /// Load settings and stats from `store` (falling back to defaults) and
    /// start idle at the beginning of a work interval.
    pub fn open(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        let settings = storage::load_settings(store.as_ref());
        let stats = storage::load_stats(store.as_ref());
        debug!(?settings, "session opened");
        Self {
            engine: TimerEngine::new(settings),
            stats,
            store,
            notifier,
            clock,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn stats(&self) -> &StatsAggregate {
        &self.stats
    }

    pub fn settings(&self) -> &Settings {
        self.engine.settings()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.engine.start()
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.engine.pause()
    }

    pub fn toggle(&mut self) -> Option<Event> {
        self.engine.toggle()
    }

    pub fn reset(&mut self) -> Event {
        self.engine.reset()
    }

    /// Deliver one tick. When it drains the countdown, the interval is
    /// completed and recorded before this returns.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.engine.tick() || self.engine.remaining_secs() > 0 {
            return None;
        }
        let completion = self.engine.complete()?;
        Some(self.finish(completion, false))
    }

    /// Complete the current interval now, counting it as done.
    pub fn skip(&mut self) -> Event {
        let completion = self.engine.skip();
        self.finish(completion, true)
    }

    /// Merge `patch` over the current settings, persist, and hand the
    /// result to the engine. Nothing changes if validation fails.
    ///
    /// # Errors
    /// Returns a validation error for an out-of-range field, or a storage
    /// error if the settings could not be saved.
    pub fn apply_settings(&mut self, patch: &SettingsPatch) -> Result<Settings> {
        let merged = settings::merge(self.engine.settings(), patch)?;
        let saved = storage::save_settings(self.store.as_ref(), &merged)?;
        self.engine.on_settings_changed(saved);
        info!(?saved, "settings applied");
        Ok(saved)
    }

    pub fn apply_preset(&mut self, preset: Preset) -> Result<Settings> {
        self.apply_settings(&preset.patch())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, completion: CompletionEvent, skipped: bool) -> Event {
        let today = self.clock.today();
        self.stats.apply(&completion, today);
        if let Err(e) = storage::save_stats(self.store.as_ref(), &self.stats) {
            warn!(error = %e, "failed to persist stats");
        }
        info!(
            mode = %completion.mode,
            duration_secs = completion.duration_secs,
            next = %self.engine.mode(),
            skipped,
            "interval finished"
        );
        self.announce(&completion);

        Event::IntervalCompleted {
            completion,
            next_mode: self.engine.mode(),
            skipped,
            recorded_on: today,
            at: Utc::now(),
        }
    }

    fn announce(&self, completion: &CompletionEvent) {
        let settings = self.engine.settings();

        if settings.sound_enabled {
            if let Err(e) = self.notifier.play_sound() {
                warn!(error = %e, "completion sound failed");
            }
        }

        if settings.notifications_enabled {
            let permission = match self.notifier.permission() {
                Permission::Undetermined => self.notifier.request_permission(),
                other => other,
            };
            if permission == Permission::Granted {
                let (title, body) = completion_message(completion.mode);
                if let Err(e) = self.notifier.show_notification(title, body) {
                    warn!(error = %e, "completion notification failed");
                }
            } else {
                debug!("notification permission denied, skipping");
            }
        }
    }
}
