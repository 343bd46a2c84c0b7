//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads or clocks - the caller delivers one `tick()` per elapsed
//! second (see [`TickScheduler`](super::TickScheduler)) and must call
//! `complete()` as soon as `remaining_secs()` reaches zero, before ticking
//! again.
//!
//! ## State Transitions
//!
//! ```text
//! Work --complete--> ShortBreak            (completed_in_cycle < threshold)
//! Work --complete--> LongBreak             (completed_in_cycle == threshold, counter resets)
//! ShortBreak | LongBreak --complete--> Work
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(settings);
//! engine.start();
//! // Once per second:
//! engine.tick();
//! if engine.remaining_secs() == 0 {
//!     let event = engine.complete();
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Mode;
use crate::events::{CompletionEvent, Event};
use crate::settings::{duration_for, Settings};

/// Core session state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerEngine {
    settings: Settings,
    mode: Mode,
    remaining_secs: u32,
    running: bool,
    /// Work intervals completed since the last long break.
    completed_in_cycle: u32,
}

impl TimerEngine {
    /// Create a new engine, idle at the start of a work interval.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            mode: Mode::Work,
            remaining_secs: duration_for(Mode::Work, &settings),
            running: false,
            completed_in_cycle: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_in_cycle(&self) -> u32 {
        self.completed_in_cycle
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn total_secs(&self) -> u32 {
        duration_for(self.mode, &self.settings)
    }

    /// 0.0 .. 1.0 progress within the current interval.
    ///
    /// A countdown that started under a longer duration than the current
    /// settings can run ahead of `total_secs`; progress is clamped.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - self.remaining_secs as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            completed_in_cycle: self.completed_in_cycle,
            sessions_before_long_break: self.settings.sessions_before_long_break,
            progress_pct: self.progress() * 100.0,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        Some(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.running = false;
        Some(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn toggle(&mut self) -> Option<Event> {
        if self.running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Count down one second. Returns `false` (and changes nothing) unless
    /// the timer is running with time left. Never completes the interval.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining_secs == 0 {
            return false;
        }
        self.remaining_secs -= 1;
        true
    }

    /// Finish the current interval and advance to the next mode.
    ///
    /// Returns `None` unless the countdown is at zero.
    pub fn complete(&mut self) -> Option<CompletionEvent> {
        if self.remaining_secs != 0 {
            return None;
        }
        let finished = self.mode;
        let event = CompletionEvent {
            mode: finished,
            duration_secs: duration_for(finished, &self.settings),
        };

        let next = match finished {
            Mode::Work => {
                self.completed_in_cycle += 1;
                // the threshold may have been lowered mid-cycle
                if self.completed_in_cycle >= self.settings.sessions_before_long_break {
                    self.completed_in_cycle = 0;
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Work,
        };

        self.mode = next;
        self.remaining_secs = duration_for(next, &self.settings);
        self.running = self.settings.auto_advance;
        debug!(
            from = %finished,
            to = %next,
            completed_in_cycle = self.completed_in_cycle,
            running = self.running,
            "interval completed"
        );
        Some(event)
    }

    /// Force-complete the current interval, whether or not it is running.
    pub fn skip(&mut self) -> CompletionEvent {
        self.running = false;
        self.remaining_secs = 0;
        let finished = self.mode;
        self.complete().unwrap_or(CompletionEvent {
            mode: finished,
            duration_secs: duration_for(finished, &self.settings),
        })
    }

    /// Stop and rewind the current interval. The mode is kept and the
    /// interval is not counted as completed.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.remaining_secs = duration_for(self.mode, &self.settings);
        Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Adopt new settings. An idle countdown is resized to the new duration;
    /// a running one keeps its remaining time.
    pub fn on_settings_changed(&mut self, settings: Settings) {
        self.settings = settings;
        if !self.running {
            self.remaining_secs = duration_for(self.mode, &self.settings);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            work_duration: 1500,
            short_break_duration: 300,
            long_break_duration: 900,
            sessions_before_long_break: 4,
            ..Settings::default()
        }
    }

    fn run_out(engine: &mut TimerEngine) -> CompletionEvent {
        engine.start();
        while engine.remaining_secs() > 0 {
            assert!(engine.tick());
        }
        engine.complete().expect("countdown reached zero")
    }

    #[test]
    fn starts_idle_in_work() {
        let engine = TimerEngine::new(settings());
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.remaining_secs(), 1500);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_in_cycle(), 0);
    }

    #[test]
    fn start_pause_toggle() {
        let mut engine = TimerEngine::new(settings());
        assert!(engine.start().is_some());
        assert!(engine.is_running());
        assert!(engine.start().is_none());

        assert!(engine.pause().is_some());
        assert!(!engine.is_running());
        assert!(engine.pause().is_none());

        engine.toggle();
        assert!(engine.is_running());
        engine.toggle();
        assert!(!engine.is_running());
        assert_eq!(engine.remaining_secs(), 1500);
    }

    #[test]
    fn tick_is_noop_when_paused() {
        let mut engine = TimerEngine::new(settings());
        assert!(!engine.tick());
        assert_eq!(engine.remaining_secs(), 1500);

        engine.start();
        assert!(engine.tick());
        assert_eq!(engine.remaining_secs(), 1499);
    }

    #[test]
    fn tick_stops_at_zero_without_completing() {
        let mut engine = TimerEngine::new(settings());
        engine.start();
        for _ in 0..1500 {
            engine.tick();
        }
        assert_eq!(engine.remaining_secs(), 0);
        assert!(!engine.tick());
        assert_eq!(engine.mode(), Mode::Work);
    }

    #[test]
    fn complete_requires_zero() {
        let mut engine = TimerEngine::new(settings());
        assert!(engine.complete().is_none());
        assert_eq!(engine.mode(), Mode::Work);
    }

    #[test]
    fn work_completion_moves_to_short_break() {
        let mut engine = TimerEngine::new(settings());
        let event = run_out(&mut engine);
        assert_eq!(
            event,
            CompletionEvent {
                mode: Mode::Work,
                duration_secs: 1500
            }
        );
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(engine.completed_in_cycle(), 1);
        assert!(!engine.is_running());
    }

    #[test]
    fn fourth_work_completion_moves_to_long_break() {
        let mut engine = TimerEngine::new(settings());
        for round in 1..=3 {
            run_out(&mut engine);
            assert_eq!(engine.mode(), Mode::ShortBreak);
            assert_eq!(engine.completed_in_cycle(), round);
            run_out(&mut engine);
            assert_eq!(engine.mode(), Mode::Work);
        }
        run_out(&mut engine);
        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.remaining_secs(), 900);
        assert_eq!(engine.completed_in_cycle(), 0);

        run_out(&mut engine);
        assert_eq!(engine.mode(), Mode::Work);
        assert_eq!(engine.completed_in_cycle(), 0);
    }

    #[test]
    fn single_session_cycle_always_long_breaks() {
        let mut engine = TimerEngine::new(Settings {
            sessions_before_long_break: 1,
            ..settings()
        });
        run_out(&mut engine);
        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.completed_in_cycle(), 0);
    }

    #[test]
    fn auto_advance_keeps_running() {
        let mut engine = TimerEngine::new(Settings {
            auto_advance: true,
            ..settings()
        });
        run_out(&mut engine);
        assert!(engine.is_running());
    }

    #[test]
    fn skip_emits_one_event_regardless_of_running() {
        let mut engine = TimerEngine::new(settings());
        let event = engine.skip();
        assert_eq!(event.mode, Mode::Work);
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert!(!engine.is_running());

        let mut engine = TimerEngine::new(Settings {
            auto_advance: true,
            ..settings()
        });
        engine.start();
        engine.tick();
        let event = engine.skip();
        assert_eq!(event.duration_secs, 1500);
        assert!(engine.is_running());
    }

    #[test]
    fn reset_keeps_mode() {
        let mut engine = TimerEngine::new(settings());
        engine.skip();
        engine.start();
        engine.tick();
        engine.tick();
        engine.reset();
        assert_eq!(engine.mode(), Mode::ShortBreak);
        assert_eq!(engine.remaining_secs(), 300);
        assert!(!engine.is_running());
        assert_eq!(engine.completed_in_cycle(), 1);
    }

    #[test]
    fn settings_change_resizes_idle_countdown_only() {
        let mut engine = TimerEngine::new(settings());
        engine.on_settings_changed(Settings {
            work_duration: 600,
            ..settings()
        });
        assert_eq!(engine.remaining_secs(), 600);

        engine.start();
        engine.tick();
        engine.on_settings_changed(Settings {
            work_duration: 1200,
            ..settings()
        });
        assert_eq!(engine.remaining_secs(), 599);
    }

    #[test]
    fn lowered_threshold_applies_at_next_work_completion() {
        let mut engine = TimerEngine::new(settings());
        run_out(&mut engine);
        run_out(&mut engine);
        run_out(&mut engine);
        run_out(&mut engine);
        assert_eq!(engine.completed_in_cycle(), 2);

        engine.on_settings_changed(Settings {
            sessions_before_long_break: 2,
            ..settings()
        });
        assert_eq!(engine.completed_in_cycle(), 2);
        run_out(&mut engine);
        assert_eq!(engine.mode(), Mode::LongBreak);
        assert_eq!(engine.completed_in_cycle(), 0);
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::new(settings());
        match engine.snapshot() {
            Event::StateSnapshot {
                mode,
                running,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(mode, Mode::Work);
                assert!(!running);
                assert_eq!(remaining_secs, 1500);
                assert_eq!(total_secs, 1500);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
