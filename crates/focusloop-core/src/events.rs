use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Mode;

/// Emitted once for every interval that reaches zero or is skipped.
/// The stats ledger consumes these; reset intervals never produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub mode: Mode,
    /// Configured duration of the finished interval, in seconds.
    pub duration_secs: u32,
}

/// Every user-visible state change of the timer produces an Event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: Mode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    IntervalCompleted {
        completion: CompletionEvent,
        next_mode: Mode,
        skipped: bool,
        /// Ledger day the completion was recorded under.
        recorded_on: NaiveDate,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        running: bool,
        remaining_secs: u32,
        total_secs: u32,
        completed_in_cycle: u32,
        sessions_before_long_break: u32,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
