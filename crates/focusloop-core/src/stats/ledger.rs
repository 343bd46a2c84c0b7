//! Running totals and the per-day ledger of completed intervals.

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::events::CompletionEvent;
use crate::timer::Mode;

/// Work sessions in one day that earn the milestone banner.
pub const DAILY_MILESTONE: u64 = 10;

/// Counters for one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyStat {
    pub work_sessions: u64,
    pub short_breaks: u64,
    pub long_breaks: u64,
    #[serde(
        rename = "totalWorkSeconds",
        alias = "totalWorkTime",
        deserialize_with = "whole_secs"
    )]
    pub total_work_secs: u64,
}

impl DailyStat {
    pub fn milestone_reached(&self) -> bool {
        self.work_sessions >= DAILY_MILESTONE
    }
}

/// All-time totals plus the daily ledger, keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsAggregate {
    #[serde(
        rename = "totalWorkSeconds",
        alias = "totalWorkTime",
        deserialize_with = "whole_secs"
    )]
    pub total_work_secs: u64,
    #[serde(alias = "completedSessions")]
    pub completed_work_sessions: u64,
    #[serde(alias = "completedBreaks")]
    pub completed_short_breaks: u64,
    pub completed_long_breaks: u64,
    pub daily_stats: BTreeMap<String, DailyStat>,
}

/// Seconds stored either as an integer or, in older documents, as a
/// fractional number. Fractions are rounded to the nearest second.
fn whole_secs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Secs {
        Whole(u64),
        Fractional(f64),
    }

    match Secs::deserialize(deserializer)? {
        Secs::Whole(secs) => Ok(secs),
        Secs::Fractional(secs) if secs.is_finite() && secs >= 0.0 => Ok(secs.round() as u64),
        Secs::Fractional(secs) => Err(D::Error::custom(format!("invalid seconds value {secs}"))),
    }
}

/// Ledger key for a calendar date.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a ledger key back into a date.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

impl StatsAggregate {
    /// Fold one completion into the totals and into `on_date`'s entry,
    /// creating the entry if needed.
    pub fn apply(&mut self, event: &CompletionEvent, on_date: NaiveDate) {
        let secs = u64::from(event.duration_secs);
        let day = self.daily_stats.entry(date_key(on_date)).or_default();
        match event.mode {
            Mode::Work => {
                self.completed_work_sessions += 1;
                self.total_work_secs += secs;
                day.work_sessions += 1;
                day.total_work_secs += secs;
            }
            Mode::ShortBreak => {
                self.completed_short_breaks += 1;
                day.short_breaks += 1;
            }
            Mode::LongBreak => {
                self.completed_long_breaks += 1;
                day.long_breaks += 1;
            }
        }
    }

    /// The entry for `date`, or zeros when nothing was recorded that day.
    pub fn day(&self, date: NaiveDate) -> DailyStat {
        self.daily_stats
            .get(&date_key(date))
            .copied()
            .unwrap_or_default()
    }
}

/// Pure form of [`StatsAggregate::apply`]: returns the updated aggregate.
pub fn record(stats: &StatsAggregate, event: &CompletionEvent, on_date: NaiveDate) -> StatsAggregate {
    let mut next = stats.clone();
    next.apply(event, on_date);
    next
}
