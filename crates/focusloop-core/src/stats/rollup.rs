//! Windowed rollups over the daily ledger.
//!
//! Windows are calendar-date ranges, not multiples of 24 hours: an entry
//! counts when its date falls inside the range, whatever the time of day it
//! was recorded. Ledger keys that do not parse as dates are skipped.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ledger::{parse_date_key, DailyStat, StatsAggregate};

/// Days in the trailing window, `as_of` included.
pub const WEEK_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup {
    #[serde(rename = "totalWorkSeconds")]
    pub total_work_secs: u64,
    pub work_sessions: u64,
    pub short_breaks: u64,
    pub long_breaks: u64,
}

impl Rollup {
    fn absorb(&mut self, day: &DailyStat) {
        self.total_work_secs += day.total_work_secs;
        self.work_sessions += day.work_sessions;
        self.short_breaks += day.short_breaks;
        self.long_breaks += day.long_breaks;
    }
}

/// Sum every ledger entry dated within `from..=to`.
pub fn rollup_between(stats: &StatsAggregate, from: NaiveDate, to: NaiveDate) -> Rollup {
    let mut rollup = Rollup::default();
    for (key, day) in &stats.daily_stats {
        match parse_date_key(key) {
            Some(date) if date >= from && date <= to => rollup.absorb(day),
            _ => {}
        }
    }
    rollup
}

/// The seven calendar days ending at `as_of`, inclusive.
pub fn weekly_rollup(stats: &StatsAggregate, as_of: NaiveDate) -> Rollup {
    let from = as_of
        .checked_sub_days(Days::new(WEEK_DAYS - 1))
        .unwrap_or(NaiveDate::MIN);
    rollup_between(stats, from, as_of)
}
