//! Statistics module for focusloop
//!
//! Completed intervals are folded into a persisted ledger of per-day
//! counters plus all-time totals. Weekly figures are computed on demand
//! from the ledger and never stored.

mod export;
mod ledger;
mod rollup;

pub use export::{export_csv, export_file_name, CSV_HEADER};
pub use ledger::{date_key, parse_date_key, record, DailyStat, StatsAggregate, DAILY_MILESTONE};
pub use rollup::{rollup_between, weekly_rollup, Rollup, WEEK_DAYS};
