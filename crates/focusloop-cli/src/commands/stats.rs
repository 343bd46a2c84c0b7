use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::Subcommand;
use focusloop_core::stats::{self, WEEK_DAYS};
use focusloop_core::storage::load_stats;
use focusloop_core::{Clock, DailyStat, Rollup, SystemClock};
use serde::Serialize;

use super::{open_store, print_json, CommandResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// The last seven days, today included
    Week,
    /// All-time stats with the daily ledger
    All,
    /// Export the daily ledger as CSV
    Export {
        /// Output file (defaults to focusloop-stats-<date>.csv in the
        /// current directory)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<PathBuf>,
        /// Write to stdout instead of a file
        #[arg(long)]
        stdout: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayReport {
    date: NaiveDate,
    #[serde(flatten)]
    stat: DailyStat,
    milestone_reached: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WeekReport {
    from: NaiveDate,
    to: NaiveDate,
    #[serde(flatten)]
    rollup: Rollup,
}

pub fn run(action: StatsAction) -> CommandResult {
    let store = open_store()?;
    let ledger = load_stats(&store);
    let today = SystemClock.today();

    match action {
        StatsAction::Today => {
            let stat = ledger.day(today);
            print_json(&DayReport {
                date: today,
                stat,
                milestone_reached: stat.milestone_reached(),
            })?;
        }
        StatsAction::Week => {
            let from = today
                .checked_sub_days(Days::new(WEEK_DAYS - 1))
                .unwrap_or(NaiveDate::MIN);
            print_json(&WeekReport {
                from,
                to: today,
                rollup: stats::weekly_rollup(&ledger, today),
            })?;
        }
        StatsAction::All => {
            print_json(&ledger)?;
        }
        StatsAction::Export { output, stdout } => {
            let csv = stats::export_csv(&ledger);
            if stdout {
                println!("{csv}");
            } else {
                let path = output.unwrap_or_else(|| PathBuf::from(stats::export_file_name(today)));
                std::fs::write(&path, format!("{csv}\n"))?;
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}
