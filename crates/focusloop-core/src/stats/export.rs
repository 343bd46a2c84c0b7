use chrono::NaiveDate;

use super::ledger::{date_key, StatsAggregate};

pub const CSV_HEADER: &str = "Date,Work Sessions,Short Breaks,Long Breaks,Total Work Time (minutes)";

/// Seconds to whole minutes, halves rounded up.
fn round_minutes(secs: u64) -> u64 {
    (secs + 30) / 60
}

/// One row per ledger day, in ascending key order.
pub fn export_csv(stats: &StatsAggregate) -> String {
    let mut lines = Vec::with_capacity(stats.daily_stats.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for (date, day) in &stats.daily_stats {
        lines.push(format!(
            "{},{},{},{},{}",
            date,
            day.work_sessions,
            day.short_breaks,
            day.long_breaks,
            round_minutes(day.total_work_secs)
        ));
    }
    lines.join("\n")
}

/// Default file name for an export taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("focusloop-stats-{}.csv", date_key(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::DailyStat;

    #[test]
    fn empty_ledger_is_header_only() {
        assert_eq!(export_csv(&StatsAggregate::default()), CSV_HEADER);
    }

    #[test]
    fn rows_round_work_time_to_nearest_minute() {
        let mut stats = StatsAggregate::default();
        stats.daily_stats.insert(
            "2024-05-10".into(),
            DailyStat {
                work_sessions: 3,
                short_breaks: 2,
                long_breaks: 1,
                total_work_secs: 4530,
            },
        );
        stats.daily_stats.insert(
            "2024-05-09".into(),
            DailyStat {
                work_sessions: 1,
                total_work_secs: 89,
                ..DailyStat::default()
            },
        );
        let csv = export_csv(&stats);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "2024-05-09,1,0,0,1");
        assert_eq!(lines[2], "2024-05-10,3,2,1,76");
    }

    #[test]
    fn file_name_carries_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(export_file_name(date), "focusloop-stats-2024-05-10.csv");
    }
}
