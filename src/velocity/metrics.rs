use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use super::report::{DayCumulative, MetricReport, MonthCount};

pub const ROLLING_WINDOW_DAYS: i64 = 30;
pub const HISTORY_MONTHS: usize = 12;

/// Events within `[now - window_days, now]`. Both bounds are inclusive;
/// the same rule applies to every window in this module.
pub fn count_rolling(timestamps: &[DateTime<Utc>], now: DateTime<Utc>, window_days: i64) -> usize {
    let window_start = now - Duration::days(window_days);
    timestamps
        .iter()
        .filter(|ts| **ts >= window_start && **ts <= now)
        .count()
}

/// Events within `[first instant of now's month, now]`.
pub fn count_current_month(timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> usize {
    timestamps
        .iter()
        .filter(|ts| ts.year() == now.year() && ts.month() == now.month() && **ts <= now)
        .count()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        // Let chrono decide whether February 29 exists this year.
        _ => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
    }
}

/// Linear extrapolation of the current-month count to a full-month total.
/// The divisor is the 1-based day of month, so it is never zero.
pub fn project_month_total(current_count: usize, now: DateTime<Utc>) -> f64 {
    let elapsed = now.day() as f64;
    let total = days_in_month(now.year(), now.month()) as f64;
    current_count as f64 / elapsed * total
}

/// Percentage deviation of `projection` from `target`. A zero target
/// yields 0.0 instead of dividing by zero.
pub fn percent_vs_target(projection: f64, target: f64) -> f64 {
    if target > 0.0 {
        (projection - target) / target * 100.0
    } else {
        0.0
    }
}

/// Running totals per day of the current month, one entry for each day
/// from 1 through `now`'s day of month. Non-decreasing by construction,
/// and the final entry equals `count_current_month`.
pub fn cumulative_by_day(timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> Vec<DayCumulative> {
    let today = now.day() as usize;
    let mut per_day = vec![0usize; today];

    for ts in timestamps {
        if ts.year() == now.year() && ts.month() == now.month() && *ts <= now {
            per_day[ts.day() as usize - 1] += 1;
        }
    }

    let mut result = Vec::with_capacity(today);
    let mut cumulative = 0;
    for (index, count) in per_day.iter().enumerate() {
        cumulative += count;
        result.push(DayCumulative {
            day: index as u32 + 1,
            cumulative,
        });
    }
    result
}

/// Per-month totals for the trailing `months` calendar months, ending
/// with `now`'s month, oldest first. Months without events still appear
/// with a zero count, so the result always has exactly `months` entries.
pub fn monthly_history(
    timestamps: &[DateTime<Utc>],
    now: DateTime<Utc>,
    months: usize,
) -> Vec<MonthCount> {
    let mut result = Vec::with_capacity(months);
    let mut year = now.year();
    let mut month = now.month();

    for _ in 0..months {
        let count = timestamps
            .iter()
            .filter(|ts| ts.year() == year && ts.month() == month)
            .count();
        result.push(MonthCount {
            month: format!("{:04}-{:02}", year, month),
            count,
        });

        if month == 1 {
            month = 12;
            year -= 1;
        } else {
            month -= 1;
        }
    }

    result.reverse();
    result
}

/// Composes the full metric report for one event stream against a
/// monthly target.
pub fn build_report(timestamps: &[DateTime<Utc>], now: DateTime<Utc>, target: f64) -> MetricReport {
    let current_month_count = count_current_month(timestamps, now);
    let projection = project_month_total(current_month_count, now);

    MetricReport {
        target,
        rolling_30_day_count: count_rolling(timestamps, now, ROLLING_WINDOW_DAYS),
        current_month_count,
        projection,
        percent_vs_target: percent_vs_target(projection, target),
        days_elapsed: now.day(),
        days_in_month: days_in_month(now.year(), now.month()),
        cumulative_by_day: cumulative_by_day(timestamps, now),
        monthly_history: monthly_history(timestamps, now, HISTORY_MONTHS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    /// Four January events plus one from December, observed mid-January.
    fn january_scenario() -> (Vec<DateTime<Utc>>, DateTime<Utc>) {
        let events = vec![
            utc(2024, 1, 1, 9),
            utc(2024, 1, 5, 9),
            utc(2024, 1, 10, 9),
            utc(2024, 1, 15, 9),
            utc(2023, 12, 20, 9),
        ];
        (events, utc(2024, 1, 15, 12))
    }

    #[test]
    fn rolling_window_includes_prior_month_event() {
        let (events, now) = january_scenario();
        // Window starts 2023-12-16, so the Dec 20 event counts.
        assert_eq!(count_rolling(&events, now, 30), 5);
    }

    #[test]
    fn rolling_window_bounds_are_inclusive() {
        let now = utc(2024, 3, 31, 12);
        let events = vec![now - Duration::days(30), now];
        assert_eq!(count_rolling(&events, now, 30), 2);
    }

    #[test]
    fn rolling_window_excludes_events_outside_it() {
        let now = utc(2024, 3, 31, 12);
        let events = vec![
            now - Duration::days(30) - Duration::seconds(1),
            now + Duration::seconds(1),
        ];
        assert_eq!(count_rolling(&events, now, 30), 0);
    }

    #[test]
    fn current_month_counts_only_up_to_now() {
        let (events, now) = january_scenario();
        assert_eq!(count_current_month(&events, now), 4);

        // An event later today, after `now`, does not count yet.
        let mut with_future = events;
        with_future.push(utc(2024, 1, 15, 23));
        assert_eq!(count_current_month(&with_future, now), 4);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2024, 1), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn projection_extrapolates_mid_month() {
        let (_, now) = january_scenario();
        let projection = project_month_total(4, now);
        assert!((projection - 4.0 / 15.0 * 31.0).abs() < 1e-9);
        assert!((projection - 8.2667).abs() < 0.001);
    }

    #[test]
    fn projection_is_exact_on_day_one() {
        let now = utc(2024, 4, 1, 18);
        assert_eq!(project_month_total(2, now), 60.0);
    }

    #[test]
    fn projection_on_leap_day_uses_29_days() {
        let now = utc(2024, 2, 29, 12);
        assert_eq!(project_month_total(29, now), 29.0);
    }

    #[test]
    fn percent_vs_target_zero_target_policy() {
        assert_eq!(percent_vs_target(5.0, 0.0), 0.0);
        assert_eq!(percent_vs_target(0.0, 0.0), 0.0);
    }

    #[test]
    fn percent_vs_target_deviation() {
        assert_eq!(percent_vs_target(6.0, 3.0), 100.0);
        assert_eq!(percent_vs_target(0.0, 2.0), -100.0);
        assert_eq!(percent_vs_target(1.5, 3.0), -50.0);
    }

    #[test]
    fn cumulative_by_day_tracks_running_total() {
        let (events, now) = january_scenario();
        let cumulative = cumulative_by_day(&events, now);

        assert_eq!(cumulative.len(), 15);
        assert_eq!(cumulative[0], DayCumulative { day: 1, cumulative: 1 });
        assert_eq!(cumulative[4], DayCumulative { day: 5, cumulative: 2 });
        assert_eq!(cumulative[9], DayCumulative { day: 10, cumulative: 3 });
        assert_eq!(cumulative[14], DayCumulative { day: 15, cumulative: 4 });

        for pair in cumulative.windows(2) {
            assert!(pair[0].cumulative <= pair[1].cumulative);
        }
        assert_eq!(
            cumulative.last().unwrap().cumulative,
            count_current_month(&events, now)
        );
    }

    #[test]
    fn cumulative_by_day_empty_input() {
        let now = utc(2024, 1, 3, 12);
        let cumulative = cumulative_by_day(&[], now);
        assert_eq!(cumulative.len(), 3);
        assert!(cumulative.iter().all(|entry| entry.cumulative == 0));
    }

    #[test]
    fn monthly_history_is_dense_and_ordered() {
        let now = utc(2024, 1, 15, 12);
        let events = vec![
            utc(2023, 2, 10, 9),
            utc(2023, 6, 1, 9),
            utc(2023, 6, 20, 9),
            utc(2024, 1, 5, 9),
            // 13 months back, outside the trailing window.
            utc(2022, 12, 31, 9),
        ];
        let history = monthly_history(&events, now, 12);

        assert_eq!(history.len(), 12);
        assert_eq!(history[0].month, "2023-02");
        assert_eq!(history[11].month, "2024-01");
        assert_eq!(history[0].count, 1);
        assert_eq!(history[4].month, "2023-06");
        assert_eq!(history[4].count, 2);
        assert_eq!(history[11].count, 1);

        let total: usize = history.iter().map(|entry| entry.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn monthly_history_empty_input_still_has_12_entries() {
        let now = utc(2024, 6, 1, 0);
        let history = monthly_history(&[], now, 12);
        assert_eq!(history.len(), 12);
        assert!(history.iter().all(|entry| entry.count == 0));
        assert_eq!(history[0].month, "2023-07");
        assert_eq!(history[11].month, "2024-06");
    }

    #[test]
    fn build_report_composes_all_metrics() {
        let (events, now) = january_scenario();
        let report = build_report(&events, now, 2.0);

        assert_eq!(report.target, 2.0);
        assert_eq!(report.rolling_30_day_count, 5);
        assert_eq!(report.current_month_count, 4);
        assert_eq!(report.days_elapsed, 15);
        assert_eq!(report.days_in_month, 31);
        assert!((report.projection - 8.2667).abs() < 0.001);
        assert!((report.percent_vs_target - 313.33).abs() < 0.01);
        assert_eq!(report.cumulative_by_day.len(), 15);
        assert_eq!(report.monthly_history.len(), 12);
    }

    #[test]
    fn build_report_empty_events() {
        let now = utc(2024, 1, 15, 12);
        let report = build_report(&[], now, 2.0);

        assert_eq!(report.rolling_30_day_count, 0);
        assert_eq!(report.current_month_count, 0);
        assert_eq!(report.projection, 0.0);
        assert_eq!(report.percent_vs_target, -100.0);
    }
}
