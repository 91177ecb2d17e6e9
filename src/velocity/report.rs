use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::metrics;
use crate::config::types::TargetsConfig;
use crate::github::types::{MergedPull, ReleaseEvent};

/// Cumulative event count up to and including one day of the current month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCumulative {
    pub day: u32,
    pub cumulative: usize,
}

/// Event count for one calendar month, labelled `YYYY-MM`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: String,
    pub count: usize,
}

/// Velocity metrics for a single event stream (releases or PR merges).
///
/// Field names are stable; downstream dashboards consume the serialized
/// form directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReport {
    pub target: f64,
    pub rolling_30_day_count: usize,
    pub current_month_count: usize,
    pub projection: f64,
    pub percent_vs_target: f64,
    pub days_elapsed: u32,
    pub days_in_month: u32,
    pub cumulative_by_day: Vec<DayCumulative>,
    pub monthly_history: Vec<MonthCount>,
}

/// The full report for one repository: release velocity and PR-merge
/// velocity side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityReport {
    pub owner: String,
    pub repo: String,
    pub author_filter: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub releases: MetricReport,
    pub pr_merges: MetricReport,
}

impl VelocityReport {
    pub fn build(
        owner: &str,
        repo: &str,
        author_filter: Option<String>,
        releases: &[ReleaseEvent],
        pulls: &[MergedPull],
        now: DateTime<Utc>,
        targets: &TargetsConfig,
    ) -> Self {
        let release_times: Vec<DateTime<Utc>> = releases.iter().map(|r| r.timestamp).collect();
        let pull_times: Vec<DateTime<Utc>> = pulls.iter().map(|p| p.timestamp).collect();

        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            author_filter,
            generated_at: now,
            releases: metrics::build_report(&release_times, now, targets.releases),
            pr_merges: metrics::build_report(&pull_times, now, targets.pull_requests),
        }
    }
}
