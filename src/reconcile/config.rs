use anyhow::{bail, Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Allowed fractional deviation of v4/v2 for each session-time comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeTolerances {
    pub matched_clean_total_times: f64,
    /// V2 undercounts crashed sessions heavily, so aborted rows get a wide margin.
    pub matched_aborted_total_times: f64,
    pub matched_total_times: f64,
    pub total_times: f64,
    pub clean_total_times: f64,
    pub aborted_total_times: f64,
    /// Used for the session/subsession length rows.
    pub extended: f64,
}

impl Default for TimeTolerances {
    fn default() -> Self {
        Self {
            matched_clean_total_times: 0.01,
            matched_aborted_total_times: 5.0,
            matched_total_times: 1.0,
            total_times: 1.0,
            clean_total_times: 1.0,
            aborted_total_times: 5.0,
            extended: 5.0,
        }
    }
}

/// Configuration for one reconciliation run with tunable thresholds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReconcileConfig {
    /// Pings from builds below this id have unreliable counters.
    pub build_id_cutoff: u64,

    /// Pings from major versions below this are reported as legacy.
    pub min_version: u32,

    /// Max distance between a clean V2 duration and a V4 session total time
    pub session_match_tolerance_secs: u64,

    /// Half-width of the window searched for a matching V4 default-browser value
    pub default_browser_window_secs: i64,

    /// Histories starting this close together are compared without a cutoff
    pub cutoff_alignment_secs: i64,

    pub search_count_tolerance: f64,
    pub tolerances: TimeTolerances,

    /// Adds session/subsession length rows to the time comparisons.
    pub include_extended_comparisons: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            build_id_cutoff: 20150722000000,
            min_version: 42,
            session_match_tolerance_secs: 5,
            default_browser_window_secs: 24 * 60 * 60,
            cutoff_alignment_secs: 24 * 60 * 60,
            search_count_tolerance: 0.01,
            tolerances: TimeTolerances::default(),
            include_extended_comparisons: false,
        }
    }
}

impl ReconcileConfig {
    /// Rejects windows chrono cannot represent, so later arithmetic stays in range.
    pub fn validate(&self) -> Result<()> {
        self.default_browser_window()?;
        self.cutoff_alignment()?;
        Ok(())
    }

    pub fn default_browser_window(&self) -> Result<Duration> {
        window("defaultBrowserWindowSecs", self.default_browser_window_secs)
    }

    pub fn cutoff_alignment(&self) -> Result<Duration> {
        window("cutoffAlignmentSecs", self.cutoff_alignment_secs)
    }
}

fn window(field: &str, seconds: i64) -> Result<Duration> {
    if seconds < 0 {
        bail!("{field} must not be negative, got {seconds}");
    }
    Duration::try_seconds(seconds).with_context(|| format!("{field} {seconds} is out of range"))
}
