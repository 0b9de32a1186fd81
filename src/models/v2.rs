//! Legacy daily-aggregate (V2) data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tri-state default-browser flag recorded once per day by V2.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DefaultBrowserState {
    Yes,
    No,
    #[default]
    Unknown,
}

impl DefaultBrowserState {
    /// Maps the raw V2 integer encoding: 1 = default, 0 = not default.
    pub fn from_raw(value: Option<i64>) -> Self {
        match value {
            Some(1) => DefaultBrowserState::Yes,
            Some(0) => DefaultBrowserState::No,
            _ => DefaultBrowserState::Unknown,
        }
    }

    /// The boolean V4 records for the same state, if known.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DefaultBrowserState::Yes => Some(true),
            DefaultBrowserState::No => Some(false),
            DefaultBrowserState::Unknown => None,
        }
    }

}

/// Durations come from client exports; sums clamp rather than wrap.
fn saturating_sum(values: &[u64]) -> u64 {
    values.iter().fold(0u64, |acc, value| acc.saturating_add(*value))
}

/// One calendar day of V2 data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct V2DailyRecord {
    pub is_default_browser: DefaultBrowserState,
    pub search_counts: BTreeMap<String, u64>,
    pub total_time: u64,
    pub clean_total_time: u64,
    pub clean_total_times: Vec<u64>,
    pub aborted_total_time: u64,
    pub aborted_total_times: Vec<u64>,
}

impl V2DailyRecord {
    /// Builds a record from its per-session durations, keeping the sums consistent.
    pub fn with_sessions(clean_total_times: Vec<u64>, aborted_total_times: Vec<u64>) -> Self {
        let clean_total_time = saturating_sum(&clean_total_times);
        let aborted_total_time = saturating_sum(&aborted_total_times);
        Self {
            total_time: clean_total_time.saturating_add(aborted_total_time),
            clean_total_time,
            clean_total_times,
            aborted_total_time,
            aborted_total_times,
            ..Self::default()
        }
    }

    /// Folds the still-open session into this day as a clean session.
    pub fn push_current_session(&mut self, total_time: u64) {
        self.total_time = self.total_time.saturating_add(total_time);
        self.clean_total_time = self.clean_total_time.saturating_add(total_time);
        self.clean_total_times.push(total_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_default_browser_mapping() {
        assert_eq!(DefaultBrowserState::from_raw(Some(1)), DefaultBrowserState::Yes);
        assert_eq!(DefaultBrowserState::from_raw(Some(0)), DefaultBrowserState::No);
        assert_eq!(DefaultBrowserState::from_raw(Some(2)), DefaultBrowserState::Unknown);
        assert_eq!(DefaultBrowserState::from_raw(None), DefaultBrowserState::Unknown);
        assert_eq!(DefaultBrowserState::Unknown.as_bool(), None);
    }

    #[test]
    fn current_session_keeps_total_consistent() {
        let mut record = V2DailyRecord::with_sessions(vec![10, 20], vec![5]);
        assert_eq!(record.total_time, 35);

        record.push_current_session(7);
        assert_eq!(record.total_time, 42);
        assert_eq!(record.clean_total_time, 37);
        assert_eq!(record.clean_total_times, vec![10, 20, 7]);
        assert_eq!(
            record.total_time,
            record.clean_total_time + record.aborted_total_time
        );
    }

    #[test]
    fn huge_durations_clamp_instead_of_overflowing() {
        let mut record = V2DailyRecord::with_sessions(vec![u64::MAX, 1], vec![3]);
        assert_eq!(record.clean_total_time, u64::MAX);
        assert_eq!(record.aborted_total_time, 3);
        assert_eq!(record.total_time, u64::MAX);

        record.push_current_session(10);
        assert_eq!(record.total_time, u64::MAX);
        assert_eq!(record.clean_total_times.len(), 3);
    }
}
