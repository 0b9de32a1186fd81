use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A V2 duration sample paired with at most one V4 session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchupEntry {
    /// Session start as seen by V4; `None` when there is no V4 side.
    pub start_time: Option<DateTime<Utc>>,
    pub total_time_v2: Option<u64>,
    pub total_time_v4: Option<u64>,
    pub aborted: bool,
    pub broken: bool,
    pub session_id: Option<String>,
    pub session_length: Option<u64>,
    pub subsession_length: Option<u64>,
}

/// `[v2, v4]` pair of summed values.
pub type TimePair = [u64; 2];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchupTotals {
    pub total_times: TimePair,
    pub matched_total_times: TimePair,
    pub clean_total_times: TimePair,
    pub matched_clean_total_times: TimePair,
    pub aborted_total_times: TimePair,
    pub matched_aborted_total_times: TimePair,
    /// Length pairs only exist on the V4 side; the V2 slot stays zero.
    pub session_length: TimePair,
    pub matched_clean_session_length: TimePair,
    pub subsession_length: TimePair,
    pub matched_clean_subsession_length: TimePair,
}

impl MatchupTotals {
    /// Looks a pair up by its report field name.
    pub fn field(&self, name: &str) -> Option<TimePair> {
        let pair = match name {
            "totalTimes" => self.total_times,
            "matchedTotalTimes" => self.matched_total_times,
            "cleanTotalTimes" => self.clean_total_times,
            "matchedCleanTotalTimes" => self.matched_clean_total_times,
            "abortedTotalTimes" => self.aborted_total_times,
            "matchedAbortedTotalTimes" => self.matched_aborted_total_times,
            "sessionLength" => self.session_length,
            "matchedCleanSessionLength" => self.matched_clean_session_length,
            "subsessionLength" => self.subsession_length,
            "matchedCleanSubsessionLength" => self.matched_clean_subsession_length,
            _ => return None,
        };
        Some(pair)
    }
}

/// Per-day session pairing between the two systems.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionMatchup {
    /// Unmatched V4 sessions.
    pub missing_in_v2_count: usize,
    /// Unmatched V2 samples.
    pub missing_in_v4_count: usize,
    pub sessions: BTreeMap<NaiveDate, Vec<MatchupEntry>>,
    pub matched_session_ids: BTreeSet<String>,
    pub v4_session_count: usize,
    pub v2_sample_count: usize,
    pub totals: MatchupTotals,
}

impl SessionMatchup {
    pub fn entries(&self) -> impl Iterator<Item = &MatchupEntry> {
        self.sessions.values().flatten()
    }

    pub fn matched_count(&self) -> usize {
        self.entries().filter(|entry| !entry.broken).count()
    }
}
