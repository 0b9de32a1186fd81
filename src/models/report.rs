//! Reconciliation report models.
//!
//! The report is the only thing handed to the presentation layer, so every
//! type here serializes with camelCase field names.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::matchup::SessionMatchup;
use super::v4::AnnotatedFragment;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct V2Accumulation {
    pub search_counts: BTreeMap<String, u64>,
    pub total_time: u64,
    pub clean_total_time: u64,
    pub aborted_total_time: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct V4Accumulation {
    pub search_counts: BTreeMap<String, u64>,
    pub total_time: u64,
    pub clean_total_time: u64,
    pub aborted_total_time: u64,
    pub session_length: u64,
    pub subsession_length: u64,
}

/// `b / a`, or undefined when `a` is zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub ratio: Ratio,
    pub tolerance: f64,
    pub broken: bool,
}

impl Comparison {
    /// Candidate as a percentage of the reference, rounded to one decimal.
    pub fn percent(&self) -> Option<f64> {
        match self.ratio {
            Ratio::Defined(ratio) => Some((ratio * 1000.0).round() / 10.0),
            Ratio::Undefined => None,
        }
    }
}

/// One row of a v2-vs-v4 comparison table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub label: String,
    pub v2: u64,
    pub v4: u64,
    pub comparison: Comparison,
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentDefaults {
    pub v2: Option<bool>,
    pub v4: Option<bool>,
    pub broken: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DefaultBrowserCheck {
    pub current: CurrentDefaults,
    pub historically_broken: bool,
    /// `brokenDefaultBrowser` per V2 day.
    pub broken_days: BTreeMap<NaiveDate, bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary {
    pub fragment_count: usize,
    pub broken_count: usize,
    pub broken_ping_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub cutoff: Option<DateTime<Utc>>,
    pub oldest_v2_day: Option<DateTime<Utc>>,
    pub oldest_v4_day: Option<DateTime<Utc>>,
    pub has_legacy_pings: bool,
    pub v2_accumulated: V2Accumulation,
    pub v4_accumulated: V4Accumulation,
    pub search_counts: Vec<MetricComparison>,
    pub defaults: DefaultBrowserCheck,
    pub chain: ChainSummary,
    pub matchup: SessionMatchup,
    pub time_comparisons: Vec<MetricComparison>,
    pub fragments: Vec<AnnotatedFragment>,
}
