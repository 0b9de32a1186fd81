//! Raw payload shapes as exported by the two telemetry stores.
//!
//! Only the fields the normalizer reads are modelled; everything else in the
//! exported JSON is ignored by serde.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Exported V2 (daily aggregate) payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawV2Payload {
    pub data: RawV2Data,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawV2Data {
    /// Day key (`YYYY-MM-DD`) to the measurement blocks recorded that day.
    #[serde(default)]
    pub days: BTreeMap<String, RawV2Day>,
    #[serde(default)]
    pub last: RawV2Last,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawV2Day {
    /// Engine to count; also carries a `_v` schema version entry.
    #[serde(rename = "org.mozilla.searches.counts", default)]
    pub search_counts: Option<BTreeMap<String, u64>>,
    #[serde(rename = "org.mozilla.appInfo.appinfo", default)]
    pub app_info: Option<RawAppInfo>,
    #[serde(rename = "org.mozilla.appSessions.previous", default)]
    pub previous_sessions: Option<RawPreviousSessions>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAppInfo {
    /// 1 = default, 0 = not default, anything else = unknown.
    #[serde(default)]
    pub is_default_browser: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPreviousSessions {
    #[serde(default)]
    pub clean_total_time: Option<Vec<u64>>,
    #[serde(default)]
    pub aborted_total_time: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawV2Last {
    #[serde(rename = "org.mozilla.appSessions.current", default)]
    pub current_session: Option<RawCurrentSession>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCurrentSession {
    #[serde(default)]
    pub total_time: u64,
}

/// One archived V4 ping.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPing {
    pub id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(rename = "type", default = "default_ping_type")]
    pub ping_type: String,
    /// RFC 3339 timestamp.
    pub creation_date: String,
    pub application: RawApplication,
    pub payload: RawPingPayload,
    #[serde(default)]
    pub environment: RawEnvironment,
}

fn default_ping_type() -> String {
    "main".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawApplication {
    pub channel: String,
    pub build_id: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPingPayload {
    pub info: RawPingInfo,
    #[serde(default)]
    pub simple_measurements: RawSimpleMeasurements,
    #[serde(default)]
    pub keyed_histograms: BTreeMap<String, BTreeMap<String, RawHistogram>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPingInfo {
    pub reason: String,
    pub session_id: String,
    pub subsession_id: String,
    #[serde(default)]
    pub previous_session_id: Option<String>,
    #[serde(default)]
    pub previous_subsession_id: Option<String>,
    pub profile_subsession_counter: u64,
    pub subsession_counter: u64,
    #[serde(default)]
    pub session_length: Option<u64>,
    #[serde(default)]
    pub subsession_length: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSimpleMeasurements {
    #[serde(default)]
    pub total_time: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHistogram {
    #[serde(default)]
    pub sum: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEnvironment {
    #[serde(default)]
    pub settings: RawSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default)]
    pub is_default_browser: Option<bool>,
}
