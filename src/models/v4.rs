//! Per-ping (V4) data models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a ping was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Reason {
    Shutdown,
    AbortedSession,
    GatherSubsessionPayload,
    Daily,
    EnvironmentChange,
    Other(String),
}

impl Reason {
    pub fn as_str(&self) -> &str {
        match self {
            Reason::Shutdown => "shutdown",
            Reason::AbortedSession => "aborted-session",
            Reason::GatherSubsessionPayload => "gather-subsession-payload",
            Reason::Daily => "daily",
            Reason::EnvironmentChange => "environment-change",
            Reason::Other(other) => other,
        }
    }

    /// Reasons that close out a session.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Reason::Shutdown | Reason::AbortedSession | Reason::GatherSubsessionPayload
        )
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Reason::AbortedSession)
    }
}

impl From<&str> for Reason {
    fn from(value: &str) -> Self {
        match value {
            "shutdown" => Reason::Shutdown,
            "aborted-session" => Reason::AbortedSession,
            "gather-subsession-payload" => Reason::GatherSubsessionPayload,
            "daily" => Reason::Daily,
            "environment-change" => Reason::EnvironmentChange,
            other => Reason::Other(other.to_string()),
        }
    }
}

impl From<String> for Reason {
    fn from(value: String) -> Self {
        Reason::from(value.as_str())
    }
}

impl From<Reason> for String {
    fn from(reason: Reason) -> Self {
        reason.as_str().to_string()
    }
}

/// One normalized V4 ping: a slice of a browser session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct V4Fragment {
    pub ping_id: String,
    pub client_id: Option<String>,
    pub reason: Reason,
    pub creation_date: DateTime<Utc>,
    pub channel: String,
    pub build_id: String,
    pub version: String,
    pub session_id: String,
    pub subsession_id: String,
    pub previous_session_id: Option<String>,
    pub previous_subsession_id: Option<String>,
    pub profile_subsession_counter: u64,
    pub subsession_counter: u64,
    /// Absent on builds that predate the field.
    pub session_length: Option<u64>,
    pub subsession_length: Option<u64>,
    pub total_time: u64,
    pub is_default_browser: Option<bool>,
    pub search_counts: BTreeMap<String, u64>,
    pub is_from_old_build: bool,
}

/// Consistency checks of a fragment against its predecessor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainChecks {
    pub channel_switching: bool,
    pub broken_session_chain: bool,
    pub broken_subsession_chain: bool,
    pub broken_profile_subsession_counter: bool,
    pub broken_subsession_counter: bool,
    pub is_broken: bool,
}

/// A fragment together with its chain annotations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedFragment {
    #[serde(flatten)]
    pub fragment: V4Fragment,
    pub is_final_fragment: bool,
    pub is_last_fragment: bool,
    /// `None` for the first fragment in the sequence.
    pub checks: Option<ChainChecks>,
}

impl AnnotatedFragment {
    pub fn is_broken(&self) -> bool {
        self.checks.is_some_and(|checks| checks.is_broken)
    }
}

/// All fragments of one session reduced to a single record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct V4Session {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub total_time: u64,
    pub aborted: bool,
    pub session_length: u64,
    pub subsession_length: u64,
    pub search_counts: BTreeMap<String, u64>,
}
