//! Fixture builders shared by the reconciliation unit tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::models::{Reason, V2DailyRecord, V4Fragment};

pub fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).expect("valid test date")
}

pub fn at(year: i32, month: u32, date: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, date, hour, 0, 0)
        .single()
        .expect("valid test timestamp")
}

pub fn v2_day(clean: Vec<u64>, aborted: Vec<u64>) -> V2DailyRecord {
    V2DailyRecord::with_sessions(clean, aborted)
}

pub struct FragmentBuilder {
    fragment: V4Fragment,
}

impl FragmentBuilder {
    pub fn new(
        ping_id: &str,
        session_id: &str,
        subsession_id: &str,
        subsession_counter: u64,
        profile_subsession_counter: u64,
    ) -> Self {
        let creation_date =
            at(2023, 1, 1, 0) + Duration::hours(profile_subsession_counter as i64);

        Self {
            fragment: V4Fragment {
                ping_id: ping_id.to_string(),
                client_id: Some("client".to_string()),
                reason: Reason::Shutdown,
                creation_date,
                channel: "release".to_string(),
                build_id: "20230101000000".to_string(),
                version: "110.0".to_string(),
                session_id: session_id.to_string(),
                subsession_id: subsession_id.to_string(),
                previous_session_id: None,
                previous_subsession_id: None,
                profile_subsession_counter,
                subsession_counter,
                session_length: None,
                subsession_length: None,
                total_time: 0,
                is_default_browser: None,
                search_counts: BTreeMap::new(),
                is_from_old_build: false,
            },
        }
    }

    pub fn reason(mut self, reason: &str) -> Self {
        self.fragment.reason = Reason::from(reason);
        self
    }

    pub fn previous_session(mut self, session_id: &str) -> Self {
        self.fragment.previous_session_id = Some(session_id.to_string());
        self
    }

    pub fn previous_subsession(mut self, subsession_id: &str) -> Self {
        self.fragment.previous_subsession_id = Some(subsession_id.to_string());
        self
    }

    pub fn created(mut self, creation_date: DateTime<Utc>) -> Self {
        self.fragment.creation_date = creation_date;
        self
    }

    pub fn total_time(mut self, seconds: u64) -> Self {
        self.fragment.total_time = seconds;
        self
    }

    pub fn lengths(mut self, session_length: Option<u64>, subsession_length: Option<u64>) -> Self {
        self.fragment.session_length = session_length;
        self.fragment.subsession_length = subsession_length;
        self
    }

    pub fn default_browser(mut self, value: Option<bool>) -> Self {
        self.fragment.is_default_browser = value;
        self
    }

    pub fn search(mut self, engine: &str, count: u64) -> Self {
        self.fragment.search_counts.insert(engine.to_string(), count);
        self
    }

    pub fn build_id(mut self, build_id: &str) -> Self {
        self.fragment.build_id = build_id.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.fragment.version = version.to_string();
        self
    }

    pub fn build(self) -> V4Fragment {
        self.fragment
    }
}

/// A single-fragment session ending at `end` after `total_time` seconds.
pub fn session_fragment(
    session_id: &str,
    counter: u64,
    end: DateTime<Utc>,
    total_time: u64,
    reason: &str,
) -> V4Fragment {
    FragmentBuilder::new(
        &format!("ping-{session_id}"),
        session_id,
        &format!("{session_id}-1"),
        1,
        counter,
    )
    .reason(reason)
    .created(end)
    .total_time(total_time)
    .build()
}
