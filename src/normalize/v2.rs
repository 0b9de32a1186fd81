use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::log_debug;
use crate::models::raw::{RawV2Day, RawV2Payload};
use crate::models::{DefaultBrowserState, V2DailyRecord};
use crate::normalize::parse_day;

const ENABLE_LOGS: bool = true;

/// Schema version entry mixed into the search-count block.
const VERSION_KEY: &str = "_v";

/// Build the day-keyed V2 map, folding the open session into today's record.
pub fn normalize_v2(
    raw: &RawV2Payload,
    now: DateTime<Utc>,
) -> Result<BTreeMap<NaiveDate, V2DailyRecord>> {
    let mut days = BTreeMap::new();

    for (key, raw_day) in &raw.data.days {
        let day = parse_day(key)?;
        match extract_day(raw_day) {
            Some(record) => {
                days.insert(day, record);
            }
            None => log_debug!("Skipping V2 day {day} without usable measurements"),
        }
    }

    let today = days.entry(now.date_naive()).or_default();
    match &raw.data.last.current_session {
        Some(current) => today.push_current_session(current.total_time),
        None => log_debug!("V2 payload has no current session block"),
    }

    Ok(days)
}

fn extract_day(raw: &RawV2Day) -> Option<V2DailyRecord> {
    let mut record = V2DailyRecord::default();
    let mut has_data = false;

    if let Some(counts) = &raw.search_counts {
        for (engine, count) in counts.iter().filter(|(engine, _)| *engine != VERSION_KEY) {
            record.search_counts.insert(engine.clone(), *count);
            has_data = true;
        }
    }

    if let Some(app_info) = &raw.app_info {
        record.is_default_browser = DefaultBrowserState::from_raw(app_info.is_default_browser);
        has_data = true;
    }

    if let Some(previous) = &raw.previous_sessions {
        let sessions = V2DailyRecord::with_sessions(
            previous.clean_total_time.clone().unwrap_or_default(),
            previous.aborted_total_time.clone().unwrap_or_default(),
        );
        record = V2DailyRecord {
            is_default_browser: record.is_default_browser,
            search_counts: record.search_counts,
            ..sessions
        };
        has_data = true;
    }

    has_data.then_some(record)
}
