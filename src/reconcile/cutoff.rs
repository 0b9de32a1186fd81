use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::log_info;
use crate::models::{V2DailyRecord, V4Fragment};

const ENABLE_LOGS: bool = true;

/// UTC midnight of `day`.
pub fn day_start(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

/// True when `time` falls strictly before the cutoff. No cutoff never excludes.
pub fn is_before_cutoff(time: DateTime<Utc>, cutoff: Option<DateTime<Utc>>) -> bool {
    cutoff.is_some_and(|cutoff| time < cutoff)
}

/// Where the two histories begin, each truncated to UTC midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStart {
    pub oldest_v2: Option<DateTime<Utc>>,
    pub oldest_v4: Option<DateTime<Utc>>,
}

impl HistoryStart {
    pub fn of(days: &BTreeMap<NaiveDate, V2DailyRecord>, fragments: &[V4Fragment]) -> Self {
        Self {
            oldest_v2: days.keys().next().copied().map(day_start),
            oldest_v4: fragments
                .first()
                .map(|fragment| day_start(fragment.creation_date.date_naive())),
        }
    }
}

/// Pick the earliest instant both histories cover.
///
/// Histories that start within `alignment` of each other are compared in
/// full; otherwise the older history is sliced off at the start of the newer
/// one.
pub fn select_cutoff(start: HistoryStart, alignment: Duration) -> Option<DateTime<Utc>> {
    let (oldest_v2, oldest_v4) = (start.oldest_v2?, start.oldest_v4?);

    if (oldest_v2 - oldest_v4).abs() <= alignment {
        log_info!("V2 and V4 histories start within {alignment}; comparing everything");
        return None;
    }

    let cutoff = oldest_v2.max(oldest_v4);
    log_info!("Histories start at {oldest_v2} (v2) and {oldest_v4} (v4); cutoff {cutoff}");
    Some(cutoff)
}

/// True when the history contains pings whose counters predate the chain fixes.
pub fn has_legacy_pings(fragments: &[V4Fragment], build_id_cutoff: u64, min_version: u32) -> bool {
    fragments.iter().any(|fragment| {
        let old_build = fragment
            .build_id
            .parse::<u64>()
            .is_ok_and(|build_id| build_id < build_id_cutoff);
        let old_version = major_version(&fragment.version).is_some_and(|major| major < min_version);
        old_build || old_version
    })
}

/// Leading integer of a dotted version string.
fn major_version(version: &str) -> Option<u32> {
    let digits: String = version.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
