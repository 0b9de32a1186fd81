use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::log_warn;
use crate::models::{AnnotatedFragment, CurrentDefaults, DefaultBrowserCheck, V2DailyRecord};
use crate::reconcile::cutoff::{day_start, is_before_cutoff};

const ENABLE_LOGS: bool = true;

/// Cross-check the daily V2 default-browser flag against the per-ping V4 value.
///
/// V2 records the flag once a day and V4 with every ping, so a day counts as
/// confirmed when any ping within `window` of it saw the same value.
pub fn validate_default_browser(
    days: &BTreeMap<NaiveDate, V2DailyRecord>,
    fragments: &[AnnotatedFragment],
    cutoff: Option<DateTime<Utc>>,
    window: Duration,
) -> DefaultBrowserCheck {
    let mut broken_days = BTreeMap::new();
    let mut historically_broken = false;

    for (day, record) in days {
        let day_time = day_start(*day);
        let expected = match record.is_default_browser.as_bool() {
            Some(expected) if !is_before_cutoff(day_time, cutoff) => expected,
            _ => {
                broken_days.insert(*day, false);
                continue;
            }
        };

        let window_start = day_time
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let window_end = day_time
            .checked_add_signed(window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let confirmed = fragments.iter().any(|annotated| {
            let fragment = &annotated.fragment;
            fragment.creation_date >= window_start
                && fragment.creation_date <= window_end
                && fragment.is_default_browser == Some(expected)
        });

        if !confirmed {
            log_warn!("Default browser {expected} on {day} not confirmed by any V4 ping");
        }
        broken_days.insert(*day, !confirmed);
        historically_broken |= !confirmed;
    }

    DefaultBrowserCheck {
        current: current_defaults(days, fragments),
        historically_broken,
        broken_days,
    }
}

/// Most recent V2 day against the latest V4 ping.
pub fn current_defaults(
    days: &BTreeMap<NaiveDate, V2DailyRecord>,
    fragments: &[AnnotatedFragment],
) -> CurrentDefaults {
    let v2 = days
        .values()
        .next_back()
        .and_then(|record| record.is_default_browser.as_bool());
    let v4 = fragments
        .last()
        .and_then(|annotated| annotated.fragment.is_default_browser);

    CurrentDefaults {
        v2,
        v4,
        broken: v2 != v4,
    }
}
