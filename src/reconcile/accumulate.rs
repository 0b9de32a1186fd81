use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{AnnotatedFragment, V2Accumulation, V2DailyRecord, V4Accumulation};
use crate::reconcile::cutoff::{day_start, is_before_cutoff};

fn add_counts(into: &mut BTreeMap<String, u64>, counts: &BTreeMap<String, u64>) {
    for (engine, count) in counts {
        let total = into.entry(engine.clone()).or_insert(0);
        *total = total.saturating_add(*count);
    }
}

/// Sum V2 daily records from the cutoff day onwards.
pub fn accumulate_v2(
    days: &BTreeMap<NaiveDate, V2DailyRecord>,
    cutoff: Option<DateTime<Utc>>,
) -> V2Accumulation {
    let mut totals = V2Accumulation::default();

    for (day, record) in days {
        if is_before_cutoff(day_start(*day), cutoff) {
            continue;
        }
        add_counts(&mut totals.search_counts, &record.search_counts);
        totals.total_time = totals.total_time.saturating_add(record.total_time);
        totals.clean_total_time = totals.clean_total_time.saturating_add(record.clean_total_time);
        totals.aborted_total_time = totals.aborted_total_time.saturating_add(record.aborted_total_time);
    }

    totals
}

/// Sum V4 fragments created at or after the cutoff.
///
/// Session durations are only taken from the last fragment of each session;
/// every fragment reports the session's running total so far.
pub fn accumulate_v4(
    fragments: &[AnnotatedFragment],
    cutoff: Option<DateTime<Utc>>,
) -> V4Accumulation {
    let mut totals = V4Accumulation::default();

    for annotated in fragments {
        let fragment = &annotated.fragment;
        if is_before_cutoff(fragment.creation_date, cutoff) {
            continue;
        }

        add_counts(&mut totals.search_counts, &fragment.search_counts);
        totals.subsession_length = totals
            .subsession_length
            .saturating_add(fragment.subsession_length.unwrap_or(0));

        if annotated.is_last_fragment {
            totals.total_time = totals.total_time.saturating_add(fragment.total_time);
            if fragment.reason.is_aborted() {
                totals.aborted_total_time = totals.aborted_total_time.saturating_add(fragment.total_time);
            } else {
                totals.clean_total_time = totals.clean_total_time.saturating_add(fragment.total_time);
            }
            totals.session_length = totals
                .session_length
                .saturating_add(fragment.session_length.unwrap_or(0));
        }
    }

    totals
}
