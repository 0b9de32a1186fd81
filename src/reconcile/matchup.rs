use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{
    AnnotatedFragment, MatchupEntry, MatchupTotals, Reason, SessionMatchup, V2DailyRecord,
    V4Session,
};
use crate::reconcile::cutoff::{day_start, is_before_cutoff};
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Inputs to the session matcher that are not part of the data.
#[derive(Debug, Clone, Copy)]
pub struct MatchParams {
    /// Max distance between a clean V2 duration and a V4 total time.
    pub tolerance_secs: u64,
    /// Anchor for the still-open session, which has no historical start.
    pub now: DateTime<Utc>,
}

/// A V2 per-session duration waiting for a V4 partner.
#[derive(Debug, Clone, Copy)]
struct DurationSample {
    total_time: u64,
    aborted: bool,
}

/// Reduce fragments to one record per completed session, bucketed by the
/// UTC day the session started.
pub fn build_sessions(
    fragments: &[AnnotatedFragment],
    now: DateTime<Utc>,
) -> BTreeMap<NaiveDate, Vec<V4Session>> {
    let mut subsession_lengths: HashMap<&str, u64> = HashMap::new();
    for annotated in fragments {
        let fragment = &annotated.fragment;
        let length = subsession_lengths.entry(fragment.session_id.as_str()).or_insert(0);
        *length = length.saturating_add(fragment.subsession_length.unwrap_or(0));
    }

    let mut by_day: BTreeMap<NaiveDate, Vec<V4Session>> = BTreeMap::new();
    for annotated in fragments.iter().filter(|f| f.is_last_fragment) {
        let fragment = &annotated.fragment;
        let start_time = if fragment.reason == Reason::GatherSubsessionPayload {
            now
        } else {
            session_start(fragment.creation_date, fragment.total_time)
        };
        let subsession_length = subsession_lengths
            .get(fragment.session_id.as_str())
            .copied()
            .unwrap_or(0);

        by_day
            .entry(start_time.date_naive())
            .or_default()
            .push(V4Session {
                session_id: fragment.session_id.clone(),
                start_time,
                total_time: fragment.total_time,
                aborted: fragment.reason.is_aborted(),
                // Builds before the field existed only report subsession lengths.
                session_length: fragment.session_length.unwrap_or(subsession_length),
                subsession_length,
                search_counts: fragment.search_counts.clone(),
            });
    }

    by_day
}

fn session_start(end: DateTime<Utc>, total_time: u64) -> DateTime<Utc> {
    let start = i64::try_from(total_time)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|elapsed| end.checked_sub_signed(elapsed));

    match start {
        Some(start) => start,
        None => {
            log_warn!("Session total time {total_time}s out of range; using its end as start");
            end
        }
    }
}

/// Pair V2 session durations with V4 sessions, day by day.
///
/// Days are walked newest first and each V2 sample takes the first unclaimed
/// V4 session of its day with the same aborted flag; clean samples must also
/// lie within the tolerance. A claimed session stays claimed for the rest of
/// the run, so results depend on this order.
pub fn match_sessions(
    days: &BTreeMap<NaiveDate, V2DailyRecord>,
    fragments: &[AnnotatedFragment],
    cutoff: Option<DateTime<Utc>>,
    params: MatchParams,
) -> SessionMatchup {
    let v4_sessions = build_sessions(fragments, params.now);

    let mut all_days: BTreeSet<NaiveDate> = v4_sessions.keys().copied().collect();
    all_days.extend(
        days.iter()
            .filter(|(_, record)| record.total_time > 0)
            .map(|(day, _)| *day),
    );

    let mut matchup = SessionMatchup::default();

    for day in all_days.into_iter().rev() {
        if is_before_cutoff(day_start(day), cutoff) {
            continue;
        }

        let candidates = v4_sessions.get(&day).map(Vec::as_slice).unwrap_or(&[]);
        let mut entries = Vec::new();
        matchup.v4_session_count += candidates.len();

        if let Some(record) = days.get(&day) {
            let samples = record
                .clean_total_times
                .iter()
                .map(|&total_time| DurationSample { total_time, aborted: false })
                .chain(
                    record
                        .aborted_total_times
                        .iter()
                        .map(|&total_time| DurationSample { total_time, aborted: true }),
                );

            for sample in samples {
                matchup.v2_sample_count += 1;
                let partner = candidates.iter().find(|session| {
                    session.aborted == sample.aborted
                        // Aborted durations are unreliable in V2; only the flag has to agree.
                        && (sample.aborted
                            || session.total_time.abs_diff(sample.total_time)
                                <= params.tolerance_secs)
                        && !matchup.matched_session_ids.contains(&session.session_id)
                });

                match partner {
                    Some(session) => {
                        matchup
                            .matched_session_ids
                            .insert(session.session_id.clone());
                        entries.push(MatchupEntry {
                            start_time: Some(session.start_time),
                            total_time_v2: Some(sample.total_time),
                            total_time_v4: Some(session.total_time),
                            aborted: sample.aborted,
                            broken: false,
                            session_id: Some(session.session_id.clone()),
                            session_length: Some(session.session_length),
                            subsession_length: Some(session.subsession_length),
                        });
                    }
                    None => {
                        matchup.missing_in_v4_count += 1;
                        entries.push(MatchupEntry {
                            start_time: None,
                            total_time_v2: Some(sample.total_time),
                            total_time_v4: None,
                            aborted: sample.aborted,
                            broken: true,
                            session_id: None,
                            session_length: None,
                            subsession_length: None,
                        });
                    }
                }
            }
        }

        for session in candidates
            .iter()
            .filter(|session| !matchup.matched_session_ids.contains(&session.session_id))
        {
            matchup.missing_in_v2_count += 1;
            entries.push(MatchupEntry {
                start_time: Some(session.start_time),
                total_time_v2: None,
                total_time_v4: Some(session.total_time),
                aborted: session.aborted,
                broken: true,
                session_id: Some(session.session_id.clone()),
                session_length: Some(session.session_length),
                subsession_length: Some(session.subsession_length),
            });
        }

        matchup.sessions.insert(day, entries);
    }

    matchup.totals = sum_totals(matchup.entries());

    log_info!(
        "Matched {} sessions; {} V2 samples missing in V4, {} V4 sessions missing in V2",
        matchup.matched_session_ids.len(),
        matchup.missing_in_v4_count,
        matchup.missing_in_v2_count
    );

    matchup
}

/// Reduce every entry into the v2/v4 total pairs.
pub fn sum_totals<'a>(entries: impl Iterator<Item = &'a MatchupEntry>) -> MatchupTotals {
    fn add(pair: &mut [u64; 2], v2: u64, v4: u64) {
        pair[0] = pair[0].saturating_add(v2);
        pair[1] = pair[1].saturating_add(v4);
    }

    let mut totals = MatchupTotals::default();
    for entry in entries {
        let v2 = entry.total_time_v2.unwrap_or(0);
        let v4 = entry.total_time_v4.unwrap_or(0);
        let session_length = entry.session_length.unwrap_or(0);
        let subsession_length = entry.subsession_length.unwrap_or(0);
        let matched = !entry.broken;

        add(&mut totals.total_times, v2, v4);
        add(&mut totals.session_length, 0, session_length);
        add(&mut totals.subsession_length, 0, subsession_length);
        if matched {
            add(&mut totals.matched_total_times, v2, v4);
        }
        if entry.aborted {
            add(&mut totals.aborted_total_times, v2, v4);
            if matched {
                add(&mut totals.matched_aborted_total_times, v2, v4);
            }
        } else {
            add(&mut totals.clean_total_times, v2, v4);
            if matched {
                add(&mut totals.matched_clean_total_times, v2, v4);
                add(&mut totals.matched_clean_session_length, 0, session_length);
                add(&mut totals.matched_clean_subsession_length, 0, subsession_length);
            }
        }
    }

    totals
}
