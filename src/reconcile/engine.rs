use std::collections::BTreeMap;

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};

use crate::log_info;
use crate::models::{ReconciliationReport, V2DailyRecord, V4Fragment};
use crate::reconcile::{
    accumulate::{accumulate_v2, accumulate_v4},
    chain::{annotate_chain, summarize_chain},
    config::ReconcileConfig,
    cutoff::{has_legacy_pings, select_cutoff, HistoryStart},
    default_browser::validate_default_browser,
    matchup::{match_sessions, MatchParams},
    tolerance::{compare_search_counts, compare_session_times},
};

const ENABLE_LOGS: bool = true;

/// Main reconciliation entry point: normalized V2 days and V4 fragments in,
/// report out.
///
/// `fragments` must be ascending by creation date. `now` anchors the
/// still-open session.
pub fn reconcile(
    days: &BTreeMap<NaiveDate, V2DailyRecord>,
    fragments: &[V4Fragment],
    config: &ReconcileConfig,
    now: DateTime<Utc>,
) -> Result<ReconciliationReport> {
    if fragments.is_empty() {
        bail!("no v4 data to compare yet");
    }
    if days.is_empty() {
        bail!("no v2 data to compare yet");
    }

    let history = HistoryStart::of(days, fragments);
    let cutoff = select_cutoff(history, config.cutoff_alignment()?);

    // Step 1: Chain consistency
    let annotated = annotate_chain(fragments);
    let chain = summarize_chain(&annotated);
    log_info!(
        "Checked {} fragments, {} broken",
        chain.fragment_count,
        chain.broken_count
    );

    // Step 2: Scalar accumulations
    let v2_accumulated = accumulate_v2(days, cutoff);
    let v4_accumulated = accumulate_v4(&annotated, cutoff);
    let search_counts =
        compare_search_counts(&v2_accumulated, &v4_accumulated, config.search_count_tolerance);

    // Step 3: Default browser history
    let defaults =
        validate_default_browser(days, &annotated, cutoff, config.default_browser_window()?);

    // Step 4: Session matchup
    let matchup = match_sessions(
        days,
        &annotated,
        cutoff,
        MatchParams {
            tolerance_secs: config.session_match_tolerance_secs,
            now,
        },
    );
    let time_comparisons = compare_session_times(&matchup.totals, config);

    Ok(ReconciliationReport {
        cutoff,
        oldest_v2_day: history.oldest_v2,
        oldest_v4_day: history.oldest_v4,
        has_legacy_pings: has_legacy_pings(fragments, config.build_id_cutoff, config.min_version),
        v2_accumulated,
        v4_accumulated,
        search_counts,
        defaults,
        chain,
        matchup,
        time_comparisons,
        fragments: annotated,
    })
}
