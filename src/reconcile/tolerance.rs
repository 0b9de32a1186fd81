use std::collections::BTreeSet;

use crate::models::{
    Comparison, MatchupTotals, MetricComparison, Ratio, V2Accumulation, V4Accumulation,
};
use crate::reconcile::config::ReconcileConfig;

/// Compare a candidate `b` against a reference `a`.
///
/// `broken` when `b / a` deviates from 1.0 by more than `tolerance`. A zero
/// reference gives an undefined ratio, which is never broken: there is not
/// enough data to call it inconsistent.
pub fn compare(a: f64, b: f64, tolerance: f64) -> Comparison {
    if a == 0.0 {
        return Comparison {
            ratio: Ratio::Undefined,
            tolerance,
            broken: false,
        };
    }

    // Same as |b/a - 1| > tolerance, measured in the reference's units so an
    // exact boundary like 1010 vs 1000 at 1% is not tipped over by rounding.
    Comparison {
        ratio: Ratio::Defined(b / a),
        tolerance,
        broken: (b - a).abs() > tolerance * a.abs(),
    }
}

pub fn compare_metric(label: impl Into<String>, v2: u64, v4: u64, tolerance: f64) -> MetricComparison {
    let comparison = compare(v2 as f64, v4 as f64, tolerance);
    MetricComparison {
        label: label.into(),
        v2,
        v4,
        percent: comparison.percent(),
        comparison,
    }
}

/// One row per search engine seen by either system.
pub fn compare_search_counts(
    v2: &V2Accumulation,
    v4: &V4Accumulation,
    tolerance: f64,
) -> Vec<MetricComparison> {
    let engines: BTreeSet<&String> = v2
        .search_counts
        .keys()
        .chain(v4.search_counts.keys())
        .collect();

    engines
        .into_iter()
        .map(|engine| {
            compare_metric(
                format!("search: {engine}"),
                v2.search_counts.get(engine).copied().unwrap_or(0),
                v4.search_counts.get(engine).copied().unwrap_or(0),
                tolerance,
            )
        })
        .collect()
}

/// Session-time rows: `(v2 field, v4 field, tolerance)`.
fn time_rows(config: &ReconcileConfig) -> Vec<(&'static str, &'static str, f64)> {
    let tolerances = &config.tolerances;
    let mut rows = vec![
        ("matchedCleanTotalTimes", "matchedCleanTotalTimes", tolerances.matched_clean_total_times),
        ("matchedAbortedTotalTimes", "matchedAbortedTotalTimes", tolerances.matched_aborted_total_times),
        ("matchedTotalTimes", "matchedTotalTimes", tolerances.matched_total_times),
        ("totalTimes", "totalTimes", tolerances.total_times),
        ("cleanTotalTimes", "cleanTotalTimes", tolerances.clean_total_times),
        ("abortedTotalTimes", "abortedTotalTimes", tolerances.aborted_total_times),
    ];

    if config.include_extended_comparisons {
        rows.extend([
            ("matchedTotalTimes", "matchedCleanSessionLength", tolerances.extended),
            ("matchedTotalTimes", "matchedCleanSubsessionLength", tolerances.extended),
            ("totalTimes", "sessionLength", tolerances.extended),
            ("totalTimes", "subsessionLength", tolerances.extended),
        ]);
    }

    rows
}

/// Compare the matchup totals using the per-metric tolerances.
pub fn compare_session_times(totals: &MatchupTotals, config: &ReconcileConfig) -> Vec<MetricComparison> {
    time_rows(config)
        .into_iter()
        .filter_map(|(v2_field, v4_field, tolerance)| {
            let v2 = totals.field(v2_field)?[0];
            let v4 = totals.field(v4_field)?[1];
            let label = if v2_field == v4_field {
                v2_field.to_string()
            } else {
                format!("{v2_field} vs. {v4_field}")
            };
            Some(compare_metric(label, v2, v4, tolerance))
        })
        .collect()
}
