use crate::log_debug;
use crate::models::{AnnotatedFragment, ChainChecks, ChainSummary, V4Fragment};

const ENABLE_LOGS: bool = true;

/// Walk the time-ordered fragments and annotate each one against its predecessor.
///
/// Input must be ascending by creation date. The input is left untouched; every
/// fragment is copied into a new annotated record.
pub fn annotate_chain(fragments: &[V4Fragment]) -> Vec<AnnotatedFragment> {
    let mut annotated = Vec::with_capacity(fragments.len());
    let mut previous: Option<&V4Fragment> = None;

    for (index, current) in fragments.iter().enumerate() {
        // A fragment ends its session when the next one belongs to another
        // session, or when nothing follows it at all.
        let is_last_fragment = fragments
            .get(index + 1)
            .map_or(true, |next| next.session_id != current.session_id);

        let checks = previous.map(|prev| check_transition(prev, current));
        if let Some(checks) = checks.filter(|checks| checks.is_broken) {
            log_debug!(
                "Broken fragment {} (session {}): {:?}",
                current.ping_id,
                current.session_id,
                checks
            );
        }

        annotated.push(AnnotatedFragment {
            fragment: current.clone(),
            is_final_fragment: current.reason.is_final(),
            is_last_fragment,
            checks,
        });
        previous = Some(current);
    }

    annotated
}

/// Consistency checks of `current` against its immediate predecessor.
pub fn check_transition(previous: &V4Fragment, current: &V4Fragment) -> ChainChecks {
    let previous_is_final = previous.reason.is_final();

    let channel_switching = current.channel != previous.channel;
    let broken_session_chain = previous_is_final
        && current.previous_session_id.as_deref() != Some(previous.session_id.as_str());
    let broken_subsession_chain =
        current.previous_subsession_id.as_deref() != Some(previous.subsession_id.as_str());
    let broken_profile_subsession_counter = current.profile_subsession_counter
        != previous.profile_subsession_counter.wrapping_add(1);
    let broken_subsession_counter = if previous_is_final {
        current.subsession_counter != 1
    } else {
        current.subsession_counter != previous.subsession_counter.wrapping_add(1)
    };

    // Old builds and channel switches are expected discontinuities.
    let is_broken = !current.is_from_old_build
        && !previous.is_from_old_build
        && !channel_switching
        && (broken_session_chain
            || broken_subsession_chain
            || broken_profile_subsession_counter
            || broken_subsession_counter);

    ChainChecks {
        channel_switching,
        broken_session_chain,
        broken_subsession_chain,
        broken_profile_subsession_counter,
        broken_subsession_counter,
        is_broken,
    }
}

pub fn summarize_chain(fragments: &[AnnotatedFragment]) -> ChainSummary {
    let broken_ping_ids: Vec<String> = fragments
        .iter()
        .filter(|fragment| fragment.is_broken())
        .map(|fragment| fragment.fragment.ping_id.clone())
        .collect();

    ChainSummary {
        fragment_count: fragments.len(),
        broken_count: broken_ping_ids.len(),
        broken_ping_ids,
    }
}
