use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::raw::RawPing;
use crate::models::{Reason, V4Fragment};
use crate::normalize::parse_datetime;
use crate::{log_info, log_warn};

const ENABLE_LOGS: bool = true;

const MAIN_PING_TYPE: &str = "main";
const SEARCH_COUNTS_HISTOGRAM: &str = "SEARCH_COUNTS";

/// Flatten one raw ping into a fragment.
pub fn extract_fragment(ping: &RawPing, is_from_old_build: bool) -> Result<V4Fragment> {
    let info = &ping.payload.info;
    let search_counts = ping
        .payload
        .keyed_histograms
        .get(SEARCH_COUNTS_HISTOGRAM)
        .map(|histogram| {
            histogram
                .iter()
                .map(|(key, value)| (key.clone(), value.sum))
                .collect()
        })
        .unwrap_or_default();

    Ok(V4Fragment {
        ping_id: ping.id.clone(),
        client_id: ping.client_id.clone(),
        reason: Reason::from(info.reason.as_str()),
        creation_date: parse_datetime(&ping.creation_date, "creationDate")?,
        channel: ping.application.channel.clone(),
        build_id: ping.application.build_id.clone(),
        version: ping.application.version.clone(),
        session_id: info.session_id.clone(),
        subsession_id: info.subsession_id.clone(),
        previous_session_id: info.previous_session_id.clone(),
        previous_subsession_id: info.previous_subsession_id.clone(),
        profile_subsession_counter: info.profile_subsession_counter,
        subsession_counter: info.subsession_counter,
        session_length: info.session_length,
        subsession_length: info.subsession_length,
        total_time: ping.payload.simple_measurements.total_time,
        is_default_browser: ping.environment.settings.is_default_browser,
        search_counts,
        is_from_old_build,
    })
}

/// Parse an exported ping archive, keeping main pings only.
///
/// Crash, deletion and other ping types have unrelated payloads, so they are
/// dropped by `type` before the typed parse. A ping without `type` is main.
pub fn parse_archive(values: Vec<Value>) -> Result<Vec<RawPing>> {
    let total = values.len();
    let pings = values
        .into_iter()
        .filter(|value| ping_type(value) == MAIN_PING_TYPE)
        .map(|value| {
            let id = value.get("id").and_then(Value::as_str).unwrap_or("?").to_string();
            serde_json::from_value::<RawPing>(value)
                .with_context(|| format!("failed to parse main ping '{id}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    if pings.len() < total {
        log_info!("Skipped {} non-main pings in archive", total - pings.len());
    }
    Ok(pings)
}

fn ping_type(value: &Value) -> &str {
    value.get("type").and_then(Value::as_str).unwrap_or(MAIN_PING_TYPE)
}

/// True when the build predates `build_id_cutoff`. Unparseable ids count as new.
pub fn is_old_build(build_id: &str, build_id_cutoff: u64) -> bool {
    match build_id.trim().parse::<u64>() {
        Ok(build_id) => build_id < build_id_cutoff,
        Err(_) => {
            log_warn!("Unparseable build id '{build_id}'; treating as current");
            false
        }
    }
}

/// Normalize archived main pings plus the current session's pending data.
///
/// Pings are ordered by creation date. Leading pings from old builds are
/// dropped; once a newer build has been seen, old-build pings are kept but
/// flagged. The current ping is appended last and is never considered old.
pub fn normalize_v4(
    pings: &[RawPing],
    current: Option<&RawPing>,
    build_id_cutoff: u64,
) -> Result<Vec<V4Fragment>> {
    let mut archived = pings
        .iter()
        .filter(|ping| ping.ping_type == MAIN_PING_TYPE)
        .map(|ping| {
            let is_old = is_old_build(&ping.application.build_id, build_id_cutoff);
            extract_fragment(ping, is_old)
        })
        .collect::<Result<Vec<_>>>()?;
    archived.sort_by_key(|fragment| fragment.creation_date);

    let mut fragments = Vec::with_capacity(archived.len() + 1);
    let mut skipped = 0usize;
    for fragment in archived {
        if fragments.is_empty() && fragment.is_from_old_build {
            skipped += 1;
            continue;
        }
        fragments.push(fragment);
    }
    if skipped > 0 {
        log_info!("Skipped {skipped} leading pings from builds before {build_id_cutoff}");
    }

    if let Some(current) = current {
        fragments.push(extract_fragment(current, false)?);
    }

    Ok(fragments)
}
