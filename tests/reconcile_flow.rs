use chrono::{DateTime, NaiveDate, Utc};
use pingcheck_lib::models::{RawPing, RawV2Payload};
use pingcheck_lib::reconcile::ReconcileConfig;
use pingcheck_lib::normalize::parse_archive;
use pingcheck_lib::reconcile_raw;
use serde_json::{json, Value};

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2023-01-02T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn day(date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, date).unwrap()
}

fn v2_payload() -> RawV2Payload {
    serde_json::from_value(json!({
        "data": {
            "days": {
                "2023-01-01": {
                    "org.mozilla.searches.counts": {"_v": 4, "google.urlbar": 2},
                    "org.mozilla.appInfo.appinfo": {"isDefaultBrowser": 1},
                    "org.mozilla.appSessions.previous": {"cleanTotalTime": [100, 200]}
                }
            },
            "last": {"org.mozilla.appSessions.current": {"totalTime": 31}}
        }
    }))
    .unwrap()
}

#[allow(clippy::too_many_arguments)]
fn ping(
    id: &str,
    reason: &str,
    created: &str,
    session: &str,
    previous_session: Option<&str>,
    previous_subsession: Option<&str>,
    profile_counter: u64,
    total_time: u64,
) -> RawPing {
    serde_json::from_value(json!({
        "id": id,
        "type": "main",
        "creationDate": created,
        "application": {"channel": "release", "buildId": "20230101000000", "version": "109.0"},
        "payload": {
            "info": {
                "reason": reason,
                "sessionId": session,
                "subsessionId": format!("{session}-1"),
                "previousSessionId": previous_session,
                "previousSubsessionId": previous_subsession,
                "profileSubsessionCounter": profile_counter,
                "subsessionCounter": 1,
                "sessionLength": total_time,
                "subsessionLength": total_time
            },
            "simpleMeasurements": {"totalTime": total_time},
            "keyedHistograms": {"SEARCH_COUNTS": {"google.urlbar": {"sum": 1}}}
        },
        "environment": {"settings": {"isDefaultBrowser": true}}
    }))
    .unwrap()
}

fn archived() -> Vec<RawPing> {
    vec![ping("p1", "shutdown", "2023-01-01T12:00:00Z", "s1", None, None, 1, 101)]
}

fn current() -> RawPing {
    ping(
        "current",
        "gather-subsession-payload",
        "2023-01-02T08:00:00Z",
        "s2",
        Some("s1"),
        Some("s1-1"),
        2,
        30,
    )
}

#[test]
fn reconciles_raw_exports() {
    let report = reconcile_raw(
        &v2_payload(),
        &archived(),
        Some(&current()),
        &ReconcileConfig::default(),
        now(),
    )
    .unwrap();

    assert_eq!(report.cutoff, None);
    assert_eq!(report.chain.fragment_count, 2);
    assert_eq!(report.chain.broken_count, 0);

    // 100 pairs with the 101s session, 200 has no partner.
    let first_day = &report.matchup.sessions[&day(1)];
    assert_eq!(first_day.len(), 2);
    assert_eq!(first_day[0].total_time_v2, Some(100));
    assert_eq!(first_day[0].total_time_v4, Some(101));
    assert!(!first_day[0].broken);
    assert_eq!(first_day[1].total_time_v2, Some(200));
    assert!(first_day[1].broken);

    // The open session shows up in both systems on the reference day.
    let today = &report.matchup.sessions[&day(2)];
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].session_id.as_deref(), Some("s2"));
    assert!(!today[0].broken);

    assert_eq!(report.matchup.missing_in_v4_count, 1);
    assert_eq!(report.matchup.missing_in_v2_count, 0);
    assert_eq!(report.matchup.matched_session_ids.len(), 2);

    assert!(!report.defaults.historically_broken);
    assert_eq!(report.defaults.current.v4, Some(true));

    let google = report
        .search_counts
        .iter()
        .find(|row| row.label == "search: google.urlbar")
        .unwrap();
    assert_eq!((google.v2, google.v4), (2, 2));
    assert!(!google.comparison.broken);
}

#[test]
fn broken_chain_is_reported() {
    // The new session forgets to point back at s1.
    let mut next = current();
    next.payload.info.previous_session_id = Some("lost".to_string());

    let report = reconcile_raw(
        &v2_payload(),
        &archived(),
        Some(&next),
        &ReconcileConfig::default(),
        now(),
    )
    .unwrap();

    assert_eq!(report.chain.broken_count, 1);
    assert_eq!(report.chain.broken_ping_ids, vec!["current".to_string()]);
    let checks = report.fragments[1].checks.unwrap();
    assert!(checks.broken_session_chain);
    assert!(!checks.broken_subsession_chain);
}

#[test]
fn report_serializes_for_presentation() {
    let report = reconcile_raw(
        &v2_payload(),
        &archived(),
        Some(&current()),
        &ReconcileConfig::default(),
        now(),
    )
    .unwrap();

    let value: Value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["matchup"]["missingInV4Count"], json!(1));
    assert_eq!(value["matchup"]["totals"]["totalTimes"], json!([331, 131]));
    assert_eq!(value["fragments"][0]["pingId"], json!("p1"));
    assert_eq!(value["fragments"][0]["reason"], json!("shutdown"));
    assert!(value["fragments"][0]["checks"].is_null());
    assert!(value["matchup"]["sessions"]["2023-01-01"].is_array());
}

#[test]
fn non_main_pings_in_archive_are_ignored() {
    let mut archive: Vec<Value> = archived()
        .iter()
        .map(|ping| serde_json::to_value(ping).unwrap())
        .collect();
    archive.push(json!({
        "id": "crash-1",
        "type": "crash",
        "creationDate": "2023-01-01T13:00:00Z",
        "payload": {"crashDate": "2023-01-01", "processType": "content"}
    }));

    let pings = parse_archive(archive).unwrap();
    let report = reconcile_raw(
        &v2_payload(),
        &pings,
        Some(&current()),
        &ReconcileConfig::default(),
        now(),
    )
    .unwrap();

    assert_eq!(report.chain.fragment_count, 2);
    assert_eq!(report.chain.broken_count, 0);
}
