pub mod models;
pub mod normalize;
pub mod reconcile;
pub mod settings;
mod utils;

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::de::DeserializeOwned;

use models::{RawPing, RawV2Payload, ReconciliationReport};
use normalize::{normalize_v2, normalize_v4, parse_archive, parse_datetime};
use reconcile::{reconcile, ReconcileConfig};
use settings::SettingsStore;

/// Compare exported V2 daily data against archived V4 pings.
#[derive(Debug, Parser)]
#[command(name = "pingcheck", version, about)]
pub struct Args {
    /// Exported V2 payload (JSON)
    #[arg(long)]
    pub v2: PathBuf,

    /// Archived V4 main pings (JSON array)
    #[arg(long)]
    pub v4: PathBuf,

    /// Pending data of the current subsession (JSON ping)
    #[arg(long)]
    pub current: Option<PathBuf>,

    /// Threshold overrides (JSON)
    #[arg(long, env = "PINGCHECK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Reference time for the open session (RFC 3339); defaults to now
    #[arg(long)]
    pub now: Option<String>,
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {what} in {}", path.display()))
}

/// Normalize both raw datasets and reconcile them.
pub fn reconcile_raw(
    raw_v2: &RawV2Payload,
    pings: &[RawPing],
    current: Option<&RawPing>,
    config: &ReconcileConfig,
    now: DateTime<Utc>,
) -> Result<ReconciliationReport> {
    let fragments = normalize_v4(pings, current, config.build_id_cutoff)?;
    let days = normalize_v2(raw_v2, now)?;
    reconcile(&days, &fragments, config, now)
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let store = match &args.settings {
        Some(path) => SettingsStore::load(path)?,
        None => SettingsStore::defaults(),
    };
    if let Some(path) = store.path() {
        log::info!("Using thresholds from {}", path.display());
    }
    let now = match &args.now {
        Some(value) => parse_datetime(value, "--now")?,
        None => Utc::now(),
    };

    let raw_v2: RawV2Payload = read_json(&args.v2, "V2 payload")?;
    let pings = parse_archive(read_json(&args.v4, "V4 pings")?)?;
    let current: Option<RawPing> = args
        .current
        .as_deref()
        .map(|path| read_json(path, "current ping"))
        .transpose()?;

    log::info!(
        "Reconciling {} V2 days against {} V4 pings",
        raw_v2.data.days.len(),
        pings.len()
    );

    let report = reconcile_raw(&raw_v2, &pings, current.as_ref(), store.config(), now)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
