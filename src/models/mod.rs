pub mod matchup;
pub mod raw;
pub mod report;
pub mod v2;
pub mod v4;

pub use matchup::{MatchupEntry, MatchupTotals, SessionMatchup, TimePair};
pub use raw::{RawPing, RawV2Payload};
pub use report::{
    ChainSummary, Comparison, CurrentDefaults, DefaultBrowserCheck, MetricComparison, Ratio,
    ReconciliationReport, V2Accumulation, V4Accumulation,
};
pub use v2::{DefaultBrowserState, V2DailyRecord};
pub use v4::{AnnotatedFragment, ChainChecks, Reason, V4Fragment, V4Session};
