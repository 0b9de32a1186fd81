pub mod accumulate;
pub mod chain;
pub mod config;
pub mod cutoff;
pub mod default_browser;
pub mod engine;
pub mod matchup;
pub mod tolerance;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ReconcileConfig, TimeTolerances};
pub use engine::reconcile;
