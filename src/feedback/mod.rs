//! Deterministic analysis text from utterance scores.

pub mod analysis;
pub mod bands;

pub use analysis::render_analysis;
pub use bands::{describe, describe_or_sentinel, Band, Metric, OUT_OF_RANGE};
