//! Diagnostics emitted by the contour pipeline: per-stage counts and timings.

pub mod clean;
pub mod timing;

pub use clean::CleanReport;
pub use timing::{StageTiming, TimingBreakdown};
