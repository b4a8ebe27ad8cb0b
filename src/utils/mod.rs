//! Metric and optimization utilities.

pub mod metrics;
pub mod optimization;

pub use metrics::{evaluate, AccuracyMetrics};
pub use optimization::{minimize, SimplexConfig, SimplexOutcome};
