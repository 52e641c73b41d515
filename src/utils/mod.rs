//! Utility functions for record processing.
//!
//! This module provides:
//! - Timing metrics for performance analysis

pub mod timing;

pub use timing::{duration_to_us, TargetTimingMetrics, TimingStats};
