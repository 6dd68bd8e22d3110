//! Rendering boundary of the pipeline.
//!
//! The pipeline hands a [`Presenter`] read-only snapshots and calls exactly
//! one entry point per state transition. Presenters never mutate the data
//! and must not call back into the [`Resolver`](crate::pipeline::Resolver)
//! that drives them.

use serde::{Deserialize, Serialize};

use crate::domain::{EstimatedRecord, PreciseRecord};

/// Shown when the fast source reports zero languages.
pub const NO_DATA_MESSAGE: &str = "No code statistics available";

/// Shown when the fast source cannot be read.
pub const FAILURE_MESSAGE: &str = "Failed to load code statistics";

/// Sink for resolved statistics.
pub trait Presenter: Send + Sync {
    /// First paint: the byte-based estimate while precise data loads.
    fn render_estimate(&self, ranked: &[EstimatedRecord], total: u64);

    /// Replace the estimate with precise data.
    fn render_precise(&self, ranked: &[PreciseRecord], total: Option<&PreciseRecord>);

    /// Precise data will not arrive; keep the estimate but label it as such.
    fn mark_non_authoritative(&self);

    /// Show a user-facing message instead of statistics.
    fn render_error(&self, message: &str);
}

/// Authority label shown next to the statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    /// Estimate shown, precise data still loading.
    Loading,
    /// Estimate is final for this page view.
    Estimated,
    /// Precise data shown.
    Precise,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Loading => "loading",
            Badge::Estimated => "estimated",
            Badge::Precise => "precise",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
