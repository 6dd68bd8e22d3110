//! CodeCount Core Library
//!
//! Lines-of-code statistics for hosted repository pages, resolved in two
//! stages: a byte-based estimate from the fast languages source, then
//! precise counts from the LOC source when it answers.
//!
//! Re-exports the pieces needed to drive a [`Resolver`] from any host.

pub mod domain;
pub mod estimator;
pub mod fakes;
pub mod format;
pub mod metrics;
pub mod normalize;
pub mod obs;
pub mod pipeline;
pub mod presenter;
pub mod source;
pub mod telemetry;
pub mod wire;

pub use domain::{
    EstimatedRecord, FetchError, FetchResult, LanguageByteSample, LanguageBytes, PageFilter,
    PreciseRecord, RepoId, ResolveError, TOTAL_LANGUAGE,
};

pub use estimator::{bytes_per_line, bytes_to_lines, estimate, total_lines, DEFAULT_BYTES_PER_LINE};
pub use normalize::{normalize, PreciseSummary};
pub use wire::{decode_language_bytes, decode_precise_records};

pub use pipeline::{
    transition, InvalidTransition, Resolution, ResolutionEvent, ResolutionOutcome,
    ResolutionState, Resolver, Snapshot,
};
pub use presenter::{Badge, Presenter, FAILURE_MESSAGE, NO_DATA_MESSAGE};
pub use source::StatsSource;

pub use metrics::METRICS;
pub use obs::{
    emit_fetch_failed, emit_resolution_skipped, emit_resolution_started, emit_stale_discarded,
    emit_state_changed, resolution_span,
};
pub use telemetry::init_tracing;

/// CodeCount version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
