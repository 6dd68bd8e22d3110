//! Structured observability hooks for the resolution lifecycle.
//!
//! Each function emits one event with an `event = "..."` field so log
//! pipelines can filter on it. Events are emitted at `info!` unless noted;
//! set `RUST_LOG` to adjust.

use tracing::{debug, info, warn};

use crate::domain::{FetchError, RepoId, ResolveError};
use crate::pipeline::{ResolutionEvent, ResolutionState};

/// Span covering one resolution instance, tagged with its generation token.
///
/// Resolutions suspend at every fetch, so callers instrument the future with
/// this span rather than entering it.
pub fn resolution_span(generation: u64, repo: &RepoId) -> tracing::Span {
    tracing::info_span!("codecount.resolution", generation = generation, repo = %repo)
}

/// Emit event: a resolution for `repo` started.
pub fn emit_resolution_started(generation: u64, repo: &RepoId) {
    info!(event = "resolution.started", generation = generation, repo = %repo);
}

/// Emit event: the page was not resolved (debug level).
pub fn emit_resolution_skipped(generation: u64, url: &str, reason: &ResolveError) {
    debug!(
        event = "resolution.skipped",
        generation = generation,
        url = %url,
        reason = %reason,
    );
}

/// Emit event: the state machine moved.
pub fn emit_state_changed(generation: u64, from: ResolutionState, to: ResolutionState) {
    info!(
        event = "resolution.state_changed",
        generation = generation,
        from = %from,
        to = %to,
    );
}

/// Emit event: a result from a superseded resolution was dropped.
pub fn emit_stale_discarded(generation: u64, current: u64, on: ResolutionEvent) {
    info!(
        event = "resolution.stale_discarded",
        generation = generation,
        current_generation = current,
        on = ?on,
    );
}

/// Emit event: a source request failed (warning level).
///
/// The body excerpt is diagnostic only.
pub fn emit_fetch_failed(generation: u64, source: &str, repo: &RepoId, error: &FetchError) {
    warn!(
        event = "source.fetch_failed",
        generation = generation,
        source = source,
        repo = %repo,
        status = error.status_code(),
        excerpt = error.excerpt(),
        error = %error,
    );
}
