//! Global atomic counters for resolution activity.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. before the process exits).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    resolutions_started: AtomicU64,
    estimates_presented: AtomicU64,
    precise_presented: AtomicU64,
    precise_failures: AtomicU64,
    stale_discarded: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            resolutions_started: AtomicU64::new(0),
            estimates_presented: AtomicU64::new(0),
            precise_presented: AtomicU64::new(0),
            precise_failures: AtomicU64::new(0),
            stale_discarded: AtomicU64::new(0),
        }
    }

    pub fn inc_resolutions_started(&self) {
        self.resolutions_started.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "resolutions_started", "counter incremented");
    }

    pub fn inc_estimates_presented(&self) {
        self.estimates_presented.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "estimates_presented", "counter incremented");
    }

    pub fn inc_precise_presented(&self) {
        self.precise_presented.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "precise_presented", "counter incremented");
    }

    pub fn inc_precise_failures(&self) {
        self.precise_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "precise_failures", "counter incremented");
    }

    pub fn inc_stale_discarded(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "stale_discarded", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            resolutions_started = self.resolutions_started(),
            estimates_presented = self.estimates_presented(),
            precise_presented = self.precise_presented(),
            precise_failures = self.precise_failures(),
            stale_discarded = self.stale_discarded(),
        );
    }

    pub fn resolutions_started(&self) -> u64 {
        self.resolutions_started.load(Ordering::Relaxed)
    }

    pub fn estimates_presented(&self) -> u64 {
        self.estimates_presented.load(Ordering::Relaxed)
    }

    pub fn precise_presented(&self) -> u64 {
        self.precise_presented.load(Ordering::Relaxed)
    }

    pub fn precise_failures(&self) -> u64 {
        self.precise_failures.load(Ordering::Relaxed)
    }

    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.resolutions_started.store(0, Ordering::Relaxed);
        self.estimates_presented.store(0, Ordering::Relaxed);
        self.precise_presented.store(0, Ordering::Relaxed);
        self.precise_failures.store(0, Ordering::Relaxed);
        self.stale_discarded.store(0, Ordering::Relaxed);
    }
}
