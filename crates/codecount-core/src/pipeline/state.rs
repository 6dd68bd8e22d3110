//! Resolution state machine and the snapshot it publishes.

use serde::{Deserialize, Serialize};

use crate::domain::EstimatedRecord;
use crate::estimator::total_lines;
use crate::normalize::PreciseSummary;
use crate::presenter::Badge;

/// Where one page view's resolution currently stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    #[default]
    Idle,
    EstimatedOnly,
    PreciseReady,
    PreciseFailed,
    NoData,
    Failed,
}

impl ResolutionState {
    /// No further event applies until the next navigation.
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            ResolutionState::PreciseReady
                | ResolutionState::PreciseFailed
                | ResolutionState::NoData
                | ResolutionState::Failed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionState::Idle => "idle",
            ResolutionState::EstimatedOnly => "estimated_only",
            ResolutionState::PreciseReady => "precise_ready",
            ResolutionState::PreciseFailed => "precise_failed",
            ResolutionState::NoData => "no_data",
            ResolutionState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source outcomes that drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionEvent {
    FastEmpty,
    FastFailed,
    FastReady,
    PreciseSucceeded,
    PreciseFailed,
}

/// An event arrived in a state it does not apply to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event {event:?} does not apply in state {from}")]
pub struct InvalidTransition {
    pub from: ResolutionState,
    pub event: ResolutionEvent,
}

/// The transition table.
pub fn transition(
    from: ResolutionState,
    event: ResolutionEvent,
) -> Result<ResolutionState, InvalidTransition> {
    use ResolutionEvent as E;
    use ResolutionState as S;

    match (from, event) {
        (S::Idle, E::FastEmpty) => Ok(S::NoData),
        (S::Idle, E::FastFailed) => Ok(S::Failed),
        (S::Idle, E::FastReady) => Ok(S::EstimatedOnly),
        (S::EstimatedOnly, E::PreciseSucceeded) => Ok(S::PreciseReady),
        (S::EstimatedOnly, E::PreciseFailed) => Ok(S::PreciseFailed),
        (from, event) => Err(InvalidTransition { from, event }),
    }
}

/// The most recent view handed to the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    Estimate {
        ranked: Vec<EstimatedRecord>,
        badge: Badge,
    },
    Precise(PreciseSummary),
    Message {
        text: String,
    },
}

impl Snapshot {
    /// Total estimated lines, recomputed from the records.
    pub fn estimated_total(&self) -> Option<u64> {
        match self {
            Snapshot::Estimate { ranked, .. } => Some(total_lines(ranked)),
            _ => None,
        }
    }

    pub fn badge(&self) -> Option<Badge> {
        match self {
            Snapshot::Estimate { badge, .. } => Some(*badge),
            Snapshot::Precise(_) => Some(Badge::Precise),
            Snapshot::Message { .. } => None,
        }
    }
}
