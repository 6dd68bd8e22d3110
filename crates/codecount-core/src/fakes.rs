//! In-memory fakes for the source and presenter traits (testing only)
//!
//! `ScriptedSource` answers from per-repository scripts and can hold a
//! precise response in flight; `RecordingPresenter` records every call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::domain::{
    EstimatedRecord, FetchError, FetchResult, LanguageBytes, PreciseRecord, RepoId,
};
use crate::presenter::Presenter;
use crate::source::StatsSource;

// ---------------------------------------------------------------------------
// ScriptedSource
// ---------------------------------------------------------------------------

/// Source that replays scripted results. Unscripted repositories get a 404.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    languages: Mutex<HashMap<RepoId, FetchResult<LanguageBytes>>>,
    precise: Mutex<HashMap<RepoId, FetchResult<Vec<PreciseRecord>>>>,
    gates: Mutex<HashMap<RepoId, oneshot::Receiver<()>>>,
    language_calls: AtomicUsize,
    precise_calls: AtomicUsize,
}

/// Holds one precise response until released or dropped.
#[derive(Debug)]
pub struct PreciseGate {
    release: oneshot::Sender<()>,
}

impl PreciseGate {
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_languages(&self, repo: &RepoId, result: FetchResult<LanguageBytes>) {
        self.languages.lock().unwrap_or_else(PoisonError::into_inner).insert(repo.clone(), result);
    }

    pub fn set_precise(&self, repo: &RepoId, result: FetchResult<Vec<PreciseRecord>>) {
        self.precise.lock().unwrap_or_else(PoisonError::into_inner).insert(repo.clone(), result);
    }

    /// Make the next precise fetch for `repo` wait for the returned gate.
    pub fn hold_precise(&self, repo: &RepoId) -> PreciseGate {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).insert(repo.clone(), rx);
        PreciseGate { release: tx }
    }

    pub fn language_calls(&self) -> usize {
        self.language_calls.load(Ordering::SeqCst)
    }

    pub fn precise_calls(&self) -> usize {
        self.precise_calls.load(Ordering::SeqCst)
    }

    /// Yield until at least `n` precise fetches have been issued.
    pub async fn wait_for_precise_calls(&self, n: usize) {
        while self.precise_calls() < n {
            tokio::task::yield_now().await;
        }
    }

    fn not_scripted(repo: &RepoId) -> FetchError {
        FetchError::status(404, &format!("no script for {repo}"))
    }
}

#[async_trait]
impl StatsSource for ScriptedSource {
    async fn fetch_languages(&self, repo: &RepoId) -> FetchResult<LanguageBytes> {
        self.language_calls.fetch_add(1, Ordering::SeqCst);
        let languages = self.languages.lock().unwrap_or_else(PoisonError::into_inner);
        languages
            .get(repo)
            .cloned()
            .unwrap_or_else(|| Err(Self::not_scripted(repo)))
    }

    async fn fetch_precise(&self, repo: &RepoId) -> FetchResult<Vec<PreciseRecord>> {
        let gate = self.gates.lock().unwrap_or_else(PoisonError::into_inner).remove(repo);
        self.precise_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = gate {
            // A dropped gate releases as well.
            let _ = gate.await;
        }
        let precise = self.precise.lock().unwrap_or_else(PoisonError::into_inner);
        precise
            .get(repo)
            .cloned()
            .unwrap_or_else(|| Err(Self::not_scripted(repo)))
    }
}

// ---------------------------------------------------------------------------
// RecordingPresenter
// ---------------------------------------------------------------------------

/// One presenter entry-point invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Estimate {
        ranked: Vec<EstimatedRecord>,
        total: u64,
    },
    Precise {
        ranked: Vec<PreciseRecord>,
        total: Option<PreciseRecord>,
    },
    MarkNonAuthoritative,
    Error(String),
}

/// Presenter that records calls in order.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: PresenterCall) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn render_estimate(&self, ranked: &[EstimatedRecord], total: u64) {
        self.record(PresenterCall::Estimate {
            ranked: ranked.to_vec(),
            total,
        });
    }

    fn render_precise(&self, ranked: &[PreciseRecord], total: Option<&PreciseRecord>) {
        self.record(PresenterCall::Precise {
            ranked: ranked.to_vec(),
            total: total.cloned(),
        });
    }

    fn mark_non_authoritative(&self) {
        self.record(PresenterCall::MarkNonAuthoritative);
    }

    fn render_error(&self, message: &str) {
        self.record(PresenterCall::Error(message.to_string()));
    }
}
