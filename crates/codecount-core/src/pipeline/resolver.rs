//! Two-stage resolution: fast estimate first, precise counts in the background.
//!
//! Every navigation bumps a generation counter. A [`Resolution`] remembers
//! the generation it was started with and checks it again after each
//! suspension; if a newer navigation has happened in the meantime its
//! results are dropped without touching the view. The network request
//! itself is never cancelled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::Instrument;

use crate::domain::{PageFilter, RepoId, ResolveError};
use crate::estimator::{estimate, total_lines};
use crate::metrics::METRICS;
use crate::normalize::normalize;
use crate::obs;
use crate::pipeline::state::{
    transition, InvalidTransition, ResolutionEvent, ResolutionState, Snapshot,
};
use crate::presenter::{Badge, Presenter, FAILURE_MESSAGE, NO_DATA_MESSAGE};
use crate::source::StatsSource;

/// How a single resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The page is not a resolvable repository page; nothing was presented.
    Skipped(ResolveError),
    /// The resolution reached a settled state.
    Settled {
        state: ResolutionState,
        error: Option<ResolveError>,
    },
    /// A newer navigation took over before this resolution finished.
    Superseded,
    /// The state machine refused an event. Nothing was written or presented
    /// for it; the resolver never produces this for its own event order.
    Rejected(InvalidTransition),
}

impl ResolutionOutcome {
    pub fn state(&self) -> Option<ResolutionState> {
        match self {
            ResolutionOutcome::Settled { state, .. } => Some(*state),
            _ => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ResolutionOutcome::Superseded)
    }
}

#[derive(Debug, Default)]
struct View {
    generation: u64,
    state: ResolutionState,
    snapshot: Option<Snapshot>,
}

enum Rejection {
    Stale,
    Invalid(InvalidTransition),
}

impl From<Rejection> for ResolutionOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Stale => ResolutionOutcome::Superseded,
            Rejection::Invalid(error) => ResolutionOutcome::Rejected(error),
        }
    }
}

fn lock(view: &Mutex<View>) -> MutexGuard<'_, View> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the current state + snapshot pair for one page and starts
/// resolutions on navigation.
pub struct Resolver {
    source: Arc<dyn StatsSource>,
    presenter: Arc<dyn Presenter>,
    filter: PageFilter,
    view: Arc<Mutex<View>>,
}

impl Resolver {
    pub fn new(
        source: Arc<dyn StatsSource>,
        presenter: Arc<dyn Presenter>,
        filter: PageFilter,
    ) -> Self {
        Self {
            source,
            presenter,
            filter,
            view: Arc::new(Mutex::new(View::default())),
        }
    }

    /// Invalidate whatever is in flight and prepare a resolution for `url`.
    ///
    /// The view is reset to `Idle` immediately, even if the resolution is
    /// never run.
    pub fn begin(&self, url: &str) -> Resolution {
        let generation = {
            let mut view = lock(&self.view);
            view.generation += 1;
            view.state = ResolutionState::Idle;
            view.snapshot = None;
            view.generation
        };
        Resolution {
            generation,
            url: url.to_string(),
            target: self.filter.classify(url),
            source: Arc::clone(&self.source),
            presenter: Arc::clone(&self.presenter),
            view: Arc::clone(&self.view),
        }
    }

    /// Navigate to `url` and resolve it to completion.
    pub async fn navigate(&self, url: &str) -> ResolutionOutcome {
        self.begin(url).run().await
    }

    pub fn state(&self) -> ResolutionState {
        lock(&self.view).state
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        lock(&self.view).snapshot.clone()
    }

    /// Generation token of the most recent navigation.
    pub fn generation(&self) -> u64 {
        lock(&self.view).generation
    }

    pub fn filter(&self) -> &PageFilter {
        &self.filter
    }
}

/// One resolution instance, bound to the generation it was started with.
///
/// Owns handles to everything it needs, so it can be spawned.
pub struct Resolution {
    generation: u64,
    url: String,
    target: Result<RepoId, ResolveError>,
    source: Arc<dyn StatsSource>,
    presenter: Arc<dyn Presenter>,
    view: Arc<Mutex<View>>,
}

impl Resolution {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The repository this resolution targets, if the page identifies one.
    pub fn repo(&self) -> Option<&RepoId> {
        self.target.as_ref().ok()
    }

    pub async fn run(self) -> ResolutionOutcome {
        let repo = match &self.target {
            Ok(repo) => repo.clone(),
            Err(reason) => {
                obs::emit_resolution_skipped(self.generation, &self.url, reason);
                return ResolutionOutcome::Skipped(reason.clone());
            }
        };
        let span = obs::resolution_span(self.generation, &repo);
        self.resolve(repo).instrument(span).await
    }

    async fn resolve(self, repo: RepoId) -> ResolutionOutcome {
        obs::emit_resolution_started(self.generation, &repo);
        METRICS.inc_resolutions_started();

        let samples = match self.source.fetch_languages(&repo).await {
            Ok(samples) => samples,
            Err(err) => {
                obs::emit_fetch_failed(self.generation, "languages", &repo, &err);
                let text = FAILURE_MESSAGE;
                return self.settle(
                    ResolutionEvent::FastFailed,
                    |snapshot| *snapshot = Some(Snapshot::Message { text: text.into() }),
                    |p| p.render_error(text),
                    Some(ResolveError::FastSourceUnavailable(err)),
                );
            }
        };

        if samples.is_empty() {
            let text = NO_DATA_MESSAGE;
            return self.settle(
                ResolutionEvent::FastEmpty,
                |snapshot| *snapshot = Some(Snapshot::Message { text: text.into() }),
                |p| p.render_error(text),
                Some(ResolveError::EmptyResult),
            );
        }

        let ranked = estimate(&samples);
        let total = total_lines(&ranked);
        let first_paint = Snapshot::Estimate {
            ranked: ranked.clone(),
            badge: Badge::Loading,
        };
        if let Err(rejection) = self.apply(
            ResolutionEvent::FastReady,
            |snapshot| *snapshot = Some(first_paint),
            |p| p.render_estimate(&ranked, total),
        ) {
            return rejection.into();
        }
        METRICS.inc_estimates_presented();

        match self.source.fetch_precise(&repo).await {
            Ok(records) => {
                let summary = normalize(records);
                let outcome = self.settle(
                    ResolutionEvent::PreciseSucceeded,
                    |snapshot| *snapshot = Some(Snapshot::Precise(summary.clone())),
                    |p| p.render_precise(&summary.ranked, summary.total.as_ref()),
                    None,
                );
                if outcome.state().is_some() {
                    METRICS.inc_precise_presented();
                }
                outcome
            }
            Err(err) => {
                obs::emit_fetch_failed(self.generation, "loc", &repo, &err);
                let outcome = self.settle(
                    ResolutionEvent::PreciseFailed,
                    |snapshot| {
                        if let Some(Snapshot::Estimate { badge, .. }) = snapshot {
                            *badge = Badge::Estimated;
                        }
                    },
                    |p| p.mark_non_authoritative(),
                    Some(ResolveError::PreciseSourceUnavailable(err)),
                );
                if outcome.state().is_some() {
                    METRICS.inc_precise_failures();
                }
                outcome
            }
        }
    }

    fn settle(
        &self,
        event: ResolutionEvent,
        update: impl FnOnce(&mut Option<Snapshot>),
        render: impl FnOnce(&dyn Presenter),
        error: Option<ResolveError>,
    ) -> ResolutionOutcome {
        match self.apply(event, update, render) {
            Ok(state) => ResolutionOutcome::Settled { state, error },
            Err(rejection) => rejection.into(),
        }
    }

    /// Apply `event` if this resolution is still current.
    ///
    /// The generation check, the state write and the presenter call happen
    /// under one lock, so a newer navigation cannot slip in between them.
    fn apply(
        &self,
        event: ResolutionEvent,
        update: impl FnOnce(&mut Option<Snapshot>),
        render: impl FnOnce(&dyn Presenter),
    ) -> Result<ResolutionState, Rejection> {
        let mut view = lock(&self.view);
        if view.generation != self.generation {
            obs::emit_stale_discarded(self.generation, view.generation, event);
            METRICS.inc_stale_discarded();
            return Err(Rejection::Stale);
        }
        let from = view.state;
        let to = transition(from, event).map_err(|err| {
            tracing::error!(generation = self.generation, error = %err, "invalid transition");
            Rejection::Invalid(err)
        })?;
        view.state = to;
        update(&mut view.snapshot);
        render(self.presenter.as_ref());
        obs::emit_state_changed(self.generation, from, to);
        Ok(to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FetchError, LanguageBytes};
    use crate::fakes::{PresenterCall, RecordingPresenter, ScriptedSource};

    fn resolver(source: Arc<ScriptedSource>, presenter: Arc<RecordingPresenter>) -> Resolver {
        Resolver::new(source, presenter, PageFilter::default())
    }

    #[tokio::test]
    async fn test_begin_resets_view_and_bumps_generation() {
        let source = Arc::new(ScriptedSource::new());
        let presenter = Arc::new(RecordingPresenter::new());
        let r = resolver(source, presenter.clone());
        assert_eq!(r.generation(), 0);

        let first = r.begin("https://github.com/a/b");
        let second = r.begin("https://github.com/c/d");
        assert_eq!(first.generation(), 1);
        assert_eq!(second.generation(), 2);
        assert_eq!(r.state(), ResolutionState::Idle);
        assert!(r.snapshot().is_none());
        assert_eq!(second.repo(), Some(&RepoId::new("c", "d")));
        assert!(presenter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_skipped_pages_present_nothing() {
        let source = Arc::new(ScriptedSource::new());
        let presenter = Arc::new(RecordingPresenter::new());
        let r = resolver(source.clone(), presenter.clone());

        let outcome = r.navigate("https://github.com/").await;
        assert!(matches!(outcome, ResolutionOutcome::Skipped(_)));
        let outcome = r.navigate("https://github.com/a/b/issues/1").await;
        assert!(matches!(outcome, ResolutionOutcome::Skipped(_)));

        assert_eq!(source.language_calls(), 0);
        assert!(presenter.calls().is_empty());
        assert_eq!(r.state(), ResolutionState::Idle);
    }

    #[tokio::test]
    async fn test_stale_resolution_is_superseded() {
        let repo = RepoId::new("a", "b");
        let source = Arc::new(ScriptedSource::new());
        source.set_languages(&repo, Ok([("Rust", 450)].into_iter().collect::<LanguageBytes>()));
        source.set_precise(&repo, Err(FetchError::network("unreachable")));
        let presenter = Arc::new(RecordingPresenter::new());
        let r = resolver(source, presenter.clone());

        let stale = r.begin("https://github.com/a/b");
        let _fresh = r.begin("https://github.com/a/b");
        assert!(stale.run().await.is_superseded());
        assert!(presenter.calls().is_empty());
    }

    #[tokio::test]
    async fn test_precise_failure_relabels_snapshot() {
        let repo = RepoId::new("a", "b");
        let source = Arc::new(ScriptedSource::new());
        source.set_languages(&repo, Ok([("Rust", 450)].into_iter().collect::<LanguageBytes>()));
        source.set_precise(&repo, Err(FetchError::status(503, "busy")));
        let presenter = Arc::new(RecordingPresenter::new());
        let r = resolver(source, presenter.clone());

        let outcome = r.navigate("https://github.com/a/b").await;
        assert_eq!(outcome.state(), Some(ResolutionState::PreciseFailed));
        assert_eq!(r.snapshot().and_then(|s| s.badge()), Some(Badge::Estimated));
        assert_eq!(
            presenter.calls().last(),
            Some(&PresenterCall::MarkNonAuthoritative)
        );
    }

    #[test]
    fn test_rejected_outcome_is_neither_settled_nor_superseded() {
        let rejected: ResolutionOutcome = Rejection::Invalid(InvalidTransition {
            from: ResolutionState::NoData,
            event: ResolutionEvent::PreciseSucceeded,
        })
        .into();
        assert!(matches!(rejected, ResolutionOutcome::Rejected(_)));
        assert_eq!(rejected.state(), None);
        assert!(!rejected.is_superseded());

        let stale: ResolutionOutcome = Rejection::Stale.into();
        assert!(stale.is_superseded());
    }
}
