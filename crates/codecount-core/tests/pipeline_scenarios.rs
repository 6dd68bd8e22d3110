//! End-to-end resolution scenarios against in-memory sources.
//!
//! Covered:
//! - estimate first, precise replaces it
//! - empty fast result shows "no data" and issues no precise fetch
//! - fast failure shows the generic failure message
//! - precise failure keeps the estimate and relabels it
//! - navigation mid-flight discards the stale precise result

use std::sync::Arc;

use codecount_core::fakes::{PresenterCall, RecordingPresenter, ScriptedSource};
use codecount_core::{
    format, Badge, EstimatedRecord, FetchError, LanguageBytes, PageFilter, PreciseRecord,
    RepoId, ResolutionOutcome, ResolutionState, ResolveError, Resolver, Snapshot,
    FAILURE_MESSAGE, NO_DATA_MESSAGE,
};

fn setup() -> (Arc<ScriptedSource>, Arc<RecordingPresenter>, Resolver) {
    let source = Arc::new(ScriptedSource::new());
    let presenter = Arc::new(RecordingPresenter::new());
    let resolver = Resolver::new(source.clone(), presenter.clone(), PageFilter::default());
    (source, presenter, resolver)
}

fn bytes(entries: &[(&str, u64)]) -> LanguageBytes {
    entries.iter().copied().collect()
}

fn precise(language: &str, loc: u64) -> PreciseRecord {
    PreciseRecord {
        language: language.to_string(),
        files: 2,
        lines: loc + 20,
        blanks: 10,
        comments: 10,
        lines_of_code: loc,
    }
}

fn estimated(language: &str, bytes: u64, lines: u64) -> EstimatedRecord {
    EstimatedRecord {
        language: language.to_string(),
        bytes,
        lines,
    }
}

// ---- Estimate, then precise ----

#[tokio::test]
async fn test_estimate_then_precise_replaces_view() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "web");
    source.set_languages(&repo, Ok(bytes(&[("TypeScript", 3800), ("CSS", 300)])));
    source.set_precise(
        &repo,
        Ok(vec![
            precise("CSS", 12),
            precise("Total", 110),
            precise("TypeScript", 98),
        ]),
    );

    let outcome = resolver.navigate("https://github.com/acme/web").await;
    assert_eq!(outcome.state(), Some(ResolutionState::PreciseReady));

    let calls = presenter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        PresenterCall::Estimate {
            ranked: vec![
                estimated("TypeScript", 3800, 100),
                estimated("CSS", 300, 10)
            ],
            total: 110,
        }
    );
    assert_eq!(format::estimate_headline(110), "≈110 lines");
    assert_eq!(
        calls[1],
        PresenterCall::Precise {
            ranked: vec![precise("TypeScript", 98), precise("CSS", 12)],
            total: Some(precise("Total", 110)),
        }
    );

    match resolver.snapshot() {
        Some(Snapshot::Precise(summary)) => assert_eq!(summary.ranked.len(), 2),
        other => panic!("expected precise snapshot, got {other:?}"),
    }
    assert_eq!(source.language_calls(), 1);
    assert_eq!(source.precise_calls(), 1);
}

#[tokio::test]
async fn test_single_language_and_zero_total() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "empty-ish");
    source.set_languages(&repo, Ok(bytes(&[("Rust", 45)])));
    source.set_precise(&repo, Ok(vec![precise("Rust", 0), precise("Total", 0)]));

    resolver
        .navigate("https://github.com/acme/empty-ish")
        .await;

    let calls = presenter.calls();
    assert_eq!(
        calls[0],
        PresenterCall::Estimate {
            ranked: vec![estimated("Rust", 45, 1)],
            total: 1,
        }
    );
    match &calls[1] {
        PresenterCall::Precise { ranked, total } => {
            assert_eq!(ranked.len(), 1);
            assert_eq!(total.as_ref().map(|t| t.lines_of_code), Some(0));
        }
        other => panic!("expected precise call, got {other:?}"),
    }
}

#[tokio::test]
async fn test_precise_without_total_is_still_ready() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "no-total");
    source.set_languages(&repo, Ok(bytes(&[("Go", 350)])));
    source.set_precise(&repo, Ok(vec![precise("Go", 9)]));

    let outcome = resolver.navigate("https://github.com/acme/no-total").await;
    assert_eq!(outcome.state(), Some(ResolutionState::PreciseReady));
    assert_eq!(
        presenter.calls()[1],
        PresenterCall::Precise {
            ranked: vec![precise("Go", 9)],
            total: None,
        }
    );
}

// ---- Fast source outcomes ----

#[tokio::test]
async fn test_empty_fast_result_is_no_data_without_precise_fetch() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "docs");
    source.set_languages(&repo, Ok(LanguageBytes::new()));

    let outcome = resolver.navigate("https://github.com/acme/docs").await;
    assert_eq!(
        outcome,
        ResolutionOutcome::Settled {
            state: ResolutionState::NoData,
            error: Some(ResolveError::EmptyResult),
        }
    );
    assert_eq!(
        presenter.calls(),
        vec![PresenterCall::Error(NO_DATA_MESSAGE.to_string())]
    );
    assert_eq!(source.precise_calls(), 0);
    assert_eq!(resolver.state(), ResolutionState::NoData);
}

#[tokio::test]
async fn test_fast_failure_shows_generic_message() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "private");
    let err = FetchError::status(404, r#"{"message":"Not Found"}"#);
    source.set_languages(&repo, Err(err.clone()));

    let outcome = resolver.navigate("https://github.com/acme/private").await;
    assert_eq!(
        outcome,
        ResolutionOutcome::Settled {
            state: ResolutionState::Failed,
            error: Some(ResolveError::FastSourceUnavailable(err)),
        }
    );
    assert_eq!(
        presenter.calls(),
        vec![PresenterCall::Error(FAILURE_MESSAGE.to_string())]
    );
    assert_eq!(source.precise_calls(), 0);
}

#[tokio::test]
async fn test_malformed_fast_body_routes_through_failure() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "html");
    let err = codecount_core::decode_language_bytes("<html>oops</html>").unwrap_err();
    source.set_languages(&repo, Err(err));

    let outcome = resolver.navigate("https://github.com/acme/html").await;
    assert_eq!(outcome.state(), Some(ResolutionState::Failed));
    // The raw body never reaches the presenter.
    assert_eq!(
        presenter.calls(),
        vec![PresenterCall::Error(FAILURE_MESSAGE.to_string())]
    );
}

// ---- Precise source failure ----

#[tokio::test]
async fn test_precise_503_keeps_estimate_marked_estimated() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "api");
    source.set_languages(&repo, Ok(bytes(&[("Python", 3000)])));
    source.set_precise(&repo, Err(FetchError::status(503, "Service Unavailable")));

    let outcome = resolver.navigate("https://github.com/acme/api").await;
    assert!(matches!(
        outcome,
        ResolutionOutcome::Settled {
            state: ResolutionState::PreciseFailed,
            error: Some(ResolveError::PreciseSourceUnavailable(_)),
        }
    ));

    let calls = presenter.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], PresenterCall::Estimate { total: 100, .. }));
    assert_eq!(calls[1], PresenterCall::MarkNonAuthoritative);

    let snapshot = resolver.snapshot().expect("estimate stays displayed");
    assert_eq!(snapshot.badge(), Some(Badge::Estimated));
    assert_eq!(snapshot.estimated_total(), Some(100));
}

// ---- Navigation mid-flight ----

#[tokio::test]
async fn test_stale_precise_result_does_not_overwrite_new_repo() {
    let (source, presenter, resolver) = setup();
    let repo_a = RepoId::new("acme", "a");
    let repo_b = RepoId::new("acme", "b");
    source.set_languages(&repo_a, Ok(bytes(&[("Rust", 4500)])));
    source.set_precise(&repo_a, Ok(vec![precise("Rust", 999), precise("Total", 999)]));
    source.set_languages(&repo_b, Ok(bytes(&[("Go", 700)])));
    let gate_a = source.hold_precise(&repo_a);
    let gate_b = source.hold_precise(&repo_b);

    let first = resolver.begin("https://github.com/acme/a");
    let task_a = tokio::spawn(first.run());
    source.wait_for_precise_calls(1).await;

    let second = resolver.begin("https://github.com/acme/b");
    assert_eq!(resolver.state(), ResolutionState::Idle);
    let task_b = tokio::spawn(second.run());
    source.wait_for_precise_calls(2).await;

    // Repo B's estimate is on screen while A's precise fetch is still pending.
    assert_eq!(resolver.state(), ResolutionState::EstimatedOnly);
    assert_eq!(resolver.snapshot().and_then(|s| s.estimated_total()), Some(20));

    gate_a.release();
    let outcome_a = task_a.await.unwrap();
    assert!(outcome_a.is_superseded());
    assert_eq!(resolver.state(), ResolutionState::EstimatedOnly);
    assert_eq!(resolver.snapshot().and_then(|s| s.estimated_total()), Some(20));

    // B has no precise script, so it falls back to the estimate.
    gate_b.release();
    let outcome_b = task_b.await.unwrap();
    assert_eq!(outcome_b.state(), Some(ResolutionState::PreciseFailed));

    let calls = presenter.calls();
    assert_eq!(
        calls,
        vec![
            PresenterCall::Estimate {
                ranked: vec![estimated("Rust", 4500, 100)],
                total: 100,
            },
            PresenterCall::Estimate {
                ranked: vec![estimated("Go", 700, 20)],
                total: 20,
            },
            PresenterCall::MarkNonAuthoritative,
        ]
    );
}

#[tokio::test]
async fn test_navigating_to_excluded_page_discards_in_flight_result() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "a");
    source.set_languages(&repo, Ok(bytes(&[("Rust", 4500)])));
    source.set_precise(&repo, Ok(vec![precise("Rust", 1)]));
    let gate = source.hold_precise(&repo);

    let task = tokio::spawn(resolver.begin("https://github.com/acme/a").run());
    source.wait_for_precise_calls(1).await;

    let outcome = resolver.navigate("https://github.com/acme/a/issues").await;
    assert!(matches!(
        outcome,
        ResolutionOutcome::Skipped(ResolveError::ExcludedPage { .. })
    ));
    assert_eq!(resolver.state(), ResolutionState::Idle);
    assert!(resolver.snapshot().is_none());

    gate.release();
    assert!(task.await.unwrap().is_superseded());
    assert_eq!(presenter.calls().len(), 1);
    assert!(resolver.snapshot().is_none());
}

#[tokio::test]
async fn test_repeated_navigation_to_same_repo_resolves_again() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "a");
    source.set_languages(&repo, Ok(bytes(&[("Rust", 450)])));
    source.set_precise(&repo, Ok(vec![precise("Rust", 9)]));

    resolver.navigate("https://github.com/acme/a").await;
    resolver.navigate("https://github.com/acme/a?tab=readme").await;

    assert_eq!(source.language_calls(), 2);
    assert_eq!(presenter.calls().len(), 4);
    assert_eq!(resolver.generation(), 2);
    assert_eq!(resolver.state(), ResolutionState::PreciseReady);
}

#[tokio::test]
async fn test_huge_byte_counts_saturate_instead_of_failing() {
    let (source, presenter, resolver) = setup();
    let repo = RepoId::new("acme", "huge");
    let body = (0..41)
        .map(|i| format!("\"L{i}\": 1e30"))
        .collect::<Vec<_>>()
        .join(",");
    let languages = codecount_core::decode_language_bytes(&format!("{{{body}}}")).unwrap();
    source.set_languages(&repo, Ok(languages));
    source.set_precise(&repo, Err(FetchError::status(503, "busy")));

    let outcome = resolver.navigate("https://github.com/acme/huge").await;
    assert_eq!(outcome.state(), Some(ResolutionState::PreciseFailed));
    assert!(matches!(
        presenter.calls()[0],
        PresenterCall::Estimate { total: u64::MAX, .. }
    ));
    assert_eq!(
        resolver.snapshot().and_then(|s| s.estimated_total()),
        Some(u64::MAX)
    );
}
