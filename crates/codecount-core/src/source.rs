//! The two statistics sources the pipeline reads from.

use async_trait::async_trait;

use crate::domain::{FetchResult, LanguageBytes, PreciseRecord, RepoId};

/// Fetches per-language statistics for a repository.
///
/// Implementations must not retry; a single failure is final for the
/// resolution that issued the request.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Fast, always-available byte counts per language.
    async fn fetch_languages(&self, repo: &RepoId) -> FetchResult<LanguageBytes>;

    /// Slower, precise line counts per language, including a `Total` row
    /// when the source provides one.
    async fn fetch_precise(&self, repo: &RepoId) -> FetchResult<Vec<PreciseRecord>>;
}
