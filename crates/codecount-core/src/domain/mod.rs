//! Domain model for CodeCount.
//!
//! Records exchanged with the two statistics sources, repository identity,
//! and the error taxonomy of a resolution.

pub mod error;
pub mod records;
pub mod repo;

pub use error::{excerpt, FetchError, ResolveError, EXCERPT_CHARS};
pub use records::{
    count_from_json, EstimatedRecord, LanguageByteSample, LanguageBytes, PreciseRecord,
    TOTAL_LANGUAGE,
};
pub use repo::{PageFilter, RepoId, DEFAULT_EXCLUDED_SEGMENTS, DEFAULT_HOST};

/// Result type for source fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;
