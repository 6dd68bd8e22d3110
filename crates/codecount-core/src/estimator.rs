//! Byte counts → estimated line counts.
//!
//! Each language has an empirically chosen average number of bytes per
//! line. Languages missing from the table use [`DEFAULT_BYTES_PER_LINE`].

use crate::domain::{EstimatedRecord, LanguageBytes};

/// Average bytes per line for languages not in [`BYTES_PER_LINE`].
pub const DEFAULT_BYTES_PER_LINE: u64 = 40;

/// Average bytes per line, keyed by the source's language name (case-sensitive).
pub const BYTES_PER_LINE: &[(&str, u64)] = &[
    ("Python", 30),
    ("JavaScript", 35),
    ("TypeScript", 38),
    ("Java", 50),
    ("Go", 35),
    ("Rust", 45),
    ("C", 40),
    ("C++", 45),
    ("C#", 45),
    ("Ruby", 28),
    ("PHP", 35),
    ("Swift", 40),
    ("Kotlin", 40),
    ("Scala", 35),
    ("HTML", 50),
    ("CSS", 30),
    ("SCSS", 30),
    ("Shell", 35),
    ("Dockerfile", 30),
];

/// Look up the average bytes per line for `language`.
pub fn bytes_per_line(language: &str) -> u64 {
    BYTES_PER_LINE
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, k)| *k)
        .unwrap_or(DEFAULT_BYTES_PER_LINE)
}

/// `round(bytes / k)` with halves rounded up, in integer arithmetic.
pub fn bytes_to_lines(bytes: u64, language: &str) -> u64 {
    let k = bytes_per_line(language);
    bytes.saturating_add(k / 2) / k
}

/// Estimate line counts for every language, ranked by lines descending.
///
/// Ties keep the input encounter order.
pub fn estimate(samples: &LanguageBytes) -> Vec<EstimatedRecord> {
    let mut records: Vec<EstimatedRecord> = samples
        .samples()
        .iter()
        .map(|s| EstimatedRecord {
            language: s.language.clone(),
            bytes: s.bytes,
            lines: bytes_to_lines(s.bytes, &s.language),
        })
        .collect();
    // sort_by is stable
    records.sort_by(|a, b| b.lines.cmp(&a.lines));
    records
}

/// Sum of estimated lines across `records`, saturating at `u64::MAX`.
pub fn total_lines(records: &[EstimatedRecord]) -> u64 {
    records
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.lines))
}
