//! Per-language statistics records produced and consumed by the pipeline.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Language name the precise source uses for its aggregate row.
pub const TOTAL_LANGUAGE: &str = "Total";

/// Byte count for one language as reported by the fast source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageByteSample {
    pub language: String,
    pub bytes: u64,
}

/// Ordered language → bytes mapping, unique by language.
///
/// Order is the encounter order of the source response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageBytes {
    samples: Vec<LanguageByteSample>,
}

impl LanguageBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the byte count for a language, keeping its first position.
    pub fn insert(&mut self, language: impl Into<String>, bytes: u64) {
        let language = language.into();
        match self.samples.iter_mut().find(|s| s.language == language) {
            Some(existing) => existing.bytes = bytes,
            None => self.samples.push(LanguageByteSample { language, bytes }),
        }
    }

    pub fn samples(&self) -> &[LanguageByteSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for LanguageBytes {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut out = LanguageBytes::new();
        for (language, bytes) in iter {
            out.insert(language, bytes);
        }
        out
    }
}

/// Estimated line count for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatedRecord {
    pub language: String,
    pub bytes: u64,
    pub lines: u64,
}

/// Precise per-language counts as reported by the LOC source.
///
/// `lines_of_code` is passed through untouched; it is not checked against
/// `lines - blanks - comments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreciseRecord {
    #[serde(default, deserialize_with = "lenient_language")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub files: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub lines: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub blanks: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub lines_of_code: u64,
}

impl PreciseRecord {
    pub fn is_total(&self) -> bool {
        self.language == TOTAL_LANGUAGE
    }
}

/// Coerce an externally supplied count into a `u64`.
///
/// Negative, non-numeric and non-finite values become 0. Fractional values
/// are rounded to the nearest integer, halves up.
pub fn count_from_json(value: &Value) -> u64 {
    if let Some(n) = value.as_u64() {
        return n;
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f > 0.0 => f.round() as u64,
        _ => 0,
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_json(&value))
}

/// A non-string language name (including `null`) becomes `""`.
fn lenient_language<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string).unwrap_or_default())
}
