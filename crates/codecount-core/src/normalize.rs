//! Precise LOC records → aggregate plus ranked languages.

use serde::{Deserialize, Serialize};

use crate::domain::PreciseRecord;

/// Precise result split into its aggregate row and the ranked languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreciseSummary {
    /// The source's `Total` row, only when it sent one.
    pub total: Option<PreciseRecord>,
    /// Real languages, by `lines_of_code` descending.
    pub ranked: Vec<PreciseRecord>,
}

/// Separate the `Total` row and rank the rest by lines of code.
///
/// If the source sends more than one `Total` row the first is kept and
/// the others are dropped. A missing `Total` is left missing.
pub fn normalize(records: Vec<PreciseRecord>) -> PreciseSummary {
    let mut total = None;
    let mut ranked = Vec::with_capacity(records.len());
    for record in records {
        if record.is_total() {
            if total.is_none() {
                total = Some(record);
            }
        } else {
            ranked.push(record);
        }
    }
    ranked.sort_by(|a, b| b.lines_of_code.cmp(&a.lines_of_code));
    PreciseSummary { total, ranked }
}
