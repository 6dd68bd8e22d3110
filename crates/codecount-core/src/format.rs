//! Number and label formatting shared by presenters.

use crate::domain::PreciseRecord;

/// Language rows shown before the remainder is collapsed.
pub const MAX_ROWS: usize = 8;

/// Format a count with `,` thousands separators.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `≈110 lines`
pub fn estimate_headline(total: u64) -> String {
    format!("≈{} lines", format_count(total))
}

/// `~100`
pub fn estimated_row_value(lines: u64) -> String {
    format!("~{}", format_count(lines))
}

/// `12,345 lines of code`
pub fn precise_headline(total: &PreciseRecord) -> String {
    format!("{} lines of code", format_count(total.lines_of_code))
}

/// `1,234 comments · 56 blanks · 7 files`
pub fn precise_meta(total: &PreciseRecord) -> String {
    format!(
        "{} comments · {} blanks · {} files",
        format_count(total.comments),
        format_count(total.blanks),
        format_count(total.files)
    )
}

/// `1,234 comments · 56 blanks`, the per-language detail.
pub fn precise_row_meta(record: &PreciseRecord) -> String {
    format!(
        "{} comments · {} blanks",
        format_count(record.comments),
        format_count(record.blanks)
    )
}

/// Footer for rows beyond [`MAX_ROWS`], if there are any.
pub fn more_languages(count: usize) -> Option<String> {
    let hidden = count.checked_sub(MAX_ROWS).filter(|n| *n > 0)?;
    Some(format!("...and {hidden} more languages"))
}
