//! Terminal presenters: a human-readable text block or one JSON object
//! per presenter call.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use codecount_core::format::{
    estimate_headline, estimated_row_value, format_count, more_languages, precise_headline,
    precise_meta, precise_row_meta, MAX_ROWS,
};
use codecount_core::{Badge, EstimatedRecord, PreciseRecord, Presenter};
use serde_json::{json, Value};
use tracing::warn;

/// Writes a text block for each presenter call.
pub struct TextPresenter<W: Write + Send> {
    out: Mutex<W>,
    /// Headline of the estimate on screen, reprinted when it is relabeled.
    last_estimate: Mutex<Option<String>>,
}

impl<W: Write + Send> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            last_estimate: Mutex::new(None),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, block: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(block.as_bytes()).and_then(|_| out.flush()) {
            warn!(error = %e, "failed to write output");
        }
    }

    fn remember_estimate(&self, headline: Option<String>) {
        *self
            .last_estimate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = headline;
    }
}

impl<W: Write + Send> Presenter for TextPresenter<W> {
    fn render_estimate(&self, ranked: &[EstimatedRecord], total: u64) {
        let headline = estimate_headline(total);
        let mut block = format!("{headline} [{}]\n", Badge::Loading);
        for record in ranked.iter().take(MAX_ROWS) {
            block.push_str(&format!(
                "  {:<16} {:>10}\n",
                record.language,
                estimated_row_value(record.lines)
            ));
        }
        if let Some(more) = more_languages(ranked.len()) {
            block.push_str(&format!("  {more}\n"));
        }
        self.remember_estimate(Some(headline));
        self.emit(&block);
    }

    fn render_precise(&self, ranked: &[PreciseRecord], total: Option<&PreciseRecord>) {
        let mut block = String::new();
        match total {
            Some(total) => {
                block.push_str(&format!("{} [{}]\n", precise_headline(total), Badge::Precise));
                block.push_str(&format!("{}\n", precise_meta(total)));
            }
            None => block.push_str(&format!("[{}]\n", Badge::Precise)),
        }
        for record in ranked.iter().take(MAX_ROWS) {
            block.push_str(&format!(
                "  {:<16} {:>10}  ({})\n",
                record.language,
                format_count(record.lines_of_code),
                precise_row_meta(record)
            ));
        }
        if let Some(more) = more_languages(ranked.len()) {
            block.push_str(&format!("  {more}\n"));
        }
        self.remember_estimate(None);
        self.emit(&block);
    }

    fn mark_non_authoritative(&self) {
        let headline = self
            .last_estimate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match headline {
            Some(headline) => self.emit(&format!("{headline} [{}]\n", Badge::Estimated)),
            None => self.emit(&format!("[{}]\n", Badge::Estimated)),
        }
    }

    fn render_error(&self, message: &str) {
        self.remember_estimate(None);
        self.emit(&format!("{message}\n"));
    }
}

/// Writes one JSON line per presenter call.
pub struct JsonPresenter<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: &str, mut body: Value) {
        if let Value::Object(map) = &mut body {
            map.insert("event".to_string(), Value::from(event));
            map.insert("timestamp".to_string(), Value::from(Utc::now().to_rfc3339()));
        }
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let written = serde_json::to_writer(&mut *out, &body)
            .map_err(std::io::Error::from)
            .and_then(|_| out.write_all(b"\n"))
            .and_then(|_| out.flush());
        if let Err(e) = written {
            warn!(error = %e, event, "failed to write output");
        }
    }
}

impl<W: Write + Send> Presenter for JsonPresenter<W> {
    fn render_estimate(&self, ranked: &[EstimatedRecord], total: u64) {
        self.emit(
            "estimate",
            json!({ "badge": Badge::Loading, "total": total, "languages": ranked }),
        );
    }

    fn render_precise(&self, ranked: &[PreciseRecord], total: Option<&PreciseRecord>) {
        self.emit(
            "precise",
            json!({ "badge": Badge::Precise, "total": total, "languages": ranked }),
        );
    }

    fn mark_non_authoritative(&self) {
        self.emit("non_authoritative", json!({ "badge": Badge::Estimated }));
    }

    fn render_error(&self, message: &str) {
        self.emit("message", json!({ "text": message }));
    }
}
