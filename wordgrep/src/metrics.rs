use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::extract::DocumentFormat;

/// Run counters shared by every worker of a grep run
#[derive(Debug, Clone)]
pub struct GrepMetrics {
    files_processed: Arc<AtomicU64>,
    doc_extractions: Arc<AtomicU64>,
    docx_extractions: Arc<AtomicU64>,
    unsupported_files: Arc<AtomicU64>,
    extraction_failures: Arc<AtomicU64>,
    format_fallbacks: Arc<AtomicU64>,
    chars_extracted: Arc<AtomicU64>,
}

impl GrepMetrics {
    /// Creates a new GrepMetrics instance
    pub fn new() -> Self {
        Self {
            files_processed: Arc::new(AtomicU64::new(0)),
            doc_extractions: Arc::new(AtomicU64::new(0)),
            docx_extractions: Arc::new(AtomicU64::new(0)),
            unsupported_files: Arc::new(AtomicU64::new(0)),
            extraction_failures: Arc::new(AtomicU64::new(0)),
            format_fallbacks: Arc::new(AtomicU64::new(0)),
            chars_extracted: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_file_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one extraction attempt under `format`
    pub fn record_extraction(&self, format: DocumentFormat) {
        match format {
            DocumentFormat::Doc => self.doc_extractions.fetch_add(1, Ordering::Relaxed),
            DocumentFormat::Docx => self.docx_extractions.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn record_unsupported(&self) {
        self.unsupported_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.format_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_chars(&self, chars: u64) {
        self.chars_extracted.fetch_add(chars, Ordering::Relaxed);
    }

    /// Gets a snapshot of the counters
    pub fn get_stats(&self) -> GrepStats {
        GrepStats {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            doc_extractions: self.doc_extractions.load(Ordering::Relaxed),
            docx_extractions: self.docx_extractions.load(Ordering::Relaxed),
            unsupported_files: self.unsupported_files.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            format_fallbacks: self.format_fallbacks.load(Ordering::Relaxed),
            chars_extracted: self.chars_extracted.load(Ordering::Relaxed),
        }
    }

    /// Logs the counters at info level
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Grep stats:\n\
             Files processed: {}\n\
             Extractions (doc/docx): {}/{}\n\
             Unsupported files: {}\n\
             Extraction failures: {}\n\
             Format fallbacks: {}\n\
             Characters extracted: {}",
            stats.files_processed,
            stats.doc_extractions,
            stats.docx_extractions,
            stats.unsupported_files,
            stats.extraction_failures,
            stats.format_fallbacks,
            stats.chars_extracted
        );
    }
}

impl Default for GrepMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`GrepMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrepStats {
    pub files_processed: u64,
    pub doc_extractions: u64,
    pub docx_extractions: u64,
    pub unsupported_files: u64,
    pub extraction_failures: u64,
    pub format_fallbacks: u64,
    pub chars_extracted: u64,
}
