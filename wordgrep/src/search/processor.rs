use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

use super::snippet;
use crate::errors::SearchResult;
use crate::extract::{DocumentExtractor, TextExtractor};
use crate::metrics::GrepMetrics;
use crate::results::FileResult;

/// Extracts and searches one document at a time. Shared by reference across
/// all workers of a run.
#[derive(Clone)]
pub struct FileProcessor {
    pattern: String,
    context_radius: usize,
    extractor: Arc<dyn TextExtractor>,
    metrics: GrepMetrics,
}

impl FileProcessor {
    /// Creates a processor backed by the default [`DocumentExtractor`]
    pub fn new(pattern: impl Into<String>, context_radius: usize) -> Self {
        let metrics = GrepMetrics::new();
        let extractor = Arc::new(DocumentExtractor::with_metrics(metrics.clone()));
        Self {
            pattern: pattern.into(),
            context_radius,
            extractor,
            metrics,
        }
    }

    /// Creates a processor with a caller-supplied extractor
    pub fn with_extractor(
        pattern: impl Into<String>,
        context_radius: usize,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            context_radius,
            extractor,
            metrics: GrepMetrics::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Gets the run metrics
    pub fn metrics(&self) -> &GrepMetrics {
        &self.metrics
    }

    /// Extracts the document at `path` and returns its matches.
    ///
    /// Extraction failures are returned as errors and counted; the caller
    /// decides how to report them.
    pub fn process_file(&self, path: &Path) -> SearchResult<FileResult> {
        trace!("Processing file: {}", path.display());
        self.metrics.record_file_processed();

        let text = self.extractor.extract(path).map_err(|e| {
            self.metrics.record_failure();
            e
        })?;
        self.metrics.record_chars(text.chars().count() as u64);

        let matches = snippet::search_with_radius(&text, &self.pattern, self.context_radius);
        trace!("Found {} matches in {}", matches.len(), path.display());
        Ok(FileResult::new(path, matches))
    }
}

impl fmt::Debug for FileProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileProcessor")
            .field("pattern", &self.pattern)
            .field("context_radius", &self.context_radius)
            .finish_non_exhaustive()
    }
}
