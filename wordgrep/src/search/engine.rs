use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::processor::FileProcessor;
use super::snippet::DEFAULT_CONTEXT_RADIUS;
use crate::config::GrepConfig;
use crate::errors::{SearchError, SearchResult};
use crate::results::{FileResult, GrepResult};
use crate::scanner::TreeScanner;

/// Greps `files` for `pattern` with the default extractor and context radius
pub fn grep(pattern: &str, files: &[PathBuf]) -> GrepResult {
    let processor = FileProcessor::new(pattern, DEFAULT_CONTEXT_RADIUS);
    grep_files(&processor, files)
}

/// Extracts and searches `files` in parallel.
///
/// Each worker produces its own `FileResult`; the results are merged into the
/// returned `GrepResult` on the calling thread once every worker is done. A
/// file whose extraction fails is logged and contributes nothing.
pub fn grep_files(processor: &FileProcessor, files: &[PathBuf]) -> GrepResult {
    let mut result = GrepResult::new();
    result.files_searched = files.len();

    if processor.pattern().is_empty() {
        debug!("Empty pattern, skipping {} files", files.len());
        return result;
    }

    let file_results: Vec<FileResult> = files
        .par_iter()
        .filter_map(|path| match processor.process_file(path) {
            Ok(file_result) => Some(file_result),
            Err(e) => {
                warn!("Error while extracting {}: {}", path.display(), e);
                None
            }
        })
        .filter(|file_result| !file_result.matches.is_empty())
        .collect();

    debug!(
        "Found matches in {} of {} files",
        file_results.len(),
        files.len()
    );
    for file_result in file_results {
        result.add_file_result(file_result);
    }
    result
}

/// Scans one root and greps the documents found there
pub fn grep_root(scanner: &TreeScanner, processor: &FileProcessor, root: &Path) -> GrepResult {
    let files = scanner.scan(root);
    info!("Found {} documents under {}", files.len(), root.display());
    grep_files(processor, &files)
}

/// Runs a full grep as described by `config`.
///
/// Every root gets its own scan and grep pass, one after another, on a pool of
/// `config.thread_count` workers. Per-root results are merged; a path seen
/// twice keeps the later root's matches. Roots that are not directories are
/// skipped with a warning, and if none is left the run fails with
/// [`SearchError::NoRoots`].
pub fn search(config: &GrepConfig) -> SearchResult<GrepResult> {
    info!("Starting grep for pattern: {:?}", config.pattern);

    if config.pattern.is_empty() {
        debug!("No search pattern provided, returning empty result");
        return Ok(GrepResult::new());
    }

    let roots = config.effective_roots()?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.thread_count.get())
        .build()
        .map_err(|e| SearchError::config_error(format!("cannot start worker pool: {}", e)))?;

    let scanner = TreeScanner::from_config(config);
    let processor = FileProcessor::new(config.pattern.as_str(), config.context_radius);

    let mut result = GrepResult::new();
    let mut scanned_roots = 0;
    for root in &roots {
        if !root.is_dir() {
            warn!("Skipping {}: not a directory", root.display());
            continue;
        }
        scanned_roots += 1;
        let root_result = pool.install(|| grep_root(&scanner, &processor, root));
        result.merge(root_result);
    }

    if scanned_roots == 0 {
        return Err(SearchError::NoRoots(roots));
    }

    processor.metrics().log_stats();
    info!(
        "Grep complete. Found {} matches in {} of {} files",
        result.total_matches(),
        result.files_with_matches(),
        result.files_searched
    );

    Ok(result)
}
