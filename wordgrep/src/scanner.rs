//! Discovery of candidate documents under a root directory.
//!
//! The walk is iterative (the `ignore` crate's walker keeps its own stack), does
//! not follow symlinks and applies none of the hidden-file or gitignore rules a
//! code search would want: every subdirectory is visited. Unreadable entries are
//! skipped one at a time, so a bad subtree never hides its siblings.
//!
//! Symlink cycles are not handled; links are simply not followed.
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::config::GrepConfig;
use crate::errors::unify_path;
use crate::filters::{should_include_file, DEFAULT_EXTENSIONS, LOCK_FILE_PREFIX};

/// Finds every document under `root` with the default filters
pub fn scan(root: &Path) -> Vec<PathBuf> {
    TreeScanner::default().scan(root)
}

/// Configurable tree scanner
#[derive(Debug, Clone)]
pub struct TreeScanner {
    extensions: Vec<String>,
    lock_file_prefix: String,
    ignore_patterns: Vec<String>,
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            lock_file_prefix: LOCK_FILE_PREFIX.to_string(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl TreeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GrepConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            lock_file_prefix: config.lock_file_prefix.clone(),
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_ignore_patterns(mut self, ignore_patterns: Vec<String>) -> Self {
        self.ignore_patterns = ignore_patterns;
        self
    }

    /// Returns the absolute paths of all documents under `root`, in no
    /// particular order. A missing root, or one that is not a directory, yields
    /// an empty list.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            warn!("Cannot scan {}: not a readable directory", root.display());
            return Vec::new();
        }
        let root = unify_path(root);
        debug!("Scanning directory: {}", root.display());

        let mut builder = WalkBuilder::new(&root);
        builder.standard_filters(false).follow_links(false);

        let files: Vec<PathBuf> = builder
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter(|entry| {
                should_include_file(
                    entry.path(),
                    &self.extensions,
                    &self.lock_file_prefix,
                    &self.ignore_patterns,
                )
            })
            .map(|entry| {
                trace!("Found document: {}", entry.path().display());
                entry.into_path()
            })
            .collect();

        debug!("Found {} documents under {}", files.len(), root.display());
        files
    }
}
