/// Result types produced by a grep run.
///
/// A `Match` is nothing more than the cleaned snippet around one occurrence;
/// offsets are only needed while scanning and are dropped afterwards. A
/// `GrepResult` maps each document path to its non-empty list of matches and is
/// owned by exactly one thread while it is being filled.
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::path::{Path, PathBuf};

/// Represents a single occurrence of the pattern in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Context around the occurrence, with `\r` removed and trimmed
    pub snippet: String,
}

impl Match {
    pub fn new(snippet: impl Into<String>) -> Self {
        Self {
            snippet: snippet.into(),
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "...{}...", self.snippet)
    }
}

/// Represents all matches found in a single document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResult {
    /// Absolute path of the document
    pub path: PathBuf,
    /// Matches in order of occurrence
    pub matches: Vec<Match>,
}

impl FileResult {
    pub fn new(path: impl Into<PathBuf>, matches: Vec<Match>) -> Self {
        Self {
            path: path.into(),
            matches,
        }
    }
}

/// Aggregated matches for one or more roots
#[derive(Debug, Clone, Default)]
pub struct GrepResult {
    file_results: BTreeMap<PathBuf, Vec<Match>>,
    /// Number of documents handed to the coordinator, matching or not
    pub files_searched: usize,
}

impl GrepResult {
    /// Creates a new empty result
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a file result; files without matches are not recorded.
    ///
    /// A path that is already present is replaced.
    pub fn add_file_result(&mut self, file_result: FileResult) {
        if file_result.matches.is_empty() {
            return;
        }
        self.file_results
            .insert(file_result.path, file_result.matches);
    }

    /// Merges another result into this one. On a duplicate path the entry from
    /// `other` wins.
    pub fn merge(&mut self, other: GrepResult) {
        self.files_searched += other.files_searched;
        self.file_results.extend(other.file_results);
    }

    /// Matches recorded for `path`, if it had any
    pub fn get(&self, path: &Path) -> Option<&[Match]> {
        self.file_results.get(path).map(Vec::as_slice)
    }

    /// Number of documents with at least one match
    pub fn files_with_matches(&self) -> usize {
        self.file_results.len()
    }

    /// Total number of matches across all documents
    pub fn total_matches(&self) -> usize {
        self.file_results.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.file_results.is_empty()
    }

    /// Iterates over `(path, matches)` pairs in path order
    pub fn iter(&self) -> btree_map::Iter<'_, PathBuf, Vec<Match>> {
        self.file_results.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.file_results.keys().map(PathBuf::as_path)
    }
}

impl<'a> IntoIterator for &'a GrepResult {
    type Item = (&'a PathBuf, &'a Vec<Match>);
    type IntoIter = btree_map::Iter<'a, PathBuf, Vec<Match>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for GrepResult {
    type Item = (PathBuf, Vec<Match>);
    type IntoIter = btree_map::IntoIter<PathBuf, Vec<Match>>;

    fn into_iter(self) -> Self::IntoIter {
        self.file_results.into_iter()
    }
}
