/// Error types for wordgrep.
///
/// Every failure that can happen while processing a single document is a
/// `SearchError`; the coordinator turns those into warnings and zero matches so
/// that one broken file never aborts a scan. Only run-level problems (no usable
/// root, a thread pool that cannot be built) reach the caller as `Err`.
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::DocumentFormat;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("{path} is not a {expected} document (found {actual} content)")]
    WrongFormat {
        path: PathBuf,
        expected: DocumentFormat,
        actual: DocumentFormat,
    },
    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },
    #[error("No readable root directory among {0:?}")]
    NoRoots(Vec<PathBuf>),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Canonicalize the path and strip UNC prefixes so that
/// comparisons on Windows are consistent.
pub fn unify_path(original: &Path) -> PathBuf {
    let canonical = original.canonicalize().unwrap_or_else(|_| {
        if original.is_absolute() {
            original.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(original))
                .unwrap_or_else(|_| original.to_path_buf())
        }
    });
    strip_unc_prefix(&canonical)
}

/// Strips the Windows UNC prefix (\\?\) from a path if present
fn strip_unc_prefix(p: &Path) -> PathBuf {
    let s = p.display().to_string();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        p.to_path_buf()
    }
}

impl SearchError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn wrong_format(
        path: impl Into<PathBuf>,
        expected: DocumentFormat,
        actual: DocumentFormat,
    ) -> Self {
        Self::WrongFormat {
            path: path.into(),
            expected,
            actual,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Maps an I/O error on `path` to the most specific variant.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }

    /// True when the document looked like the other supported format.
    pub fn is_wrong_format(&self) -> bool {
        matches!(self, Self::WrongFormat { .. })
    }
}
