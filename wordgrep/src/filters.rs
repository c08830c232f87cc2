/// File filtering for the tree scanner.
///
/// A candidate document is a regular file whose lowercased name ends with one of
/// the configured extensions and which is not an Office lock file (`~$name.docx`,
/// created next to a document while it is open). Glob ignore patterns can prune
/// further.
use glob::Pattern;
use std::path::Path;

/// Extensions recognized by default
pub const DEFAULT_EXTENSIONS: &[&str] = &["doc", "docx"];

/// Prefix Word uses for its owner/lock files
pub const LOCK_FILE_PREFIX: &str = "~$";

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Checks if the file name ends with one of the given extensions, ignoring case
pub fn has_document_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = file_name(path) else {
        return false;
    };
    let name = name.to_lowercase();
    extensions.iter().any(|ext| {
        let ext = ext.trim_start_matches('.').to_lowercase();
        !ext.is_empty() && name.ends_with(&format!(".{}", ext))
    })
}

/// Checks if the file is a temporary lock file
pub fn is_lock_file(path: &Path, lock_prefix: &str) -> bool {
    !lock_prefix.is_empty() && file_name(path).is_some_and(|name| name.starts_with(lock_prefix))
}

/// Checks if a file should be ignored based on ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    if ignore_patterns.is_empty() {
        return false;
    }
    let normalized_path = path.to_string_lossy().replace('\\', "/");

    ignore_patterns.iter().any(|pattern| {
        if let Ok(p) = Pattern::new(pattern) {
            p.matches(&normalized_path)
        } else {
            false
        }
    })
}

/// Determines if a file should be included in the scan
pub fn should_include_file(
    path: &Path,
    extensions: &[String],
    lock_prefix: &str,
    ignore_patterns: &[String],
) -> bool {
    has_document_extension(path, extensions)
        && !is_lock_file(path, lock_prefix)
        && !should_ignore(path, ignore_patterns)
}
