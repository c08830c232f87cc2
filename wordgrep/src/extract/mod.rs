//! Plain-text extraction for Word documents.
//!
//! Dispatch is by file extension: `.docx` goes to the OOXML reader, `.doc` to the
//! Word 97-2003 binary reader, anything else yields empty text. Each reader
//! checks the file signature first and reports [`SearchError::WrongFormat`] when
//! the bytes belong to the other format (a `.doc` that is really a `.docx` is
//! common after a rename). [`DocumentExtractor`] answers that error with exactly
//! one attempt under the alternate format; every other error is final.
//!
//! Readers log their diagnostics under the `wordgrep::extract` target so they
//! can be filtered on their own.

pub mod doc;
pub mod docx;

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{trace, warn};

use crate::errors::{SearchError, SearchResult};
use crate::metrics::GrepMetrics;

const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const ZIP_LOCAL_HEADER: [u8; 4] = [b'P', b'K', 0x03, 0x04];
const ZIP_EMPTY_ARCHIVE: [u8; 4] = [b'P', b'K', 0x05, 0x06];

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Word 97-2003 binary document (OLE compound file)
    Doc,
    /// Office Open XML document (zip archive)
    Docx,
}

impl DocumentFormat {
    /// Format implied by the file extension, if it is a supported one
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("docx") {
            Some(Self::Docx)
        } else if ext.eq_ignore_ascii_case("doc") {
            Some(Self::Doc)
        } else {
            None
        }
    }

    /// Format identified by the leading bytes of a file
    pub fn from_signature(header: &[u8]) -> Option<Self> {
        if header.starts_with(&OLE_SIGNATURE) {
            Some(Self::Doc)
        } else if header.starts_with(&ZIP_LOCAL_HEADER) || header.starts_with(&ZIP_EMPTY_ARCHIVE) {
            Some(Self::Docx)
        } else {
            None
        }
    }

    /// The other supported format
    pub fn alternate(self) -> Self {
        match self {
            Self::Doc => Self::Docx,
            Self::Docx => Self::Doc,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Doc => ".doc",
            Self::Docx => ".docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Opens `path` and verifies that its signature matches `expected`.
///
/// The returned file is rewound to the start.
pub(crate) fn open_checked(path: &Path, expected: DocumentFormat) -> SearchResult<File> {
    let mut file = File::open(path).map_err(|e| SearchError::from_io(path, e))?;

    let mut header = Vec::with_capacity(OLE_SIGNATURE.len());
    file.by_ref()
        .take(OLE_SIGNATURE.len() as u64)
        .read_to_end(&mut header)
        .map_err(|e| SearchError::from_io(path, e))?;

    match DocumentFormat::from_signature(&header) {
        Some(actual) if actual == expected => {}
        Some(actual) => return Err(SearchError::wrong_format(path, expected, actual)),
        None => {
            return Err(SearchError::malformed(
                path,
                format!("unrecognized {} file signature", expected),
            ))
        }
    }

    file.seek(SeekFrom::Start(0))
        .map_err(|e| SearchError::from_io(path, e))?;
    Ok(file)
}

/// Converts a document into plain text.
///
/// Implementations must be safe to call from many worker threads at once.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> SearchResult<String>;
}

/// Extension-dispatching extractor with a single alternate-format retry
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor {
    metrics: GrepMetrics,
}

impl DocumentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor that reports into shared run metrics
    pub fn with_metrics(metrics: GrepMetrics) -> Self {
        Self { metrics }
    }

    /// Extracts `path` assuming `format`, without any fallback
    pub fn extract_as(&self, path: &Path, format: DocumentFormat) -> SearchResult<String> {
        self.metrics.record_extraction(format);
        match format {
            DocumentFormat::Doc => doc::extract_text(path),
            DocumentFormat::Docx => docx::extract_text(path),
        }
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(&self, path: &Path) -> SearchResult<String> {
        let Some(format) = DocumentFormat::from_path(path) else {
            trace!("No extractor for {}, treating as empty", path.display());
            self.metrics.record_unsupported();
            return Ok(String::new());
        };

        match self.extract_as(path, format) {
            Err(err) if err.is_wrong_format() => {
                let alternate = format.alternate();
                warn!(
                    "Document type error: {}, treating as {}",
                    path.display(),
                    alternate
                );
                self.metrics.record_fallback();
                self.extract_as(path, alternate)
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a.docx")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("A.DOC")),
            Some(DocumentFormat::Doc)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("docx")), None);
    }

    #[test]
    fn test_format_from_signature() {
        assert_eq!(
            DocumentFormat::from_signature(&OLE_SIGNATURE),
            Some(DocumentFormat::Doc)
        );
        assert_eq!(
            DocumentFormat::from_signature(b"PK\x03\x04rest"),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_signature(b"plain text"), None);
        assert_eq!(DocumentFormat::from_signature(b""), None);
    }

    #[test]
    fn test_alternate() {
        assert_eq!(DocumentFormat::Doc.alternate(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::Docx.alternate(), DocumentFormat::Doc);
    }

    #[test]
    fn test_unsupported_extension_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let metrics = GrepMetrics::new();
        let extractor = DocumentExtractor::with_metrics(metrics.clone());
        assert_eq!(extractor.extract(&path).unwrap(), "");
        assert_eq!(metrics.get_stats().unsupported_files, 1);
    }

    #[test]
    fn test_open_checked_reports_wrong_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("renamed.doc");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"PK\x03\x04 not really a zip").unwrap();

        let err = open_checked(&path, DocumentFormat::Doc).unwrap_err();
        assert!(matches!(
            err,
            SearchError::WrongFormat {
                expected: DocumentFormat::Doc,
                actual: DocumentFormat::Docx,
                ..
            }
        ));
    }

    #[test]
    fn test_open_checked_unknown_signature_is_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("junk.docx");
        std::fs::write(&path, "just text").unwrap();

        let err = open_checked(&path, DocumentFormat::Docx).unwrap_err();
        assert!(matches!(err, SearchError::MalformedDocument { .. }));
    }

    #[test]
    fn test_open_checked_short_file_and_rewind() {
        let dir = tempdir().unwrap();
        let tiny = dir.path().join("tiny.docx");
        std::fs::write(&tiny, b"PK").unwrap();
        let err = open_checked(&tiny, DocumentFormat::Docx).unwrap_err();
        assert!(matches!(err, SearchError::MalformedDocument { .. }));

        let path = dir.path().join("ok.docx");
        std::fs::write(&path, b"PK\x03\x04rest of archive").unwrap();
        let mut file = open_checked(&path, DocumentFormat::Docx).unwrap();
        let mut content = Vec::new();
        file.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"PK\x03\x04rest of archive");
    }

    #[test]
    fn test_missing_file() {
        let extractor = DocumentExtractor::new();
        let err = extractor
            .extract(Path::new("/definitely/not/here.docx"))
            .unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound(_)));
    }

    #[test]
    fn test_fallback_is_attempted_once() {
        let dir = tempdir().unwrap();
        // zip signature under a .doc name, but not a valid archive either
        let path = dir.path().join("broken.doc");
        std::fs::write(&path, b"PK\x03\x04garbage").unwrap();

        let metrics = GrepMetrics::new();
        let extractor = DocumentExtractor::with_metrics(metrics.clone());
        let err = extractor.extract(&path).unwrap_err();

        assert!(!err.is_wrong_format());
        let stats = metrics.get_stats();
        assert_eq!(stats.format_fallbacks, 1);
        assert_eq!(stats.doc_extractions, 1);
        assert_eq!(stats.docx_extractions, 1);
    }
}
