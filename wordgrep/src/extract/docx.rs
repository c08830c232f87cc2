//! Office Open XML (`.docx`) text extraction.
//!
//! A `.docx` file is a zip archive; the body text lives in `word/document.xml`
//! and each header or footer in its own `word/header*.xml`/`word/footer*.xml`.
//! Text runs (`w:t`) are concatenated, run-level tabs and breaks become `\t`
//! and `\n`, and every paragraph ends with `\n`.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use super::{open_checked, DocumentFormat};
use crate::errors::{SearchError, SearchResult};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts the body text of the `.docx` file at `path`, followed by the text
/// of its headers and footers
pub fn extract_text(path: &Path) -> SearchResult<String> {
    let file = open_checked(path, DocumentFormat::Docx)?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(path, e))?;

    let mut text = read_part(&mut archive, path, DOCUMENT_PART)?;

    let mut extra_parts: Vec<String> = archive
        .file_names()
        .filter(|name| is_header_or_footer(name))
        .map(str::to_string)
        .collect();
    extra_parts.sort();
    for part in &extra_parts {
        text.push_str(&read_part(&mut archive, path, part)?);
    }

    Ok(text)
}

/// `word/header1.xml`, `word/footer2.xml` and so on
fn is_header_or_footer(name: &str) -> bool {
    name.strip_prefix("word/")
        .filter(|rest| !rest.contains('/'))
        .is_some_and(|rest| {
            (rest.starts_with("header") || rest.starts_with("footer")) && rest.ends_with(".xml")
        })
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &Path,
    part: &str,
) -> SearchResult<String> {
    let mut xml = String::new();
    archive
        .by_name(part)
        .map_err(|e| match e {
            ZipError::FileNotFound => {
                SearchError::malformed(path, format!("archive has no {}", part))
            }
            other => zip_error(path, other),
        })?
        .read_to_string(&mut xml)
        .map_err(|e| SearchError::malformed(path, format!("{}: {}", part, e)))?;
    debug!("Read {} bytes of {} from {}", xml.len(), part, path.display());

    document_text(&xml).map_err(|e| SearchError::malformed(path, format!("{}: {}", part, e)))
}

fn zip_error(path: &Path, err: ZipError) -> SearchError {
    match err {
        ZipError::Io(e) => SearchError::from_io(path, e),
        other => SearchError::malformed(path, other.to_string()),
    }
}

/// Collects the text of a WordprocessingML document part
pub(crate) fn document_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => in_run = true,
                b"t" if in_run => in_text = true,
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if in_run => text.push('\t'),
                b"br" | b"cr" if in_run => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => in_run = false,
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => text.push_str(&e.unescape()?),
            Event::CData(e) if in_text => text.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}
