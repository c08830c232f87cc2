#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;

/// Writes a minimal `.docx` with one paragraph per entry of `paragraphs`
pub fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    zip.start_file("[Content_Types].xml", FileOptions::default())
        .unwrap();
    zip.write_all(b"<Types/>").unwrap();
    zip.start_file("word/document.xml", FileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

const TEXT_OFFSET: usize = 1024;

/// Writes a minimal Word 97 `.doc` holding `text` (ASCII) as one compressed
/// piece, paragraphs separated by `\r`
pub fn write_doc(path: &Path, text: &str) {
    let text = text.as_bytes();

    let mut plc = Vec::new();
    plc.extend_from_slice(&0u32.to_le_bytes());
    plc.extend_from_slice(&(text.len() as u32).to_le_bytes());
    plc.extend_from_slice(&0u16.to_le_bytes());
    plc.extend_from_slice(&(((TEXT_OFFSET as u32) * 2) | 0x4000_0000).to_le_bytes());
    plc.extend_from_slice(&0u16.to_le_bytes());
    let mut clx = vec![0x02];
    clx.extend_from_slice(&(plc.len() as u32).to_le_bytes());
    clx.extend_from_slice(&plc);

    let mut word_document = vec![0u8; TEXT_OFFSET];
    word_document[0..2].copy_from_slice(&0xA5ECu16.to_le_bytes());
    word_document[0x0A..0x0C].copy_from_slice(&0x0200u16.to_le_bytes());
    word_document[0x20..0x22].copy_from_slice(&14u16.to_le_bytes());
    word_document[0x3E..0x40].copy_from_slice(&22u16.to_le_bytes());
    word_document[0x98..0x9A].copy_from_slice(&0x5Du16.to_le_bytes());
    word_document[0x1A2..0x1A6].copy_from_slice(&0u32.to_le_bytes());
    word_document[0x1A6..0x1AA].copy_from_slice(&(clx.len() as u32).to_le_bytes());
    word_document.extend_from_slice(text);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut compound = cfb::create(path).unwrap();
    compound
        .create_stream("/WordDocument")
        .unwrap()
        .write_all(&word_document)
        .unwrap();
    compound
        .create_stream("/1Table")
        .unwrap()
        .write_all(&clx)
        .unwrap();
    compound.flush().unwrap();
}
