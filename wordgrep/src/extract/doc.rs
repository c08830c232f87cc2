//! Word 97-2003 (`.doc`) text extraction.
//!
//! The document is an OLE compound file. Text is recovered from the piece
//! table: the File Information Block (FIB) at the start of the `WordDocument`
//! stream points at the CLX structure inside the table stream, and the CLX
//! lists the pieces of text (character position range plus file offset) that
//! make up the document. Pieces are either 8-bit Windows-1252 ("compressed") or
//! UTF-16LE.

use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

use super::{open_checked, DocumentFormat};
use crate::errors::{SearchError, SearchResult};

const WORD_DOCUMENT_STREAM: &str = "/WordDocument";
const TABLE_STREAMS: [&str; 2] = ["/0Table", "/1Table"];

const FIB_IDENT: u16 = 0xA5EC;
const FIB_FLAGS_OFFSET: usize = 0x0A;
const FIB_CSW_OFFSET: usize = 0x20;
const FLAG_ENCRYPTED: u16 = 0x0100;
const FLAG_WHICH_TABLE: u16 = 0x0200;
/// Index of the fcClx/lcbClx pair in FibRgFcLcb97
const CLX_PAIR_INDEX: usize = 33;

const CLX_PRC: u8 = 0x01;
const CLX_PCDT: u8 = 0x02;
const PCD_SIZE: usize = 8;
const FC_COMPRESSED: u32 = 0x4000_0000;
const FC_MASK: u32 = 0x3FFF_FFFF;

/// Windows-1252 code points for bytes 0x80..=0x9F
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{8D}', '\u{017D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{9D}', '\u{017E}', '\u{0178}',
];

/// Extracts the text of the `.doc` file at `path`
pub fn extract_text(path: &Path) -> SearchResult<String> {
    let file = open_checked(path, DocumentFormat::Doc)?;
    let mut compound = cfb::CompoundFile::open(file)
        .map_err(|e| SearchError::malformed(path, format!("invalid compound file: {}", e)))?;

    let word_document = read_stream(&mut compound, WORD_DOCUMENT_STREAM)
        .map_err(|e| SearchError::malformed(path, format!("WordDocument stream: {}", e)))?;
    let fib = Fib::parse(&word_document).map_err(|reason| SearchError::malformed(path, reason))?;

    let table_name = TABLE_STREAMS[usize::from(fib.uses_table_1)];
    let table = read_stream(&mut compound, table_name)
        .map_err(|e| SearchError::malformed(path, format!("{} stream: {}", table_name, e)))?;
    trace!(
        "{}: fcClx={} lcbClx={} in {}",
        path.display(),
        fib.fc_clx,
        fib.lcb_clx,
        table_name
    );

    let clx = table
        .get(fib.fc_clx..fib.fc_clx.saturating_add(fib.lcb_clx))
        .ok_or_else(|| SearchError::malformed(path, "CLX lies outside the table stream"))?;
    let pieces = piece_table(clx).map_err(|reason| SearchError::malformed(path, reason))?;
    debug!("{}: {} text pieces", path.display(), pieces.len());

    let mut raw = String::new();
    for piece in &pieces {
        decode_piece(&word_document, piece, &mut raw)
            .map_err(|reason| SearchError::malformed(path, reason))?;
    }

    Ok(normalize(&raw))
}

fn read_stream<F: std::io::Read + std::io::Seek>(
    compound: &mut cfb::CompoundFile<F>,
    name: &str,
) -> std::io::Result<Vec<u8>> {
    let mut stream = compound.open_stream(name)?;
    let mut buffer = Vec::new();
    stream.read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// The parts of the File Information Block needed to find the text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fib {
    uses_table_1: bool,
    fc_clx: usize,
    lcb_clx: usize,
}

impl Fib {
    fn parse(data: &[u8]) -> Result<Self, String> {
        let truncated = || "truncated File Information Block".to_string();

        let ident = read_u16(data, 0).ok_or_else(truncated)?;
        if ident != FIB_IDENT {
            return Err(format!("bad FIB signature {:#06x}", ident));
        }
        let flags = read_u16(data, FIB_FLAGS_OFFSET).ok_or_else(truncated)?;
        if flags & FLAG_ENCRYPTED != 0 {
            return Err("document is encrypted".to_string());
        }

        // FibBase, then the variable-length FibRgW, FibRgLw and FibRgFcLcb blocks
        let csw = usize::from(read_u16(data, FIB_CSW_OFFSET).ok_or_else(truncated)?);
        let cslw_offset = FIB_CSW_OFFSET + 2 + csw * 2;
        let cslw = usize::from(read_u16(data, cslw_offset).ok_or_else(truncated)?);
        let count_offset = cslw_offset + 2 + cslw * 4;
        let pair_count = usize::from(read_u16(data, count_offset).ok_or_else(truncated)?);
        if pair_count <= CLX_PAIR_INDEX {
            return Err(format!("FIB has only {} fc/lcb pairs", pair_count));
        }

        let pair_offset = count_offset + 2 + CLX_PAIR_INDEX * 8;
        let fc_clx = read_u32(data, pair_offset).ok_or_else(truncated)?;
        let lcb_clx = read_u32(data, pair_offset + 4).ok_or_else(truncated)?;

        Ok(Self {
            uses_table_1: flags & FLAG_WHICH_TABLE != 0,
            fc_clx: fc_clx as usize,
            lcb_clx: lcb_clx as usize,
        })
    }
}

/// One entry of the piece table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    cp_start: u32,
    cp_end: u32,
    fc: u32,
}

/// Walks the CLX, skipping property modifiers, and parses the piece table
fn piece_table(clx: &[u8]) -> Result<Vec<Piece>, String> {
    let mut pos = 0;
    while let Some(&kind) = clx.get(pos) {
        match kind {
            CLX_PRC => {
                let size = read_u16(clx, pos + 1).ok_or("truncated Prc in CLX")?;
                pos += 3 + usize::from(size);
            }
            CLX_PCDT => {
                let size = read_u32(clx, pos + 1).ok_or("truncated Pcdt in CLX")? as usize;
                let plc = clx
                    .get(pos + 5..(pos + 5).saturating_add(size))
                    .ok_or("piece table runs past the CLX")?;
                return parse_plc_pcd(plc);
            }
            other => return Err(format!("unexpected CLX entry {:#04x}", other)),
        }
    }
    Err("CLX has no piece table".to_string())
}

fn parse_plc_pcd(plc: &[u8]) -> Result<Vec<Piece>, String> {
    if plc.len() < 4 || (plc.len() - 4) % (4 + PCD_SIZE) != 0 {
        return Err(format!("piece table has invalid size {}", plc.len()));
    }
    let count = (plc.len() - 4) / (4 + PCD_SIZE);
    let descriptors = (count + 1) * 4;

    (0..count)
        .map(|i| -> Result<Piece, String> {
            let cp_start = read_u32(plc, i * 4).ok_or("truncated piece table")?;
            let cp_end = read_u32(plc, (i + 1) * 4).ok_or("truncated piece table")?;
            let fc = read_u32(plc, descriptors + i * PCD_SIZE + 2).ok_or("truncated piece table")?;
            if cp_end < cp_start {
                return Err(format!("piece {} ends before it starts", i));
            }
            Ok(Piece {
                cp_start,
                cp_end,
                fc,
            })
        })
        .collect()
}

fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => CP1252_HIGH[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

fn decode_piece(word_document: &[u8], piece: &Piece, out: &mut String) -> Result<(), String> {
    let chars = (piece.cp_end - piece.cp_start) as usize;
    let out_of_range = || format!("piece at fc {:#x} lies outside the document", piece.fc);

    if piece.fc & FC_COMPRESSED != 0 {
        let offset = ((piece.fc & FC_MASK) / 2) as usize;
        let bytes = word_document
            .get(offset..offset.saturating_add(chars))
            .ok_or_else(out_of_range)?;
        out.extend(bytes.iter().copied().map(cp1252_char));
    } else {
        let offset = (piece.fc & FC_MASK) as usize;
        let bytes = word_document
            .get(offset..offset.saturating_add(chars * 2))
            .ok_or_else(out_of_range)?;
        let units = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
        out.extend(char::decode_utf16(units).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));
    }
    Ok(())
}

/// Maps Word's special characters onto plain text.
///
/// Paragraph marks become `\r\n`, cell and row marks a tab, line and page
/// breaks a newline; field delimiters and other control characters vanish.
fn normalize(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\r' => text.push_str("\r\n"),
            '\u{07}' => text.push('\t'),
            '\u{0B}' | '\u{0C}' => text.push('\n'),
            '\t' | '\n' => text.push(c),
            c if c.is_control() => {}
            c => text.push(c),
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const TEXT_OFFSET: usize = 1024;

    /// Builds a WordDocument stream whose FIB points at a CLX of `clx_len` bytes
    /// at offset 0 of the table stream, followed by `text` at `TEXT_OFFSET`.
    fn word_document(text: &[u8], clx_len: u32, table_1: bool) -> Vec<u8> {
        let mut data = vec![0u8; TEXT_OFFSET];
        data[0..2].copy_from_slice(&FIB_IDENT.to_le_bytes());
        let flags: u16 = if table_1 { FLAG_WHICH_TABLE } else { 0 };
        data[FIB_FLAGS_OFFSET..FIB_FLAGS_OFFSET + 2].copy_from_slice(&flags.to_le_bytes());
        data[0x20..0x22].copy_from_slice(&14u16.to_le_bytes());
        data[0x3E..0x40].copy_from_slice(&22u16.to_le_bytes());
        data[0x98..0x9A].copy_from_slice(&0x5Du16.to_le_bytes());
        data[0x1A2..0x1A6].copy_from_slice(&0u32.to_le_bytes());
        data[0x1A6..0x1AA].copy_from_slice(&clx_len.to_le_bytes());
        data.extend_from_slice(text);
        data
    }

    fn clx(pieces: &[(u32, u32, u32)]) -> Vec<u8> {
        let mut plc = Vec::new();
        for (cp_start, _, _) in pieces {
            plc.extend_from_slice(&cp_start.to_le_bytes());
        }
        plc.extend_from_slice(&pieces.last().map_or(0, |p| p.1).to_le_bytes());
        for (_, _, fc) in pieces {
            plc.extend_from_slice(&0u16.to_le_bytes());
            plc.extend_from_slice(&fc.to_le_bytes());
            plc.extend_from_slice(&0u16.to_le_bytes());
        }

        // a property modifier ahead of the piece table
        let mut clx = vec![CLX_PRC, 0x02, 0x00, 0xAA, 0xBB, CLX_PCDT];
        clx.extend_from_slice(&(plc.len() as u32).to_le_bytes());
        clx.extend_from_slice(&plc);
        clx
    }

    fn write_doc(path: &Path, word_document: &[u8], table_name: &str, table: &[u8]) {
        let mut compound = cfb::create(path).unwrap();
        compound
            .create_stream(WORD_DOCUMENT_STREAM)
            .unwrap()
            .write_all(word_document)
            .unwrap();
        compound
            .create_stream(table_name)
            .unwrap()
            .write_all(table)
            .unwrap();
        compound.flush().unwrap();
    }

    #[test]
    fn test_compressed_piece() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("memo.doc");
        let text = b"Quarterly report\rhello world\r";
        let fc = ((TEXT_OFFSET as u32) * 2) | FC_COMPRESSED;
        let clx = clx(&[(0, text.len() as u32, fc)]);
        write_doc(
            &path,
            &word_document(text, clx.len() as u32, true),
            "/1Table",
            &clx,
        );

        assert_eq!(
            extract_text(&path).unwrap(),
            "Quarterly report\r\nhello world\r\n"
        );
    }

    #[test]
    fn test_unicode_piece_in_table_0() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("unicode.doc");
        let text: Vec<u8> = "Grüße\u{07}naïve"
            .encode_utf16()
            .flat_map(|u| u.to_le_bytes())
            .collect();
        let chars = (text.len() / 2) as u32;
        let clx = clx(&[(0, chars, TEXT_OFFSET as u32)]);
        write_doc(
            &path,
            &word_document(&text, clx.len() as u32, false),
            "/0Table",
            &clx,
        );

        assert_eq!(extract_text(&path).unwrap(), "Grüße\tnaïve");
    }

    #[test]
    fn test_multiple_pieces_are_concatenated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pieces.doc");
        let text = b"first second";
        let base = (TEXT_OFFSET as u32) * 2;
        let clx = clx(&[
            (0, 6, base | FC_COMPRESSED),
            (6, 12, (base + 12) | FC_COMPRESSED),
        ]);
        write_doc(
            &path,
            &word_document(text, clx.len() as u32, true),
            "/1Table",
            &clx,
        );

        assert_eq!(extract_text(&path).unwrap(), "first second");
    }

    #[test]
    fn test_bad_fib_signature() {
        let mut data = word_document(b"x", 0, true);
        data[0] = 0;
        assert!(Fib::parse(&data).unwrap_err().contains("signature"));
    }

    #[test]
    fn test_encrypted_document_rejected() {
        let mut data = word_document(b"x", 0, true);
        let flags = FLAG_WHICH_TABLE | FLAG_ENCRYPTED;
        data[FIB_FLAGS_OFFSET..FIB_FLAGS_OFFSET + 2].copy_from_slice(&flags.to_le_bytes());
        assert_eq!(Fib::parse(&data).unwrap_err(), "document is encrypted");
    }

    #[test]
    fn test_fib_offsets() {
        let fib = Fib::parse(&word_document(b"", 42, true)).unwrap();
        assert_eq!(
            fib,
            Fib {
                uses_table_1: true,
                fc_clx: 0,
                lcb_clx: 42
            }
        );
    }

    #[test]
    fn test_piece_table_without_pcdt() {
        assert_eq!(
            piece_table(&[CLX_PRC, 0x00, 0x00]).unwrap_err(),
            "CLX has no piece table"
        );
        assert!(piece_table(&[0x07]).is_err());
    }

    #[test]
    fn test_cp1252_high_range() {
        assert_eq!(cp1252_char(0x80), '€');
        assert_eq!(cp1252_char(0x93), '“');
        assert_eq!(cp1252_char(b'a'), 'a');
        assert_eq!(cp1252_char(0xE9), 'é');
    }

    #[test]
    fn test_normalize_control_characters() {
        assert_eq!(
            normalize("a\rb\u{07}c\u{0B}d\u{13}HYPERLINK\u{14}e\u{15}"),
            "a\r\nb\tc\ndHYPERLINKe"
        );
    }

    #[test]
    fn test_docx_bytes_under_doc_name_is_wrong_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("renamed.doc");
        std::fs::write(&path, b"PK\x03\x04").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(err.is_wrong_format());
    }
}
