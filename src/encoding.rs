//! Cell encoding classification and decoding.
//!
//! CSV files produced on Chinese-locale systems are frequently GBK encoded,
//! sometimes mixed with UTF-8 cells in the same file. Each cell is classified
//! on its own and decoded to canonical UTF-8 text.
//!
//! Classification is a heuristic over raw bytes. Decoding is fail-closed:
//! bytes that cannot be decoded produce a [`DecodeError`], never replacement
//! characters.

use encoding_rs::GBK;
use thiserror::Error;

use crate::constants::{BOM_CHAR, GBK_LEAD_BYTES, GBK_TRAIL_BYTES, GBK_TRAIL_EXCLUDED};

/// Result of classifying a cell's raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Well-formed UTF-8 (plain ASCII included)
    Utf8,
    /// Every non-ASCII byte forms a valid GBK double-byte pair
    Gbk,
    /// Neither pattern matched
    Unknown,
}

/// A cell whose bytes are neither UTF-8 nor decodable as GBK
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{len} bytes classified as {encoding:?} could not be decoded as UTF-8 or GBK")]
pub struct DecodeError {
    pub encoding: TextEncoding,
    pub len: usize,
}

/// Classify a cell's raw bytes as UTF-8, GBK or unknown
pub fn classify(bytes: &[u8]) -> TextEncoding {
    if std::str::from_utf8(bytes).is_ok() {
        TextEncoding::Utf8
    } else if is_gbk(bytes) {
        TextEncoding::Gbk
    } else {
        TextEncoding::Unknown
    }
}

fn is_gbk(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii() {
            i += 1;
            continue;
        }
        if !GBK_LEAD_BYTES.contains(&b) {
            return false;
        }
        match bytes.get(i + 1) {
            Some(&t) if GBK_TRAIL_BYTES.contains(&t) && t != GBK_TRAIL_EXCLUDED => i += 2,
            _ => return false,
        }
    }
    true
}

/// Decode one cell to normalized text
///
/// UTF-8 passes through; GBK and unknown cells go through the GBK decoder.
/// The result is trimmed, stripped of byte order marks and trimmed again,
/// since removing a BOM can expose further whitespace.
pub fn decode_cell(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(normalize(text));
    }

    let encoding = if is_gbk(bytes) {
        TextEncoding::Gbk
    } else {
        TextEncoding::Unknown
    };
    let text = GBK
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(DecodeError {
            encoding,
            len: bytes.len(),
        })?;

    Ok(normalize(&text))
}

/// Trim whitespace and remove byte order marks
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.contains(BOM_CHAR) {
        trimmed.replace(BOM_CHAR, "").trim().to_string()
    } else {
        trimmed.to_string()
    }
}
