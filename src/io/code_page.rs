//! dBASE language driver ID (LDID) to encoding mapping.
//!
//! Attribute text in the companion `.dbf` table is stored in a legacy code
//! page identified by a single LDID byte in the table header. This module
//! maps that byte to an `encoding_rs` encoding so attribute values can be
//! decoded to, and encoded from, Rust strings.

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// LDID byte to encoding table.
///
/// Only the IDs seen in the wild are listed; anything else falls back to
/// Windows-1252, the most common dBASE code page.
static LDID_ENCODINGS: Lazy<HashMap<u8, &'static Encoding>> = Lazy::new(|| {
    let mut m: HashMap<u8, &'static Encoding> = HashMap::new();
    // DOS code pages
    m.insert(0x01, encoding_rs::IBM866); // DOS USA (437, closest available)
    m.insert(0x02, encoding_rs::WINDOWS_1252); // DOS Multilingual (850)
    m.insert(0x03, encoding_rs::WINDOWS_1252); // Windows ANSI
    m.insert(0x13, encoding_rs::SHIFT_JIS); // Japanese (932)
    m.insert(0x26, encoding_rs::IBM866); // Russian DOS (866)
    m.insert(0x4D, encoding_rs::GBK); // Simplified Chinese (936)
    m.insert(0x4E, encoding_rs::EUC_KR); // Korean (949)
    m.insert(0x4F, encoding_rs::BIG5); // Traditional Chinese (950)
    m.insert(0x57, encoding_rs::WINDOWS_1252); // ANSI
    m.insert(0x58, encoding_rs::WINDOWS_1252); // Western European ANSI
    m.insert(0x59, encoding_rs::WINDOWS_1252); // Spanish ANSI
    m.insert(0x64, encoding_rs::WINDOWS_1250); // Eastern European (852)
    m.insert(0x65, encoding_rs::IBM866); // Russian (866)
    m.insert(0x6A, encoding_rs::WINDOWS_1253); // Greek (737)
    m.insert(0x6B, encoding_rs::WINDOWS_1254); // Turkish (857)
    // Windows code pages
    m.insert(0xC8, encoding_rs::WINDOWS_1250); // Eastern European
    m.insert(0xC9, encoding_rs::WINDOWS_1251); // Russian
    m.insert(0xCA, encoding_rs::WINDOWS_1254); // Turkish
    m.insert(0xCB, encoding_rs::WINDOWS_1253); // Greek
    m.insert(0xCC, encoding_rs::WINDOWS_1257); // Baltic
    m
});

/// Get the encoding for a dBASE LDID byte.
///
/// Unknown IDs (and 0x00, "no driver") fall back to Windows-1252.
pub fn ldid_to_encoding(ldid: u8) -> &'static Encoding {
    LDID_ENCODINGS
        .get(&ldid)
        .copied()
        .unwrap_or(encoding_rs::WINDOWS_1252)
}

/// Decode raw attribute bytes using the table's LDID.
///
/// Undecodable byte sequences are replaced, never errored; a mangled label
/// should not make a whole shapefile unreadable.
pub fn decode_text(bytes: &[u8], ldid: u8) -> String {
    let (cow, _, _) = ldid_to_encoding(ldid).decode(bytes);
    cow.into_owned()
}

/// Encode a string to raw attribute bytes using the table's LDID.
pub fn encode_text(text: &str, ldid: u8) -> Vec<u8> {
    let (cow, _, _) = ldid_to_encoding(ldid).encode(text);
    cow.into_owned()
}
