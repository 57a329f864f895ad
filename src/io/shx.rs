//! The `.shx` index file: fixed 8-byte entries after the shared header.
//!
//! Each entry is a big-endian `(offset, content length)` pair measured in
//! 16-bit words, giving O(1) record lookup by index. The record count is
//! derived from the index file's byte size rather than trusted from the
//! header length field.

use crate::error::{Result, ShpError};
use crate::io::header::{ShapefileHeader, HEADER_SIZE};
use crate::io::{Endian, ShapeByteReader, ShapeByteWriter};
use std::path::Path;

/// One index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShxRecord {
    /// Offset of the record header in the `.shp` file, in 16-bit words.
    pub offset_words: i32,
    /// Record content length, in 16-bit words.
    pub content_words: i32,
}

impl ShxRecord {
    pub fn new(offset_words: i32, content_words: i32) -> Self {
        ShxRecord {
            offset_words,
            content_words,
        }
    }

    pub fn offset_bytes(&self) -> u64 {
        self.offset_words as u64 * 2
    }

    pub fn content_bytes(&self) -> u64 {
        self.content_words as u64 * 2
    }
}

/// Read the whole index: header plus every entry.
///
/// The entry count comes from `(file size - 100) / 8`; a trailing partial
/// entry means the file is truncated.
pub fn read_index(path: &Path) -> Result<(ShapefileHeader, Vec<ShxRecord>)> {
    let mut reader = ShapeByteReader::open(path)?;
    let header = ShapefileHeader::read(&mut reader, path)?;
    let body_bytes = reader.file_length().saturating_sub(HEADER_SIZE);
    if body_bytes % 8 != 0 {
        return Err(ShpError::InvalidFormat(format!(
            "index file {path:?} has a truncated entry ({body_bytes} body bytes)"
        )));
    }
    let count = (body_bytes / 8) as usize;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let offset_words = reader.read_i32(Endian::Big)?;
        let content_words = reader.read_i32(Endian::Big)?;
        records.push(ShxRecord::new(offset_words, content_words));
    }
    Ok((header, records))
}

/// Write the whole index file.
///
/// The header is shared with the `.shp` file except for the length field,
/// which here covers the 100-byte header plus 4 words per entry.
pub fn write_index(path: &Path, header: &ShapefileHeader, records: &[ShxRecord]) -> Result<()> {
    let mut index_header = header.clone();
    index_header.file_length = (HEADER_SIZE / 2) as i32 + 4 * records.len() as i32;
    let mut writer = ShapeByteWriter::create(path)?;
    index_header.write(&mut writer)?;
    for record in records {
        writer.write_i32(record.offset_words, Endian::Big)?;
        writer.write_i32(record.content_words, Endian::Big)?;
    }
    writer.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ShapeType;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shp_shx_{name}"))
    }

    #[test]
    fn test_index_roundtrip() {
        let path = temp_path("roundtrip.shx");
        let header = ShapefileHeader::new(ShapeType::Point);
        let records = vec![ShxRecord::new(50, 10), ShxRecord::new(64, 10)];
        write_index(&path, &header, &records).unwrap();

        let (parsed_header, parsed) = read_index(&path).unwrap();
        assert_eq!(parsed, records);
        // 100 bytes header + 2 entries of 4 words each.
        assert_eq!(parsed_header.file_length, 58);
        assert_eq!(parsed[0].offset_bytes(), 100);
        assert_eq!(parsed[1].content_bytes(), 20);
    }

    #[test]
    fn test_truncated_index_rejected() {
        let path = temp_path("truncated.shx");
        let header = ShapefileHeader::new(ShapeType::Point);
        write_index(&path, &header, &[ShxRecord::new(50, 10)]).unwrap();
        let mut bytes = std::fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 3);
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            read_index(&path).unwrap_err(),
            ShpError::InvalidFormat(_)
        ));
    }

    #[test]
    fn test_empty_index() {
        let path = temp_path("empty.shx");
        let header = ShapefileHeader::new(ShapeType::PolyLine);
        write_index(&path, &header, &[]).unwrap();
        let (_, records) = read_index(&path).unwrap();
        assert!(records.is_empty());
    }
}
