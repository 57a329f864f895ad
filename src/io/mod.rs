//! I/O module: buffered binary streams, the 100-byte header, the record
//! codecs and the `.shx` index file.
//!
//! The Shapefile format mixes byte orders record-by-record (record headers
//! and index entries are big-endian, coordinate payloads little-endian), so
//! every typed read/write takes an explicit [`Endian`] argument instead of
//! fixing one order per stream.

pub mod byte_reader;
pub mod byte_writer;
pub mod code_page;
pub mod header;
pub mod record;
pub mod shx;

pub use byte_reader::{ReadOutcome, SeekOrigin, ShapeByteReader};
pub use byte_writer::ShapeByteWriter;
pub use code_page::ldid_to_encoding;
pub use header::ShapefileHeader;
pub use shx::ShxRecord;

/// Byte order selector for typed reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Little-endian (the default for shapefile payloads)
    #[default]
    Little,
    /// Big-endian (record headers, index entries, file code and length)
    Big,
}
