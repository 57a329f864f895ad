//! The 100-byte shapefile header.
//!
//! The same layout opens both the `.shp` and `.shx` files; the only field
//! whose meaning differs is the file length, which always counts 16-bit
//! words but covers a different body. The file code and length are
//! big-endian, everything from the version on is little-endian.
//!
//! The length field cannot be known until every record is written, so the
//! writing pattern is: emit the header with a placeholder, stream records,
//! then seek back to offset 24 and patch just the length.

use crate::error::{Result, ShpError};
use crate::geometry::ShapeType;
use crate::io::{Endian, ShapeByteReader, ShapeByteWriter};
use crate::types::Extent;
use std::fmt;
use std::path::Path;

/// Magic file code at offset 0, big-endian.
pub const FILE_CODE: i32 = 9994;
/// Header size in bytes.
pub const HEADER_SIZE: u64 = 100;
/// Format version at offset 28, little-endian.
pub const VERSION: i32 = 1000;
/// Byte offset of the big-endian file-length field.
pub const FILE_LENGTH_OFFSET: u64 = 24;

/// Parsed 100-byte header.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileHeader {
    /// Total file length in 16-bit words.
    pub file_length: i32,
    pub version: i32,
    pub shape_type: ShapeType,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub min_m: f64,
    pub max_m: f64,
}

impl ShapefileHeader {
    /// Header for a new, empty file of the given type.
    pub fn new(shape_type: ShapeType) -> Self {
        ShapefileHeader {
            file_length: (HEADER_SIZE / 2) as i32,
            version: VERSION,
            shape_type,
            min_x: 0.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 0.0,
            min_z: 0.0,
            max_z: 0.0,
            min_m: 0.0,
            max_m: 0.0,
        }
    }

    /// File length in bytes.
    pub fn file_length_bytes(&self) -> u64 {
        self.file_length as u64 * 2
    }

    /// Read and validate the header from the front of a stream.
    ///
    /// The file code is checked strictly; a mismatch means the file is not
    /// a shapefile at all and nothing after it can be trusted.
    pub fn read(reader: &mut ShapeByteReader, path: &Path) -> Result<Self> {
        let file_code = reader.read_i32(Endian::Big)?;
        if file_code != FILE_CODE {
            return Err(ShpError::FileCodeMismatch {
                path: path.to_path_buf(),
                actual: file_code,
            });
        }
        reader.skip(20)?;
        let file_length = reader.read_i32(Endian::Big)?;
        let version = reader.read_i32(Endian::Little)?;
        let shape_type = ShapeType::from_i32(reader.read_i32(Endian::Little)?)?;
        let bounds = reader.read_f64_vec(8, Endian::Little)?;
        Ok(ShapefileHeader {
            file_length,
            version,
            shape_type,
            min_x: bounds[0],
            min_y: bounds[1],
            max_x: bounds[2],
            max_y: bounds[3],
            min_z: bounds[4],
            max_z: bounds[5],
            min_m: bounds[6],
            max_m: bounds[7],
        })
    }

    /// Write the full 100-byte layout.
    pub fn write(&self, writer: &mut ShapeByteWriter) -> Result<()> {
        writer.write_i32(FILE_CODE, Endian::Big)?;
        writer.write_bytes(&[0u8; 20])?;
        writer.write_i32(self.file_length, Endian::Big)?;
        writer.write_i32(self.version, Endian::Little)?;
        writer.write_i32(self.shape_type.to_i32(), Endian::Little)?;
        writer.write_f64_slice(
            &[
                self.min_x, self.min_y, self.max_x, self.max_y, self.min_z, self.max_z,
                self.min_m, self.max_m,
            ],
            Endian::Little,
        )
    }

    /// Seek back over an already-written header and patch the length field.
    pub fn patch_file_length(writer: &mut ShapeByteWriter, file_length_words: i32) -> Result<()> {
        let position = writer.position();
        writer.seek(FILE_LENGTH_OFFSET)?;
        writer.write_i32(file_length_words, Endian::Big)?;
        writer.seek(position)
    }

    /// Store an extent into the 8 bounding doubles.
    ///
    /// M and Z bounds are written as 0.0 when the shape type does not carry
    /// that dimension or the extent has no finite range for it; the format
    /// leaves those doubles unused but present.
    pub fn set_extent(&mut self, extent: &Extent) {
        self.min_x = extent.min_x;
        self.min_y = extent.min_y;
        self.max_x = extent.max_x;
        self.max_y = extent.max_y;
        if self.shape_type.has_m() && extent.has_m() {
            self.min_m = extent.min_m;
            self.max_m = extent.max_m;
        } else {
            self.min_m = 0.0;
            self.max_m = 0.0;
        }
        if self.shape_type.has_z() && extent.has_z() {
            self.min_z = extent.min_z;
            self.max_z = extent.max_z;
        } else {
            self.min_z = 0.0;
            self.max_z = 0.0;
        }
    }

    /// Rebuild an extent from the bounding doubles.
    ///
    /// Dimensions the shape type does not carry come back as the inverted
    /// sentinel range, so `has_m`/`has_z` on the result stay false.
    pub fn to_extent(&self) -> Extent {
        let mut extent = Extent::new(self.min_x, self.min_y, self.max_x, self.max_y);
        if self.shape_type.has_m() {
            extent.min_m = self.min_m;
            extent.max_m = self.max_m;
        }
        if self.shape_type.has_z() {
            extent.min_z = self.min_z;
            extent.max_z = self.max_z;
        }
        extent
    }
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "shape type:  {}", self.shape_type)?;
        writeln!(f, "version:     {}", self.version)?;
        writeln!(
            f,
            "file length: {} words ({} bytes)",
            self.file_length,
            self.file_length_bytes()
        )?;
        writeln!(f, "x range:     [{}, {}]", self.min_x, self.max_x)?;
        writeln!(f, "y range:     [{}, {}]", self.min_y, self.max_y)?;
        if self.shape_type.has_z() {
            writeln!(f, "z range:     [{}, {}]", self.min_z, self.max_z)?;
        }
        if self.shape_type.has_m() {
            writeln!(f, "m range:     [{}, {}]", self.min_m, self.max_m)?;
        }
        Ok(())
    }
}
