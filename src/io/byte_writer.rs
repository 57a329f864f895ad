//! Buffered binary writer, the mirror of [`ShapeByteReader`].
//!
//! Typed values are converted to bytes (with an optional endian flip) and
//! pushed into an in-memory buffer that is pasted to the file when full.
//! `close` flushes any partial buffer before releasing the handle; there is
//! no drop-based safety net, callers must close on every exit path.
//!
//! Seeking is deliberately more limited than on the read side: a target
//! inside the current buffer window just moves the in-buffer cursor, while
//! a target outside flushes the buffer and repositions the underlying file.
//! The dominant use is seeking back over an already-written header to patch
//! the file-length field once all records are known.
//!
//! [`ShapeByteReader`]: crate::io::ShapeByteReader

use crate::error::{Result, ShpError};
use crate::io::Endian;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Default write buffer size in bytes.
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 100_000;

/// Buffered binary writer over a file.
#[derive(Debug)]
pub struct ShapeByteWriter {
    path: PathBuf,
    file: Option<File>,
    buffer: Vec<u8>,
    /// Absolute file position of `buffer[0]`.
    buffer_start: u64,
    /// Write cursor inside the buffer.
    write_offset: usize,
    max_buffer_size: usize,
}

impl ShapeByteWriter {
    /// Create (truncate) a file for writing with the default buffer size.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_buffer_size(path, DEFAULT_WRITE_BUFFER_SIZE)
    }

    /// Create (truncate) a file with an explicit maximum buffer size.
    ///
    /// A zero buffer size is rejected eagerly.
    pub fn with_buffer_size<P: AsRef<Path>>(path: P, max_buffer_size: usize) -> Result<Self> {
        if max_buffer_size == 0 {
            return Err(ShpError::InvalidArgument(
                "max buffer size must be greater than zero".to_string(),
            ));
        }
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Some(file),
            buffer: Vec::new(),
            buffer_start: 0,
            write_offset: 0,
            max_buffer_size,
        })
    }

    /// Absolute position the next write lands at.
    pub fn position(&self) -> u64 {
        self.buffer_start + self.write_offset as u64
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            ShpError::InvalidArgument(format!("writer for {:?} is closed", self.path))
        })
    }

    /// Flush the whole buffer at `buffer_start` and reset it.
    fn paste_buffer(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let start = self.buffer_start;
        let len = self.buffer.len() as u64;
        let buf = std::mem::take(&mut self.buffer);
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(start))?;
        file.write_all(&buf)?;
        self.buffer_start = start + len;
        self.write_offset = 0;
        Ok(())
    }

    /// Raw byte-array writer: fills the buffer, flushing when full.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let mut idx = 0usize;
        while idx < bytes.len() {
            if self.write_offset == self.max_buffer_size {
                self.paste_buffer()?;
            }
            let space = self.max_buffer_size - self.write_offset;
            let n = space.min(bytes.len() - idx);
            let end = self.write_offset + n;
            if self.buffer.len() < end {
                self.buffer.resize(end, 0);
            }
            self.buffer[self.write_offset..end].copy_from_slice(&bytes[idx..idx + n]);
            self.write_offset = end;
            idx += n;
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Typed writes
    // -----------------------------------------------------------------

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    pub fn write_i16(&mut self, value: i16, endian: Endian) -> Result<()> {
        let mut buf = [0u8; 2];
        match endian {
            Endian::Little => LittleEndian::write_i16(&mut buf, value),
            Endian::Big => BigEndian::write_i16(&mut buf, value),
        }
        self.write_bytes(&buf)
    }

    pub fn write_i32(&mut self, value: i32, endian: Endian) -> Result<()> {
        let mut buf = [0u8; 4];
        match endian {
            Endian::Little => LittleEndian::write_i32(&mut buf, value),
            Endian::Big => BigEndian::write_i32(&mut buf, value),
        }
        self.write_bytes(&buf)
    }

    pub fn write_f64(&mut self, value: f64, endian: Endian) -> Result<()> {
        let mut buf = [0u8; 8];
        match endian {
            Endian::Little => LittleEndian::write_f64(&mut buf, value),
            Endian::Big => BigEndian::write_f64(&mut buf, value),
        }
        self.write_bytes(&buf)
    }

    /// Bulk write of doubles.
    pub fn write_f64_slice(&mut self, values: &[f64], endian: Endian) -> Result<()> {
        let mut raw = vec![0u8; values.len() * 8];
        match endian {
            Endian::Little => LittleEndian::write_f64_into(values, &mut raw),
            Endian::Big => BigEndian::write_f64_into(values, &mut raw),
        }
        self.write_bytes(&raw)
    }

    /// Bulk write of 32-bit integers.
    pub fn write_i32_slice(&mut self, values: &[i32], endian: Endian) -> Result<()> {
        let mut raw = vec![0u8; values.len() * 4];
        match endian {
            Endian::Little => LittleEndian::write_i32_into(values, &mut raw),
            Endian::Big => BigEndian::write_i32_into(values, &mut raw),
        }
        self.write_bytes(&raw)
    }

    /// Reposition the write cursor.
    ///
    /// In-window targets only move the in-buffer cursor; out-of-window
    /// targets flush the buffer and seek the underlying file.
    pub fn seek(&mut self, position: u64) -> Result<()> {
        let window_start = self.buffer_start;
        let window_end = self.buffer_start + self.buffer.len() as u64;
        if position >= window_start && position <= window_end {
            self.write_offset = (position - window_start) as usize;
        } else {
            self.paste_buffer()?;
            let file = self.file_mut()?;
            file.seek(SeekFrom::Start(position))?;
            self.buffer_start = position;
            self.write_offset = 0;
        }
        Ok(())
    }

    /// Flush any partial buffer and release the file handle.
    pub fn close(mut self) -> Result<()> {
        self.paste_buffer()?;
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("shp_byte_writer_{name}"))
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let err = ShapeByteWriter::with_buffer_size(temp_path("zero.bin"), 0).unwrap_err();
        assert!(matches!(err, ShpError::InvalidArgument(_)));
    }

    #[test]
    fn test_typed_writes_roundtrip_bytes() {
        let path = temp_path("typed.bin");
        let mut w = ShapeByteWriter::create(&path).unwrap();
        w.write_i32(1, Endian::Little).unwrap();
        w.write_i32(1, Endian::Big).unwrap();
        w.write_f64(1.5, Endian::Little).unwrap();
        w.close().unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(&data[0..4], &[1, 0, 0, 0]);
        assert_eq!(&data[4..8], &[0, 0, 0, 1]);
        assert_eq!(&data[8..16], &1.5f64.to_le_bytes());
    }

    #[test]
    fn test_small_buffer_flushes() {
        let path = temp_path("flush.bin");
        let mut w = ShapeByteWriter::with_buffer_size(&path, 3).unwrap();
        let payload: Vec<u8> = (0..32u8).collect();
        w.write_bytes(&payload).unwrap();
        w.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), payload);
    }

    #[test]
    fn test_seek_back_patches_field() {
        // The header-length patch pattern: placeholder, payload, seek back,
        // overwrite just the length field.
        let path = temp_path("patch.bin");
        let mut w = ShapeByteWriter::with_buffer_size(&path, 8).unwrap();
        w.write_i32(0, Endian::Big).unwrap();
        w.write_bytes(&[0xAA; 16]).unwrap();
        w.seek(0).unwrap();
        w.write_i32(99, Endian::Big).unwrap();
        w.close().unwrap();

        let data = std::fs::read(&path).unwrap();
        assert_eq!(data.len(), 20);
        assert_eq!(&data[0..4], &[0, 0, 0, 99]);
        assert_eq!(&data[4..], &[0xAA; 16]);
    }

    #[test]
    fn test_in_window_rewrite() {
        let path = temp_path("inwin.bin");
        let mut w = ShapeByteWriter::create(&path).unwrap();
        w.write_bytes(&[1, 2, 3, 4]).unwrap();
        w.seek(1).unwrap();
        w.write_u8(9).unwrap();
        w.seek(4).unwrap();
        w.write_u8(5).unwrap();
        w.close().unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 9, 3, 4, 5]);
    }
}
