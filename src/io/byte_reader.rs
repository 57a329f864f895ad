//! Buffered binary reader over a shapefile stream.
//!
//! Provides sequential, seekable, typed read access without a syscall per
//! primitive.  The reader tracks three offsets:
//!
//! - `file_offset`: absolute position consumed by callers,
//! - `buffer_offset`: start of the buffer relative to the file start
//!   (`-1` while no buffer is loaded),
//! - `read_offset`: cursor inside the buffer.
//!
//! When the remaining file bytes fit in one buffer load, the underlying
//! handle is dropped early so bulk reads do not pin OS handles for their
//! whole lifetime.  A later out-of-window seek reopens the file.
//!
//! End-of-stream is reported through the [`ReadOutcome`] value returned by
//! `read`, exactly once when `file_offset` reaches `file_length`.

use crate::error::{Result, ShpError};
use crate::io::Endian;
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Default read buffer size, roughly 9.6 MB.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 9_600_000;

/// Outcome of a read: whether the stream still has bytes after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// More bytes remain past the current position.
    Continuing,
    /// This read consumed the last byte of the file.
    EndOfStream,
}

/// Buffered, seekable binary reader over a file.
#[derive(Debug)]
pub struct ShapeByteReader {
    path: PathBuf,
    file: Option<File>,
    file_length: u64,
    file_offset: u64,
    buffer: Vec<u8>,
    buffer_offset: i64,
    read_offset: usize,
    max_buffer_size: usize,
    finished: bool,
}

impl ShapeByteReader {
    /// Open a file read-only with the default buffer size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_buffer_size(path, DEFAULT_READ_BUFFER_SIZE)
    }

    /// Open a file read-only with an explicit maximum buffer size.
    ///
    /// A zero buffer size is rejected eagerly.
    pub fn with_buffer_size<P: AsRef<Path>>(path: P, max_buffer_size: usize) -> Result<Self> {
        if max_buffer_size == 0 {
            return Err(ShpError::InvalidArgument(
                "max buffer size must be greater than zero".to_string(),
            ));
        }
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let file_length = file.metadata()?.len();
        Ok(Self {
            path,
            file: Some(file),
            file_length,
            file_offset: 0,
            buffer: Vec::new(),
            buffer_offset: -1,
            read_offset: 0,
            max_buffer_size,
            finished: false,
        })
    }

    /// Total length of the underlying file in bytes.
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    /// Absolute position consumed by callers.
    pub fn file_offset(&self) -> u64 {
        self.file_offset
    }

    /// Bytes remaining past the current position.
    pub fn remaining(&self) -> u64 {
        self.file_length - self.file_offset
    }

    /// Whether the last byte of the file has been consumed.
    pub fn is_finished(&self) -> bool {
        self.file_offset >= self.file_length
    }

    /// Whether the underlying OS handle has been released (the whole
    /// remainder fit in one buffer load).
    pub fn handle_closed(&self) -> bool {
        self.file.is_none()
    }

    fn end_of_stream(&self, offset: u64) -> ShpError {
        ShpError::EndOfStream {
            path: self.path.clone(),
            offset,
            file_length: self.file_length,
        }
    }

    /// Load the next buffer window.
    ///
    /// If the remaining file bytes fit in `max_buffer_size`, the remainder
    /// is loaded and the file handle released early.  Calling this after the
    /// stream is exhausted is an end-of-stream error.
    fn advance_buffer(&mut self) -> Result<()> {
        if self.file_offset >= self.file_length {
            return Err(self.end_of_stream(self.file_offset));
        }
        let remaining = self.file_length - self.file_offset;
        let load = remaining.min(self.max_buffer_size as u64) as usize;

        if self.file.is_none() {
            let mut f = File::open(&self.path)?;
            f.seek(SeekFrom::Start(self.file_offset))?;
            self.file = Some(f);
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| ShpError::Custom(format!("reader handle unavailable for {:?}", self.path)))?;

        self.buffer.resize(load, 0);
        file.read_exact(&mut self.buffer)?;
        self.buffer_offset = self.file_offset as i64;
        self.read_offset = 0;

        if remaining <= self.max_buffer_size as u64 {
            // The whole remainder is buffered; free the OS handle early.
            self.file = None;
        }
        Ok(())
    }

    /// Copy `count` bytes into `dest` starting at `index`, refilling the
    /// buffer as needed.
    ///
    /// Returns [`ReadOutcome::EndOfStream`] exactly once, on the read that
    /// consumes the final byte of the file.
    pub fn read(&mut self, dest: &mut [u8], index: usize, count: usize) -> Result<ReadOutcome> {
        if count as u64 > self.remaining() {
            return Err(self.end_of_stream(self.file_offset + count as u64));
        }
        let mut copied = 0usize;
        while copied < count {
            if self.buffer_offset < 0 || self.read_offset >= self.buffer.len() {
                self.advance_buffer()?;
            }
            let available = self.buffer.len() - self.read_offset;
            let n = available.min(count - copied);
            dest[index + copied..index + copied + n]
                .copy_from_slice(&self.buffer[self.read_offset..self.read_offset + n]);
            self.read_offset += n;
            self.file_offset += n as u64;
            copied += n;
        }
        if self.file_offset >= self.file_length && !self.finished {
            self.finished = true;
            return Ok(ReadOutcome::EndOfStream);
        }
        Ok(ReadOutcome::Continuing)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read(&mut buf, 0, N)?;
        Ok(buf)
    }

    /// Consume and discard `count` bytes.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        let mut scratch = vec![0u8; count];
        self.read(&mut scratch, 0, count)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Typed reads
    // -----------------------------------------------------------------

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self, endian: Endian) -> Result<i16> {
        let buf = self.read_array::<2>()?;
        Ok(match endian {
            Endian::Little => LittleEndian::read_i16(&buf),
            Endian::Big => BigEndian::read_i16(&buf),
        })
    }

    pub fn read_i32(&mut self, endian: Endian) -> Result<i32> {
        let buf = self.read_array::<4>()?;
        Ok(match endian {
            Endian::Little => LittleEndian::read_i32(&buf),
            Endian::Big => BigEndian::read_i32(&buf),
        })
    }

    pub fn read_f32(&mut self, endian: Endian) -> Result<f32> {
        let buf = self.read_array::<4>()?;
        Ok(match endian {
            Endian::Little => LittleEndian::read_f32(&buf),
            Endian::Big => BigEndian::read_f32(&buf),
        })
    }

    pub fn read_f64(&mut self, endian: Endian) -> Result<f64> {
        let buf = self.read_array::<8>()?;
        Ok(match endian {
            Endian::Little => LittleEndian::read_f64(&buf),
            Endian::Big => BigEndian::read_f64(&buf),
        })
    }

    /// Bulk read of `count` doubles.
    pub fn read_f64_vec(&mut self, count: usize, endian: Endian) -> Result<Vec<f64>> {
        let len = count * 8;
        let mut raw = vec![0u8; len];
        self.read(&mut raw, 0, len)?;
        let mut out = vec![0f64; count];
        match endian {
            Endian::Little => LittleEndian::read_f64_into(&raw, &mut out),
            Endian::Big => BigEndian::read_f64_into(&raw, &mut out),
        }
        Ok(out)
    }

    /// Bulk read of `count` 32-bit integers.
    pub fn read_i32_vec(&mut self, count: usize, endian: Endian) -> Result<Vec<i32>> {
        let len = count * 4;
        let mut raw = vec![0u8; len];
        self.read(&mut raw, 0, len)?;
        let mut out = vec![0i32; count];
        match endian {
            Endian::Little => LittleEndian::read_i32_into(&raw, &mut out),
            Endian::Big => BigEndian::read_i32_into(&raw, &mut out),
        }
        Ok(out)
    }

    /// Bulk read of `num_points` interleaved X/Y pairs (little-endian, the
    /// only order the format uses for coordinates).
    pub fn read_vertices(&mut self, num_points: usize) -> Result<Vec<f64>> {
        self.read_f64_vec(num_points * 2, Endian::Little)
    }

    /// Reposition the read cursor.
    ///
    /// Targets within the buffered window adjust offsets without touching
    /// the underlying descriptor.  Targets outside invalidate the buffer
    /// and reopen the file if the handle had been released.  Targets
    /// outside `[0, file_length)` are end-of-stream errors.
    pub fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<()> {
        let base = match origin {
            SeekOrigin::Begin => 0i64,
            SeekOrigin::Current => self.file_offset as i64,
            SeekOrigin::End => self.file_length as i64,
        };
        let target = base + offset;
        if target < 0 || target >= self.file_length as i64 {
            return Err(self.end_of_stream(target.max(0) as u64));
        }
        let target = target as u64;

        let window_start = self.buffer_offset;
        let window_end = self.buffer_offset + self.buffer.len() as i64;
        if window_start >= 0 && (target as i64) >= window_start && (target as i64) < window_end {
            // In-window: pure cursor arithmetic, no syscall.
            self.read_offset = (target as i64 - window_start) as usize;
            self.file_offset = target;
        } else {
            self.buffer.clear();
            self.buffer_offset = -1;
            self.read_offset = 0;
            self.file_offset = target;
            if self.file.is_none() {
                let mut f = File::open(&self.path)?;
                f.seek(SeekFrom::Start(target))?;
                self.file = Some(f);
            } else if let Some(f) = self.file.as_mut() {
                f.seek(SeekFrom::Start(target))?;
            }
        }
        self.finished = false;
        Ok(())
    }
}

/// Seek origin mirroring the Begin/Current/End contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Begin,
    Current,
    End,
}
