//! The shapefile dataset: open, inspect, append and save whole files.
//!
//! A dataset keeps every shape's coordinates in one flat, file-wide vertex
//! arena with per-shape [`ShapeRange`] views, so opening a large file costs
//! one allocation per parallel array instead of one per shape. Extracting a
//! [`Shape`] copies just that shape's sub-range out of the arena.
//!
//! Saving streams records behind a placeholder header, then seeks back and
//! patches the file-length field once every record is written, and finally
//! emits the companion `.shx` index (plus `.prj` when a projection is
//! attached). Attribute rows ride along through the in-memory table; the
//! `.dbf` file itself belongs to an external collaborator.

use crate::attributes::{AttributeSource, FieldValue, MemoryAttributeSource};
use crate::error::{Result, ShpError};
use crate::geometry::{Feature, Geometry, PartRange, Shape, ShapeRange, ShapeType};
use crate::io::header::{ShapefileHeader, HEADER_SIZE};
use crate::io::record;
use crate::io::shx::{self, ShxRecord};
use crate::io::{SeekOrigin, ShapeByteReader, ShapeByteWriter};
use crate::progress::{NullProgress, PercentStepper, ProgressSink};
use crate::types::Extent;
use std::path::{Path, PathBuf};

/// Measure values below this threshold mean "no data" in the format.
pub const M_NO_DATA_THRESHOLD: f64 = -1.0e38;
/// Fill value for points that carry no measure in a file where others do.
pub const M_NO_DATA: f64 = -1.0e39;

/// An open shapefile dataset in index mode.
#[derive(Debug)]
pub struct Shapefile {
    pub file_name: PathBuf,
    pub header: ShapefileHeader,
    /// File-wide interleaved X/Y arena.
    vertices: Vec<f64>,
    /// Parallel Z arena, present only for Z shape types.
    z: Option<Vec<f64>>,
    /// Parallel M arena, allocated lazily when the first measure arrives.
    m: Option<Vec<f64>>,
    ranges: Vec<ShapeRange>,
    pub attributes: MemoryAttributeSource,
    /// Raw `.prj` contents, attached but never interpreted here.
    pub projection: Option<String>,
}

impl Shapefile {
    /// New, empty dataset of the given type.
    pub fn new(shape_type: ShapeType) -> Self {
        Shapefile {
            file_name: PathBuf::new(),
            header: ShapefileHeader::new(shape_type),
            vertices: Vec::new(),
            z: if shape_type.has_z() {
                Some(Vec::new())
            } else {
                None
            },
            m: None,
            ranges: Vec::new(),
            attributes: MemoryAttributeSource::new(),
            projection: None,
        }
    }

    /// Open a `.shp` file and load every record into the arena.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_progress(path, &mut NullProgress)
    }

    /// Open with progress reporting at whole-percent steps of the file
    /// length; cancellation through the sink aborts between shapes.
    ///
    /// The companion `.shx` is consulted for record content lengths when it
    /// exists; otherwise the per-record headers in the `.shp` stream are
    /// authoritative.
    pub fn open_with_progress<P: AsRef<Path>>(
        path: P,
        progress: &mut dyn ProgressSink,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = ShapeByteReader::open(&path)?;
        let header = ShapefileHeader::read(&mut reader, &path)?;
        let mut file = Shapefile::new(header.shape_type);
        file.header = header;
        file.file_name = path.clone();

        let index = match shx::read_index(&companion(&path, "shx")) {
            Ok((_, records)) => Some(records),
            Err(ShpError::Io(_)) => None,
            Err(e) => return Err(e),
        };

        let file_length = reader.file_length();
        let mut stepper = PercentStepper::new(file_length);
        let mut record_index = 0usize;
        let mut position = HEADER_SIZE;
        while position < file_length {
            let rec_header = record::read_record_header(&mut reader)?;
            let content_words = match &index {
                Some(entries) => entries
                    .get(record_index)
                    .map(|e| e.content_words)
                    .unwrap_or(rec_header.content_words),
                None => rec_header.content_words,
            };
            let shape = record::decode_record(&mut reader, record_index, content_words)?;
            advance_position(&mut position, content_words);
            // The decoder stops at the fields it understands; realign on the
            // declared record boundary so trailing declared bytes (too short
            // to be a measure block) cannot shift every later record.
            if position < file_length && reader.file_offset() != position {
                reader.seek(position as i64, SeekOrigin::Begin)?;
            }
            file.push_shape(shape)?;
            record_index += 1;
            stepper.step(position.min(file_length), progress);
            if progress.is_cancelled() {
                return Err(ShpError::Cancelled);
            }
        }

        let prj = companion(&path, "prj");
        if prj.exists() {
            file.projection = Some(std::fs::read_to_string(prj)?);
        }
        Ok(file)
    }

    pub fn shape_type(&self) -> ShapeType {
        self.header.shape_type
    }

    pub fn num_shapes(&self) -> usize {
        self.ranges.len()
    }

    /// Index-mode view of one shape.
    pub fn range(&self, index: usize) -> Option<&ShapeRange> {
        self.ranges.get(index)
    }

    /// Extract one shape as an independent deep copy of its sub-range.
    pub fn shape(&self, index: usize) -> Result<Shape> {
        let range = self.ranges.get(index).ok_or_else(|| {
            ShpError::InvalidArgument(format!(
                "shape index {index} out of bounds for {} shapes",
                self.ranges.len()
            ))
        })?;
        let attributes = if index < self.attributes.num_rows() {
            Some(self.attributes.get_attributes(index, 1)?.remove(0))
        } else {
            None
        };
        Ok(Shape::from_range(
            range,
            &self.vertices,
            self.z.as_deref(),
            self.m.as_deref(),
            attributes,
        ))
    }

    /// Geometry plus attribute row for one shape.
    pub fn feature(&self, index: usize) -> Result<Feature> {
        let shape = self.shape(index)?;
        let attributes = shape.attributes.clone().unwrap_or_default();
        Ok(Feature::new(shape.to_geometry(), attributes))
    }

    /// Union of all per-shape extents.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent::default();
        for range in &self.ranges {
            extent.expand_to_include_extent(&range.extent);
        }
        extent
    }

    /// Indices of shapes whose extent intersects the query extent.
    pub fn select(&self, query: &Extent) -> Vec<usize> {
        self.ranges
            .iter()
            .enumerate()
            .filter(|(_, r)| r.extent.intersects(query))
            .map(|(i, _)| i)
            .collect()
    }

    /// Append a shape built from a geometry, with its attribute row.
    pub fn add_feature(&mut self, geometry: &Geometry, row: Vec<FieldValue>) -> Result<usize> {
        let mut shape = Shape::from_geometry(geometry, self.header.shape_type)?;
        shape.attributes = Some(row);
        self.add_shape(shape)
    }

    /// Append one shape to the arena.
    ///
    /// The shape's type must match the dataset's; NullShape records are the
    /// one exception, valid in any file.
    pub fn add_shape(&mut self, shape: Shape) -> Result<usize> {
        if shape.shape_type != self.header.shape_type && shape.shape_type != ShapeType::NullShape {
            return Err(ShpError::InvalidArgument(format!(
                "cannot add a {} shape to a {} shapefile",
                shape.shape_type, self.header.shape_type
            )));
        }
        if let Some(row) = shape.attributes.clone() {
            self.attributes.add_row(row)?;
        }
        self.push_shape(shape)
    }

    fn push_shape(&mut self, shape: Shape) -> Result<usize> {
        let start = self.vertices.len() / 2;
        let n = shape.num_points();
        self.vertices.extend_from_slice(&shape.vertices);

        if let Some(arena_z) = &mut self.z {
            match &shape.z {
                Some(z) => arena_z.extend_from_slice(z),
                None => arena_z.resize(start + n, 0.0),
            }
        }
        match (&mut self.m, &shape.m) {
            (Some(arena_m), Some(m)) => arena_m.extend_from_slice(m),
            (Some(arena_m), None) => arena_m.resize(start + n, M_NO_DATA),
            (None, Some(m)) => {
                // First measured shape: backfill everything before it.
                let mut arena_m = vec![M_NO_DATA; start];
                arena_m.extend_from_slice(m);
                self.m = Some(arena_m);
            }
            (None, None) => {}
        }

        let parts = shape
            .range
            .parts
            .iter()
            .map(|p| PartRange::new(p.start_index + start, p.num_points))
            .collect();
        self.ranges.push(ShapeRange {
            shape_type: shape.shape_type,
            start_index: start,
            num_points: n,
            parts,
            extent: shape.range.extent,
        });
        Ok(self.ranges.len() - 1)
    }

    /// Save back to the file the dataset was opened from.
    pub fn save(&mut self) -> Result<()> {
        if self.file_name.as_os_str().is_empty() {
            return Err(ShpError::InvalidArgument(
                "dataset has no file name; use save_as".to_string(),
            ));
        }
        let path = self.file_name.clone();
        self.save_as_with_progress(path, true, &mut NullProgress)
    }

    /// Save to a new path; refuses to clobber an existing file unless
    /// `overwrite` is set.
    pub fn save_as<P: AsRef<Path>>(&mut self, path: P, overwrite: bool) -> Result<()> {
        self.save_as_with_progress(path, overwrite, &mut NullProgress)
    }

    pub fn save_as_with_progress<P: AsRef<Path>>(
        &mut self,
        path: P,
        overwrite: bool,
        progress: &mut dyn ProgressSink,
    ) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if path.exists() && !overwrite {
            return Err(ShpError::InvalidArgument(format!(
                "{path:?} already exists and overwrite is not set"
            )));
        }

        let extent = self.extent();
        if extent.is_empty() {
            // A file of only null shapes has no data extent; zero bounds.
            self.header.set_extent(&Extent::new(0.0, 0.0, 0.0, 0.0));
        } else {
            self.header.set_extent(&extent);
        }
        let mut writer = ShapeByteWriter::create(&path)?;
        self.header.write(&mut writer)?;

        let mut index = Vec::with_capacity(self.ranges.len());
        let mut offset_words = (HEADER_SIZE / 2) as i32;
        let mut stepper = PercentStepper::new(self.ranges.len() as u64);
        for i in 0..self.ranges.len() {
            let shape = self.shape(i)?;
            let content_words = record::write_record(&mut writer, i as i32 + 1, &shape)?;
            index.push(ShxRecord::new(offset_words, content_words));
            offset_words += 4 + content_words;
            stepper.step(i as u64 + 1, progress);
            if progress.is_cancelled() {
                return Err(ShpError::Cancelled);
            }
        }

        self.header.file_length = offset_words;
        ShapefileHeader::patch_file_length(&mut writer, offset_words)?;
        writer.close()?;

        shx::write_index(&companion(&path, "shx"), &self.header, &index)?;
        if let Some(projection) = &self.projection {
            std::fs::write(companion(&path, "prj"), projection)?;
        }
        self.file_name = path;
        Ok(())
    }
}

/// Sibling path with a different extension (`.shp` -> `.shx`, `.prj`).
fn companion(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Advance the stream position past a record: 8-byte preamble plus content.
fn advance_position(position: &mut u64, content_words: i32) {
    *position += 8 + content_words.max(0) as u64 * 2;
}
