//! Variable-length shape record codec.
//!
//! Every record starts with a big-endian `(record number, content length)`
//! pair followed by a little-endian shape-type tag and the family-specific
//! payload. Content lengths are measured in 16-bit words.
//!
//! The M block has no tag bit anywhere in the format. Its presence is
//! inferred by comparing the declared content length against the byte count
//! implied by the mandatory fields: leftover room means an M range and
//! array follow. Z blocks, by contrast, are mandatory for Z shape types.

use crate::error::{Result, ShpError};
use crate::geometry::{PartRange, Shape, ShapeFamily, ShapeType};
use crate::io::{Endian, ShapeByteReader, ShapeByteWriter};
use crate::types::Vertex;

/// Big-endian record preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_number: i32,
    pub content_words: i32,
}

/// Read the 8-byte record preamble.
pub fn read_record_header(reader: &mut ShapeByteReader) -> Result<RecordHeader> {
    let record_number = reader.read_i32(Endian::Big)?;
    let content_words = reader.read_i32(Endian::Big)?;
    Ok(RecordHeader {
        record_number,
        content_words,
    })
}

/// Mandatory content bytes for a record, excluding any M block.
///
/// Includes the 4-byte shape type tag. `num_parts` is ignored for point
/// and multipoint families.
fn mandatory_bytes(shape_type: ShapeType, num_parts: usize, num_points: usize) -> u64 {
    let p = num_parts as u64;
    let n = num_points as u64;
    match shape_type {
        ShapeType::NullShape => 4,
        ShapeType::Point | ShapeType::PointM => 20,
        ShapeType::PointZ => 28,
        ShapeType::MultiPoint | ShapeType::MultiPointM => 40 + 16 * n,
        ShapeType::MultiPointZ => 40 + 16 * n + 16 + 8 * n,
        ShapeType::PolyLine
        | ShapeType::PolyLineM
        | ShapeType::Polygon
        | ShapeType::PolygonM => 44 + 4 * p + 16 * n,
        ShapeType::PolyLineZ | ShapeType::PolygonZ => 44 + 4 * p + 16 * n + 16 + 8 * n,
    }
}

/// Size of the optional M block in bytes: the M range plus one double per
/// point (the point families have no range pair, just the single value).
fn m_block_bytes(shape_type: ShapeType, num_points: usize) -> u64 {
    match shape_type.family() {
        ShapeFamily::Point => 8,
        _ => 16 + 8 * num_points as u64,
    }
}

fn declared_bytes(content_words: i32) -> u64 {
    content_words.max(0) as u64 * 2
}

fn length_mismatch(record: usize, declared: i32, required_bytes: u64) -> ShpError {
    ShpError::ContentLengthMismatch {
        record,
        declared,
        required: required_bytes.div_ceil(2) as i32,
    }
}

/// Decode one record; the reader must be positioned at the shape-type tag.
///
/// `content_words` is the declared content length from the record header
/// (or the index file), which drives the M-block inference.
pub fn decode_record(
    reader: &mut ShapeByteReader,
    record: usize,
    content_words: i32,
) -> Result<Shape> {
    let tag = reader.read_i32(Endian::Little)?;
    let shape_type = ShapeType::from_i32(tag)?;
    if shape_type == ShapeType::NullShape {
        return Ok(Shape::new(ShapeType::NullShape));
    }
    match shape_type.family() {
        ShapeFamily::Point => decode_point(reader, record, content_words, shape_type),
        ShapeFamily::MultiPoint => decode_multipoint(reader, record, content_words, shape_type),
        ShapeFamily::Line | ShapeFamily::Polygon => {
            decode_poly(reader, record, content_words, shape_type)
        }
    }
}

fn decode_point(
    reader: &mut ShapeByteReader,
    record: usize,
    content_words: i32,
    shape_type: ShapeType,
) -> Result<Shape> {
    let declared = declared_bytes(content_words);
    let mandatory = mandatory_bytes(shape_type, 1, 1);
    if declared < mandatory {
        return Err(length_mismatch(record, content_words, mandatory));
    }
    let x = reader.read_f64(Endian::Little)?;
    let y = reader.read_f64(Endian::Little)?;
    let mut shape = Shape::new(shape_type);
    shape.add_part(&[Vertex::new(x, y)]);
    if shape_type.has_z() {
        let z = reader.read_f64(Endian::Little)?;
        shape.set_z_values(vec![z])?;
    }
    let has_m_block =
        shape_type.has_m() && declared >= mandatory + m_block_bytes(shape_type, 1);
    if has_m_block {
        let m = reader.read_f64(Endian::Little)?;
        shape.set_m_values(vec![m])?;
    }
    Ok(shape)
}

fn decode_multipoint(
    reader: &mut ShapeByteReader,
    record: usize,
    content_words: i32,
    shape_type: ShapeType,
) -> Result<Shape> {
    let declared = declared_bytes(content_words);
    let box_values = reader.read_f64_vec(4, Endian::Little)?;
    let num_points = read_count(reader, "point count")?;
    let mandatory = mandatory_bytes(shape_type, 1, num_points);
    if declared < mandatory {
        return Err(length_mismatch(record, content_words, mandatory));
    }

    let vertices = reader.read_vertices(num_points)?;
    let mut shape = Shape::new(shape_type);
    shape.add_part(&to_vertex_list(&vertices));
    if shape_type.has_z() {
        reader.skip(16)?; // z range, recomputed from the values
        let z = reader.read_f64_vec(num_points, Endian::Little)?;
        shape.set_z_values(z)?;
    }
    if shape_type.has_m() && declared >= mandatory + m_block_bytes(shape_type, num_points) {
        reader.skip(16)?;
        let m = reader.read_f64_vec(num_points, Endian::Little)?;
        shape.set_m_values(m)?;
    }
    apply_box(&mut shape, &box_values);
    Ok(shape)
}

fn decode_poly(
    reader: &mut ShapeByteReader,
    record: usize,
    content_words: i32,
    shape_type: ShapeType,
) -> Result<Shape> {
    let declared = declared_bytes(content_words);
    let box_values = reader.read_f64_vec(4, Endian::Little)?;
    let num_parts = read_count(reader, "part count")?;
    let num_points = read_count(reader, "point count")?;
    let mandatory = mandatory_bytes(shape_type, num_parts, num_points);
    if declared < mandatory {
        return Err(length_mismatch(record, content_words, mandatory));
    }

    let starts = reader.read_i32_vec(num_parts, Endian::Little)?;
    let parts = part_ranges(&starts, num_points)?;
    let vertices = reader.read_vertices(num_points)?;

    let mut shape = Shape::new(shape_type);
    let all = to_vertex_list(&vertices);
    for part in &parts {
        shape.add_part(&all[part.start_index..part.end_index()]);
    }
    if shape_type.has_z() {
        reader.skip(16)?;
        let z = reader.read_f64_vec(num_points, Endian::Little)?;
        shape.set_z_values(z)?;
    }
    if shape_type.has_m() && declared >= mandatory + m_block_bytes(shape_type, num_points) {
        reader.skip(16)?;
        let m = reader.read_f64_vec(num_points, Endian::Little)?;
        shape.set_m_values(m)?;
    }
    apply_box(&mut shape, &box_values);
    Ok(shape)
}

fn read_count(reader: &mut ShapeByteReader, what: &str) -> Result<usize> {
    let value = reader.read_i32(Endian::Little)?;
    if value < 0 {
        return Err(ShpError::InvalidFormat(format!("negative {what}: {value}")));
    }
    Ok(value as usize)
}

/// Convert the on-disk part start indices to `(start, len)` ranges.
fn part_ranges(starts: &[i32], num_points: usize) -> Result<Vec<PartRange>> {
    let mut parts = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let start = start as i64;
        let end = starts
            .get(i + 1)
            .map(|&s| s as i64)
            .unwrap_or(num_points as i64);
        if start < 0 || end < start || end > num_points as i64 || (i == 0 && start != 0) {
            return Err(ShpError::InvalidFormat(format!(
                "part start indices {starts:?} do not tile {num_points} points"
            )));
        }
        parts.push(PartRange::new(start as usize, (end - start) as usize));
    }
    Ok(parts)
}

fn to_vertex_list(interleaved: &[f64]) -> Vec<Vertex> {
    interleaved
        .chunks_exact(2)
        .map(|xy| Vertex::new(xy[0], xy[1]))
        .collect()
}

fn apply_box(shape: &mut Shape, box_values: &[f64]) {
    shape.range.extent.min_x = box_values[0];
    shape.range.extent.min_y = box_values[1];
    shape.range.extent.max_x = box_values[2];
    shape.range.extent.max_y = box_values[3];
}

/// Content length of a shape's record in 16-bit words.
///
/// Empty geometry always serializes as a NullShape record of 2 words.
pub fn content_length_words(shape: &Shape) -> i32 {
    if shape.num_points() == 0 || shape.shape_type == ShapeType::NullShape {
        return 2;
    }
    let mut bytes = mandatory_bytes(shape.shape_type, shape.num_parts(), shape.num_points());
    if shape.shape_type.has_m() && shape.m.is_some() {
        bytes += m_block_bytes(shape.shape_type, shape.num_points());
    }
    (bytes / 2) as i32
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for &v in values {
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
    }
    if values.is_empty() {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

/// Encode one record, preamble included; returns the content length in
/// 16-bit words for the caller's index entry.
pub fn write_record(
    writer: &mut ShapeByteWriter,
    record_number: i32,
    shape: &Shape,
) -> Result<i32> {
    let content_words = content_length_words(shape);
    writer.write_i32(record_number, Endian::Big)?;
    writer.write_i32(content_words, Endian::Big)?;

    if content_words == 2 {
        writer.write_i32(ShapeType::NullShape.to_i32(), Endian::Little)?;
        return Ok(content_words);
    }

    writer.write_i32(shape.shape_type.to_i32(), Endian::Little)?;
    let extent = shape.extent();
    match shape.shape_type.family() {
        ShapeFamily::Point => {
            writer.write_f64(shape.vertices[0], Endian::Little)?;
            writer.write_f64(shape.vertices[1], Endian::Little)?;
            if shape.shape_type.has_z() {
                if let Some(z) = &shape.z {
                    writer.write_f64(z[0], Endian::Little)?;
                }
            }
            if shape.shape_type.has_m() {
                if let Some(m) = &shape.m {
                    writer.write_f64(m[0], Endian::Little)?;
                }
            }
        }
        ShapeFamily::MultiPoint => {
            writer.write_f64_slice(
                &[extent.min_x, extent.min_y, extent.max_x, extent.max_y],
                Endian::Little,
            )?;
            writer.write_i32(shape.num_points() as i32, Endian::Little)?;
            writer.write_f64_slice(&shape.vertices, Endian::Little)?;
            write_measure_blocks(writer, shape)?;
        }
        ShapeFamily::Line | ShapeFamily::Polygon => {
            writer.write_f64_slice(
                &[extent.min_x, extent.min_y, extent.max_x, extent.max_y],
                Endian::Little,
            )?;
            writer.write_i32(shape.num_parts() as i32, Endian::Little)?;
            writer.write_i32(shape.num_points() as i32, Endian::Little)?;
            let starts: Vec<i32> = shape
                .range
                .parts
                .iter()
                .map(|p| p.start_index as i32)
                .collect();
            writer.write_i32_slice(&starts, Endian::Little)?;
            writer.write_f64_slice(&shape.vertices, Endian::Little)?;
            write_measure_blocks(writer, shape)?;
        }
    }
    Ok(content_words)
}

/// Z and M blocks for the array families.
///
/// Gated on the shape type, not just array presence, so a stray array on a
/// plain shape can never push the payload past the declared content length.
fn write_measure_blocks(writer: &mut ShapeByteWriter, shape: &Shape) -> Result<()> {
    if shape.shape_type.has_z() {
        if let Some(z) = &shape.z {
            let (min_z, max_z) = value_range(z);
            writer.write_f64(min_z, Endian::Little)?;
            writer.write_f64(max_z, Endian::Little)?;
            writer.write_f64_slice(z, Endian::Little)?;
        }
    }
    if shape.shape_type.has_m() {
        if let Some(m) = &shape.m {
            let (min_m, max_m) = value_range(m);
            writer.write_f64(min_m, Endian::Little)?;
            writer.write_f64(max_m, Endian::Little)?;
            writer.write_f64_slice(m, Endian::Little)?;
        }
    }
    Ok(())
}
