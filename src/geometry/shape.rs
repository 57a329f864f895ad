//! Shape records and their vertex ranges.
//!
//! Two representations share the same layout rules. A [`Shape`] owns its
//! vertex, Z and M arrays outright. A [`ShapeRange`] is the index-mode view
//! used when a whole file shares one flat vertex arena: it records where the
//! shape's points live as `(start, len)` pairs and carries no coordinate
//! data of its own. Extracting a [`Shape`] from a range deep-copies only
//! that sub-range, never the whole arena.

use crate::attributes::FieldValue;
use crate::error::{Result, ShpError};
use crate::geometry::{rings, Geometry, PolygonGeometry, ShapeFamily, ShapeType};
use crate::types::{Extent, Vertex};

/// One contiguous run of vertices: a ring or a polyline segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    pub start_index: usize,
    pub num_points: usize,
}

impl PartRange {
    pub fn new(start_index: usize, num_points: usize) -> Self {
        PartRange {
            start_index,
            num_points,
        }
    }

    /// One past the last vertex index.
    pub fn end_index(&self) -> usize {
        self.start_index + self.num_points
    }
}

/// Index-mode view of one shape inside a shared vertex arena.
///
/// Invariant: the parts tile `[start_index, start_index + num_points)`
/// exactly, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRange {
    pub shape_type: ShapeType,
    pub start_index: usize,
    pub num_points: usize,
    pub parts: Vec<PartRange>,
    pub extent: Extent,
}

impl ShapeRange {
    pub fn new(shape_type: ShapeType) -> Self {
        ShapeRange {
            shape_type,
            start_index: 0,
            num_points: 0,
            parts: Vec::new(),
            extent: Extent::default(),
        }
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// One past the last vertex index in the arena.
    pub fn end_index(&self) -> usize {
        self.start_index + self.num_points
    }

    /// Recompute the cached extent from the arena the range points into.
    ///
    /// `vertices` is the interleaved file-wide array; indices in the range
    /// are vertex indices, so they address `vertices[2 * i]`.
    pub fn calculate_extent(&mut self, vertices: &[f64]) {
        let mut extent = Extent::default();
        for i in self.start_index..self.end_index() {
            extent.expand_to_include(vertices[2 * i], vertices[2 * i + 1]);
        }
        self.extent = extent;
    }
}

/// One geometry record with its own coordinate storage.
///
/// `vertices` is X/Y interleaved (length `2 * num_points`). Z and M are
/// parallel arrays present only when the shape carries those dimensions.
/// The embedded range always starts at zero and describes this shape's own
/// arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub shape_type: ShapeType,
    pub vertices: Vec<f64>,
    pub z: Option<Vec<f64>>,
    pub m: Option<Vec<f64>>,
    pub attributes: Option<Vec<FieldValue>>,
    pub range: ShapeRange,
}

impl Shape {
    /// Empty shape of the given type.
    pub fn new(shape_type: ShapeType) -> Self {
        Shape {
            shape_type,
            vertices: Vec::new(),
            z: if shape_type.has_z() {
                Some(Vec::new())
            } else {
                None
            },
            m: None,
            attributes: None,
            range: ShapeRange::new(shape_type),
        }
    }

    pub fn num_points(&self) -> usize {
        self.vertices.len() / 2
    }

    pub fn num_parts(&self) -> usize {
        self.range.parts.len()
    }

    /// Vertex at a global (shape-local) index.
    pub fn vertex(&self, index: usize) -> Vertex {
        Vertex::new(self.vertices[2 * index], self.vertices[2 * index + 1])
    }

    /// All vertices of one part.
    pub fn part_vertices(&self, part: usize) -> Vec<Vertex> {
        let p = &self.range.parts[part];
        (p.start_index..p.end_index()).map(|i| self.vertex(i)).collect()
    }

    pub fn extent(&self) -> &Extent {
        &self.range.extent
    }

    /// Append one part's coordinates.
    ///
    /// Point and MultiPoint families keep a single part whose point count
    /// grows; Line and Polygon families get a fresh part per call.
    pub fn add_part(&mut self, points: &[Vertex]) {
        let start = self.num_points();
        for v in points {
            self.vertices.push(v.x);
            self.vertices.push(v.y);
            self.range.extent.expand_to_include(v.x, v.y);
        }
        if let Some(z) = &mut self.z {
            z.resize(start + points.len(), 0.0);
        }
        match self.shape_type.family() {
            ShapeFamily::Point | ShapeFamily::MultiPoint => match self.range.parts.first_mut() {
                Some(part) => part.num_points += points.len(),
                None => self.range.parts.push(PartRange::new(0, points.len())),
            },
            ShapeFamily::Line | ShapeFamily::Polygon => {
                self.range.parts.push(PartRange::new(start, points.len()));
            }
        }
        self.range.num_points = self.num_points();
        if let Some(m) = &mut self.m {
            m.resize(self.range.num_points, 0.0);
        }
    }

    /// Attach Z values; the shape type must carry a Z dimension and the
    /// array length must match the point count.
    pub fn set_z_values(&mut self, values: Vec<f64>) -> Result<()> {
        if !self.shape_type.has_z() {
            return Err(ShpError::InvalidArgument(format!(
                "shape type {} carries no z dimension",
                self.shape_type
            )));
        }
        if values.len() != self.num_points() {
            return Err(ShpError::InvalidArgument(format!(
                "z array length {} does not match point count {}",
                values.len(),
                self.num_points()
            )));
        }
        for &z in &values {
            self.range.extent.expand_to_include_z(z);
        }
        self.z = Some(values);
        Ok(())
    }

    /// Attach M values; the shape type must carry a measure dimension and
    /// the array length must match the point count.
    pub fn set_m_values(&mut self, values: Vec<f64>) -> Result<()> {
        if !self.shape_type.has_m() {
            return Err(ShpError::InvalidArgument(format!(
                "shape type {} carries no measure dimension",
                self.shape_type
            )));
        }
        if values.len() != self.num_points() {
            return Err(ShpError::InvalidArgument(format!(
                "m array length {} does not match point count {}",
                values.len(),
                self.num_points()
            )));
        }
        for &m in &values {
            self.range.extent.expand_to_include_m(m);
        }
        self.m = Some(values);
        Ok(())
    }

    /// Deep-copy one shape out of a shared arena.
    ///
    /// Copies only `range`'s sub-slice of the vertex, Z and M arrays and
    /// rebases the part indices to start at zero.
    pub fn from_range(
        range: &ShapeRange,
        vertices: &[f64],
        z: Option<&[f64]>,
        m: Option<&[f64]>,
        attributes: Option<Vec<FieldValue>>,
    ) -> Self {
        let lo = range.start_index;
        let hi = range.end_index();
        let parts = range
            .parts
            .iter()
            .map(|p| PartRange::new(p.start_index - lo, p.num_points))
            .collect();
        Shape {
            shape_type: range.shape_type,
            vertices: vertices[2 * lo..2 * hi].to_vec(),
            z: z.map(|z| z[lo..hi].to_vec()),
            m: m.map(|m| m[lo..hi].to_vec()),
            attributes,
            range: ShapeRange {
                shape_type: range.shape_type,
                start_index: 0,
                num_points: range.num_points,
                parts,
                extent: range.extent,
            },
        }
    }

    /// Build a shape from a hierarchical geometry.
    ///
    /// Polygon rings are normalized to the file convention on the way in:
    /// shells rewound clockwise, holes counter-clockwise, so the stored
    /// order is already what the encoder must emit and what winding-based
    /// reconstruction expects.
    pub fn from_geometry(geometry: &Geometry, shape_type: ShapeType) -> Result<Self> {
        let mut shape = Shape::new(shape_type);
        if geometry.is_empty() {
            return Ok(shape);
        }
        match (geometry, shape_type.family()) {
            (Geometry::Point(v), ShapeFamily::Point) => shape.add_part(&[*v]),
            (Geometry::MultiPoint(pts), ShapeFamily::MultiPoint) => shape.add_part(pts),
            (Geometry::LineString(pts), ShapeFamily::Line) => shape.add_part(pts),
            (Geometry::MultiLineString(lines), ShapeFamily::Line) => {
                for line in lines {
                    shape.add_part(line);
                }
            }
            (Geometry::Polygon(poly), ShapeFamily::Polygon) => shape.add_polygon(poly),
            (Geometry::MultiPolygon(polys), ShapeFamily::Polygon) => {
                for poly in polys {
                    shape.add_polygon(poly);
                }
            }
            _ => {
                return Err(ShpError::InvalidArgument(format!(
                    "geometry does not fit shape type {shape_type}"
                )))
            }
        }
        Ok(shape)
    }

    fn add_polygon(&mut self, poly: &PolygonGeometry) {
        let mut shell = poly.shell.clone();
        if rings::is_ccw(&shell) {
            shell.reverse();
        }
        self.add_part(&shell);
        for hole in &poly.holes {
            let mut hole = hole.clone();
            if !rings::is_ccw(&hole) {
                hole.reverse();
            }
            self.add_part(&hole);
        }
    }

    /// Convert back to a hierarchical geometry.
    ///
    /// Single-part lines and single-shell polygons come back unwrapped;
    /// multi variants are never produced with one element.
    pub fn to_geometry(&self) -> Geometry {
        if self.num_points() == 0 || self.shape_type == ShapeType::NullShape {
            return Geometry::Empty;
        }
        match self.shape_type.family() {
            ShapeFamily::Point => Geometry::Point(self.vertex(0)),
            ShapeFamily::MultiPoint => {
                Geometry::MultiPoint((0..self.num_points()).map(|i| self.vertex(i)).collect())
            }
            ShapeFamily::Line => {
                let mut lines: Vec<Vec<Vertex>> =
                    (0..self.num_parts()).map(|p| self.part_vertices(p)).collect();
                if lines.len() == 1 {
                    Geometry::LineString(lines.remove(0))
                } else {
                    Geometry::MultiLineString(lines)
                }
            }
            ShapeFamily::Polygon => {
                let ring_list: Vec<Vec<Vertex>> =
                    (0..self.num_parts()).map(|p| self.part_vertices(p)).collect();
                let mut polys = rings::assemble_polygons(ring_list);
                if polys.len() == 1 {
                    Geometry::Polygon(polys.remove(0))
                } else {
                    Geometry::MultiPolygon(polys)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_cw(x: f64, y: f64, size: f64) -> Vec<Vertex> {
        vec![
            Vertex::new(x, y),
            Vertex::new(x, y + size),
            Vertex::new(x + size, y + size),
            Vertex::new(x + size, y),
            Vertex::new(x, y),
        ]
    }

    #[test]
    fn test_add_part_point_family_grows_single_part() {
        let mut shape = Shape::new(ShapeType::MultiPoint);
        shape.add_part(&[Vertex::new(1.0, 2.0)]);
        shape.add_part(&[Vertex::new(3.0, 4.0)]);
        assert_eq!(shape.num_parts(), 1);
        assert_eq!(shape.num_points(), 2);
        assert_eq!(shape.range.parts[0].num_points, 2);
    }

    #[test]
    fn test_add_part_line_family_appends_parts() {
        let mut shape = Shape::new(ShapeType::PolyLine);
        shape.add_part(&[Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)]);
        shape.add_part(&[Vertex::new(5.0, 5.0), Vertex::new(6.0, 5.0)]);
        assert_eq!(shape.num_parts(), 2);
        assert_eq!(shape.range.parts[1].start_index, 2);
        assert_eq!(shape.extent().max_x, 6.0);
    }

    #[test]
    fn test_polygon_winding_normalized_on_build() {
        let mut shell = square_cw(0.0, 0.0, 10.0);
        shell.reverse(); // deliberately mis-wound
        let hole = square_cw(2.0, 2.0, 3.0); // holes must be CCW, this is CW
        let geometry = Geometry::Polygon(PolygonGeometry {
            shell,
            holes: vec![hole],
        });
        let shape = Shape::from_geometry(&geometry, ShapeType::Polygon).unwrap();
        assert!(!rings::is_ccw(&shape.part_vertices(0)));
        assert!(rings::is_ccw(&shape.part_vertices(1)));
    }

    #[test]
    fn test_geometry_roundtrip_polygon_with_hole() {
        let geometry = Geometry::Polygon(PolygonGeometry {
            shell: square_cw(0.0, 0.0, 10.0),
            holes: vec![{
                let mut h = square_cw(2.0, 2.0, 3.0);
                h.reverse();
                h
            }],
        });
        let shape = Shape::from_geometry(&geometry, ShapeType::Polygon).unwrap();
        match shape.to_geometry() {
            Geometry::Polygon(p) => {
                assert_eq!(p.shell.len(), 5);
                assert_eq!(p.holes.len(), 1);
            }
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn test_single_part_line_unwrapped() {
        let geometry = Geometry::LineString(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)]);
        let shape = Shape::from_geometry(&geometry, ShapeType::PolyLine).unwrap();
        assert!(matches!(shape.to_geometry(), Geometry::LineString(_)));
    }

    #[test]
    fn test_from_range_deep_copies_subrange() {
        // Arena with two shapes: points 0..2 and 2..5.
        let vertices = vec![0.0, 0.0, 1.0, 1.0, 10.0, 10.0, 11.0, 11.0, 12.0, 12.0];
        let z = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let mut range = ShapeRange::new(ShapeType::PolyLineZ);
        range.start_index = 2;
        range.num_points = 3;
        range.parts = vec![PartRange::new(2, 3)];
        range.calculate_extent(&vertices);

        let shape = Shape::from_range(&range, &vertices, Some(&z), None, None);
        assert_eq!(shape.num_points(), 3);
        assert_eq!(shape.vertices, vec![10.0, 10.0, 11.0, 11.0, 12.0, 12.0]);
        assert_eq!(shape.z.as_deref(), Some(&[2.0, 3.0, 4.0][..]));
        assert_eq!(shape.range.parts[0].start_index, 0);
        assert_eq!(shape.extent().min_x, 10.0);
    }

    #[test]
    fn test_measures_rejected_on_plain_types() {
        let mut plain = Shape::new(ShapeType::Polygon);
        plain.add_part(&square_cw(0.0, 0.0, 4.0));
        assert!(plain.set_m_values(vec![0.0; 5]).is_err());
        assert!(plain.set_z_values(vec![0.0; 5]).is_err());

        let mut measured = Shape::new(ShapeType::PolyLineM);
        measured.add_part(&[Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)]);
        assert!(measured.set_m_values(vec![1.0, 2.0]).is_ok());
        assert!(measured.set_z_values(vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_z_length_mismatch_rejected() {
        let mut shape = Shape::new(ShapeType::PointZ);
        shape.add_part(&[Vertex::new(1.0, 2.0)]);
        assert!(shape.set_z_values(vec![1.0, 2.0]).is_err());
        assert!(shape.set_z_values(vec![7.5]).is_ok());
        assert_eq!(shape.extent().max_z, 7.5);
    }
}
