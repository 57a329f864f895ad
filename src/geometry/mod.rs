//! Geometry model: shape type tags, geometry families and the hierarchical
//! geometry objects that shapes convert to and from.
//!
//! The on-disk discriminant is [`ShapeType`], a closed 13-value tag set.
//! Family dispatch (point vs. multipoint vs. line vs. polygon) and the
//! coordinate dimensionality (plain XY, +M, +Z) are derived from the tag,
//! never stored separately, so they can never disagree with it.

pub mod rings;
pub mod shape;

pub use shape::{PartRange, Shape, ShapeRange};

use crate::attributes::FieldValue;
use crate::error::{Result, ShpError};
use crate::types::Vertex;
use std::fmt;

/// On-disk shape type tag.
///
/// MultiPatch (31) exists in the format but is not supported; the decoder
/// rejects it with [`ShpError::UnsupportedShapeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeType {
    NullShape,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
}

/// Geometry family a shape type belongs to, used to pick the record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    Point,
    MultiPoint,
    Line,
    Polygon,
}

/// Coordinate dimensionality of a shape type.
///
/// `Z` implies that an M block may also be present; M-block presence on disk
/// is inferred from record length, not from this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateType {
    Xy,
    M,
    Z,
}

impl ShapeType {
    /// Parse the little-endian on-disk tag.
    pub fn from_i32(value: i32) -> Result<Self> {
        match value {
            0 => Ok(ShapeType::NullShape),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::MultiPoint),
            11 => Ok(ShapeType::PointZ),
            13 => Ok(ShapeType::PolyLineZ),
            15 => Ok(ShapeType::PolygonZ),
            18 => Ok(ShapeType::MultiPointZ),
            21 => Ok(ShapeType::PointM),
            23 => Ok(ShapeType::PolyLineM),
            25 => Ok(ShapeType::PolygonM),
            28 => Ok(ShapeType::MultiPointM),
            other => Err(ShpError::UnsupportedShapeType(other)),
        }
    }

    /// On-disk tag value.
    pub fn to_i32(self) -> i32 {
        match self {
            ShapeType::NullShape => 0,
            ShapeType::Point => 1,
            ShapeType::PolyLine => 3,
            ShapeType::Polygon => 5,
            ShapeType::MultiPoint => 8,
            ShapeType::PointZ => 11,
            ShapeType::PolyLineZ => 13,
            ShapeType::PolygonZ => 15,
            ShapeType::MultiPointZ => 18,
            ShapeType::PointM => 21,
            ShapeType::PolyLineM => 23,
            ShapeType::PolygonM => 25,
            ShapeType::MultiPointM => 28,
        }
    }

    /// Geometry family of this tag.
    ///
    /// `NullShape` has no family of its own; it is grouped with `Point`
    /// because a null record carries no layout decisions at all.
    pub fn family(self) -> ShapeFamily {
        match self {
            ShapeType::NullShape | ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => {
                ShapeFamily::Point
            }
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeFamily::MultiPoint
            }
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => ShapeFamily::Line,
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeFamily::Polygon,
        }
    }

    /// Coordinate dimensionality of this tag.
    pub fn coordinate_type(self) -> CoordinateType {
        match self {
            ShapeType::PointZ
            | ShapeType::PolyLineZ
            | ShapeType::PolygonZ
            | ShapeType::MultiPointZ => CoordinateType::Z,
            ShapeType::PointM
            | ShapeType::PolyLineM
            | ShapeType::PolygonM
            | ShapeType::MultiPointM => CoordinateType::M,
            _ => CoordinateType::Xy,
        }
    }

    /// Whether records of this type carry a Z block.
    pub fn has_z(self) -> bool {
        self.coordinate_type() == CoordinateType::Z
    }

    /// Whether records of this type may carry an M block.
    pub fn has_m(self) -> bool {
        matches!(self.coordinate_type(), CoordinateType::M | CoordinateType::Z)
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A polygon: one exterior shell with zero or more interior holes.
///
/// Ring winding in memory mirrors the file convention: shells clockwise,
/// holes counter-clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGeometry {
    pub shell: Vec<Vertex>,
    pub holes: Vec<Vec<Vertex>>,
}

/// Hierarchical geometry, the conversion target of a decoded shape.
///
/// Multi variants are never produced with a single element; a one-part line
/// converts to `LineString`, a one-shell polygon set to `Polygon`.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Empty,
    Point(Vertex),
    MultiPoint(Vec<Vertex>),
    LineString(Vec<Vertex>),
    MultiLineString(Vec<Vec<Vertex>>),
    Polygon(PolygonGeometry),
    MultiPolygon(Vec<PolygonGeometry>),
}

impl Geometry {
    /// Total vertex count across all parts.
    pub fn num_points(&self) -> usize {
        match self {
            Geometry::Empty => 0,
            Geometry::Point(_) => 1,
            Geometry::MultiPoint(pts) | Geometry::LineString(pts) => pts.len(),
            Geometry::MultiLineString(lines) => lines.iter().map(Vec::len).sum(),
            Geometry::Polygon(p) => p.shell.len() + p.holes.iter().map(Vec::len).sum::<usize>(),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .map(|p| p.shell.len() + p.holes.iter().map(Vec::len).sum::<usize>())
                .sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.num_points() == 0
    }
}

/// Geometry plus its attribute row, the externally-facing pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry,
    pub attributes: Vec<FieldValue>,
}

impl Feature {
    pub fn new(geometry: Geometry, attributes: Vec<FieldValue>) -> Self {
        Feature {
            geometry,
            attributes,
        }
    }
}
