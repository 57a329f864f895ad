//! # shp-tools-rs
//!
//! A pure Rust library for reading and writing ESRI Shapefile vector data.
//!
//! This library covers the binary `.shp`/`.shx` pair end to end: the
//! buffered binary streams, the 100-byte header, the per-family record
//! codecs (point, multipoint, polyline, polygon, with their M and Z
//! variants), and the geometry reconstruction that turns raw ring arrays
//! back into polygons with holes.
//!
//! ## Features
//!
//! - Read and write `.shp` shape files with the companion `.shx` index
//! - All standard shape types except MultiPatch, including M and Z variants
//! - Winding-based shell/hole polygon reconstruction
//! - Memory-efficient index mode: one shared vertex arena per open file
//! - Streaming buffered I/O for files larger than memory
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shp_tools_rs::{Shapefile, Geometry, Vertex, ShapeType};
//!
//! // Read a shapefile
//! let file = Shapefile::open("lakes.shp")?;
//! for i in 0..file.num_shapes() {
//!     println!("shape {}: {:?}", i, file.feature(i)?.geometry);
//! }
//!
//! // Write one
//! let mut out = Shapefile::new(ShapeType::Point);
//! out.add_feature(&Geometry::Point(Vertex::new(12.5, 41.9)), vec![])?;
//! out.save_as("cities.shp", true)?;
//! # Ok::<(), shp_tools_rs::ShpError>(())
//! ```

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod attributes;
pub mod error;
pub mod geometry;
pub mod io;
pub mod progress;
pub mod shapefile;
pub mod types;

// Re-export commonly used types
pub use error::{Result, ShpError};
pub use types::{Extent, Vertex};

// Re-export the geometry model
pub use geometry::{
    Feature, Geometry, PartRange, PolygonGeometry, Shape, ShapeFamily, ShapeRange, ShapeType,
};

// Re-export attribute glue
pub use attributes::{AttributeField, AttributeSource, FieldValue, MemoryAttributeSource};

// Re-export the dataset and progress surface
pub use progress::{NullProgress, ProgressSink};
pub use shapefile::Shapefile;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dataset_creation() {
        let file = Shapefile::new(ShapeType::PolyLineZ);
        assert_eq!(file.shape_type(), ShapeType::PolyLineZ);
        assert_eq!(file.num_shapes(), 0);
    }
}
