//! Shared test utilities for shp-tools-rs integration tests.
//!
//! Consolidates the helpers the test crates need: output path resolution
//! and ring/geometry builders, imported via `mod common;`.

#![allow(dead_code)]

use shp_tools_rs::{Geometry, PolygonGeometry, Vertex};
use std::path::PathBuf;

/// Resolve a path into the `test_output/` directory, creating it if needed.
pub fn test_output_path(filename: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_output");
    std::fs::create_dir_all(&dir).ok();
    dir.join(filename)
}

/// Closed clockwise square ring (shell winding).
pub fn square_cw(x: f64, y: f64, size: f64) -> Vec<Vertex> {
    vec![
        Vertex::new(x, y),
        Vertex::new(x, y + size),
        Vertex::new(x + size, y + size),
        Vertex::new(x + size, y),
        Vertex::new(x, y),
    ]
}

/// Closed counter-clockwise square ring (hole winding).
pub fn square_ccw(x: f64, y: f64, size: f64) -> Vec<Vertex> {
    let mut ring = square_cw(x, y, size);
    ring.reverse();
    ring
}

/// Square polygon with no holes.
pub fn square_polygon(x: f64, y: f64, size: f64) -> Geometry {
    Geometry::Polygon(PolygonGeometry {
        shell: square_cw(x, y, size),
        holes: vec![],
    })
}

/// Square polygon with one centered square hole.
pub fn square_with_hole(x: f64, y: f64, size: f64) -> Geometry {
    Geometry::Polygon(PolygonGeometry {
        shell: square_cw(x, y, size),
        holes: vec![square_ccw(x + size / 4.0, y + size / 4.0, size / 2.0)],
    })
}

/// Zig-zag polyline with `n` points starting at the origin.
pub fn zigzag(n: usize) -> Vec<Vertex> {
    (0..n)
        .map(|i| Vertex::new(i as f64, if i % 2 == 0 { 0.0 } else { 1.0 }))
        .collect()
}
