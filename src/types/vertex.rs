//! 2D vertex type for shape coordinates
//!
//! Z elevations and M measures are never interleaved with X/Y; they live in
//! parallel arrays on the owning shape, so the vertex itself stays a plain
//! coordinate pair.

use std::fmt;
use std::ops::{Add, Sub};

/// A 2D coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(x: f64, y: f64) -> Self {
        Vertex { x, y }
    }

    /// Origin vertex
    pub const ZERO: Vertex = Vertex::new(0.0, 0.0);

    /// Cross product (returns scalar for 2D); the building block of the
    /// shoelace signed-area sum used for ring winding.
    pub fn cross(&self, other: &Vertex) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Distance to another vertex
    pub fn distance(&self, other: &Vertex) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex::ZERO
    }
}

impl Add for Vertex {
    type Output = Vertex;
    fn add(self, other: Vertex) -> Vertex {
        Vertex::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vertex {
    type Output = Vertex;
    fn sub(self, other: Vertex) -> Vertex {
        Vertex::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
