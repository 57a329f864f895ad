//! Core value types shared across the library

pub mod extent;
pub mod vertex;

pub use extent::Extent;
pub use vertex::Vertex;
