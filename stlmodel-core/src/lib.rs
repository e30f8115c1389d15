/// STLModel Core - Binary STL decoding into render-ready geometry
///
/// This library turns binary STL bytes into dense vertex and normal buffers
/// with precomputed bounds and center, for a renderer to consume.

pub mod error;
pub mod geometry;
pub mod model;
pub mod stl;

// Re-export commonly used types
pub use error::{Error, Result};
pub use geometry::{Bounds, TriangleRecord};
pub use model::{Model, ModelData, ModelFormat};
pub use stl::{parse_binary_stl, ParserState, StlFile, StlParser};
