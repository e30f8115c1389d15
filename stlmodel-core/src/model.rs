/// Render-facing model and format dispatch
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use nalgebra::Point3;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Bounds;
use crate::stl::StlParser;

/// Geometry arrays handed to [`Model::new`]
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    /// Per-vertex normals, 3 components each.
    pub normals: Vec<f32>,
    /// Vertex positions, 3 components each, 3 vertices per triangle.
    pub vertices: Vec<f32>,
    /// Optional RGBA colors, 4 components per vertex.
    pub colors: Option<Vec<f32>>,
    /// Optional draw order into `vertices`.
    pub indices: Option<Vec<u16>>,
    /// Precomputed bounds. Recomputed from `vertices` when absent.
    pub bounds: Option<Bounds>,
}

impl ModelData {
    pub fn new(normals: Vec<f32>, vertices: Vec<f32>) -> Self {
        Self {
            normals,
            vertices,
            ..Self::default()
        }
    }

    pub fn with_colors(mut self, colors: Vec<f32>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn with_indices(mut self, indices: Vec<u16>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Dense geometry buffers plus derived bounds, ready for a renderer.
///
/// Immutable once built. Any GPU-side buffers belong to the renderer.
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    normals: Vec<f32>,
    vertices: Vec<f32>,
    colors: Option<Vec<f32>>,
    indices: Option<Vec<u16>>,
    triangle_count: usize,
    bounds: Bounds,
    center: Point3<f32>,
}

impl Model {
    /// Build a model from external arrays.
    ///
    /// `normals` and `vertices` must have the same length, a multiple of 3.
    /// Colors, when present, need 4 components per vertex, and every index
    /// must name an existing vertex.
    pub fn new(name: impl Into<String>, data: ModelData) -> Result<Self> {
        let ModelData {
            normals,
            vertices,
            colors,
            indices,
            bounds,
        } = data;

        if vertices.len() % 3 != 0 {
            return Err(Error::invalid_geometry(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if normals.len() != vertices.len() {
            return Err(Error::invalid_geometry(format!(
                "normal buffer length {} does not match vertex buffer length {}",
                normals.len(),
                vertices.len()
            )));
        }

        let vertex_count = vertices.len() / 3;
        if let Some(colors) = &colors {
            if colors.len() != vertex_count * 4 {
                return Err(Error::invalid_geometry(format!(
                    "color buffer length {} does not match {} vertices",
                    colors.len(),
                    vertex_count
                )));
            }
        }
        if let Some(indices) = &indices {
            if let Some(&bad) = indices.iter().find(|&&i| usize::from(i) >= vertex_count) {
                return Err(Error::invalid_geometry(format!(
                    "index {bad} out of range for {vertex_count} vertices"
                )));
            }
        }

        let bounds = bounds.unwrap_or_else(|| Bounds::from_vertices(&vertices));
        Ok(Self::assemble(
            name.into(),
            normals,
            vertices,
            colors,
            indices,
            bounds,
        ))
    }

    /// Wrap buffers coming out of a decoder, whose lengths are already paired.
    pub(crate) fn from_decoded(
        name: String,
        normals: Vec<f32>,
        vertices: Vec<f32>,
        bounds: Bounds,
    ) -> Self {
        Self::assemble(name, normals, vertices, None, None, bounds)
    }

    fn assemble(
        name: String,
        normals: Vec<f32>,
        vertices: Vec<f32>,
        colors: Option<Vec<f32>>,
        indices: Option<Vec<u16>>,
        bounds: Bounds,
    ) -> Self {
        // Counts vertices rather than triangles; draw calls are sized from it.
        let triangle_count = vertices.len() / 3;
        Self {
            name,
            normals,
            vertices,
            colors,
            indices,
            triangle_count,
            center: bounds.center(),
            bounds,
        }
    }

    /// Decode `reader` with the decoder registered for `format`.
    ///
    /// `format` is matched case-insensitively, so `"STL"` and `"stl"` are
    /// the same.
    pub fn load<R: Read>(format: &str, reader: R) -> Result<Self> {
        format.parse::<ModelFormat>()?.decode(reader)
    }

    /// Open a model file, picking the decoder from its extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = ModelFormat::from_path(path)?;
        debug!(path = %path.display(), %format, "Opening model file");

        let file = File::open(path)?;
        format.decode(BufReader::new(file))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn colors(&self) -> Option<&[f32]> {
        self.colors.as_deref()
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    /// `vertices.len() / 3`.
    ///
    /// Despite the name this is the number of vertices: a triangle spans 9
    /// scalars. Renderers size `draw_arrays(TRIANGLES, 0, n)` with it, so the
    /// value is kept as is. See [`Model::face_count`] for real facets.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Number of whole triangles in the vertex buffer
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 9
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Position of vertex `index`, if it exists
    pub fn vertex(&self, index: usize) -> Option<Point3<f32>> {
        let start = index.checked_mul(3)?;
        let v = self.vertices.get(start..start.checked_add(3)?)?;
        Some(Point3::new(v[0], v[1], v[2]))
    }
}

/// Model formats with a registered decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// Binary STL
    Stl,
}

impl ModelFormat {
    /// Infer the format from a file extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext.parse(),
            None => Err(Error::UnsupportedFormat {
                format: path.display().to_string(),
            }),
        }
    }

    /// Run this format's decoder over `reader`.
    pub fn decode<R: Read>(self, reader: R) -> Result<Model> {
        match self {
            ModelFormat::Stl => {
                let mut parser = StlParser::new();
                Ok(parser.decode(reader)?.to_model())
            }
        }
    }
}

impl FromStr for ModelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("stl") {
            Ok(ModelFormat::Stl)
        } else {
            Err(Error::UnsupportedFormat {
                format: s.to_string(),
            })
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelFormat::Stl => f.write_str("stl"),
        }
    }
}
