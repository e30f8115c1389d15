//! Binary STL decoding.
//!
//! ```text
//! UINT8[80]    - Header, used as the model name
//! UINT32       - Number of triangles (T)
//! foreach triangle (50 bytes, starting at 84 + t * 50)
//!     REAL32[3] - Normal vector
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute
//! end
//! ```
//!
//! All multi-byte values are little-endian. Bytes past `84 + T * 50` are
//! never read.

use std::io::Read;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::take,
    number::complete::{le_f32, le_u16, le_u32},
    sequence::tuple,
    IResult,
};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::{Bounds, TriangleRecord};
use crate::model::Model;

/// Size of the name field at the start of the file.
const HEADER_SIZE: usize = 80;

/// Header plus the triangle count.
const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;

/// Size of one triangle record (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Scalars stored per triangle in the vertex and normal buffers.
const FLOATS_PER_TRIANGLE: usize = 9;

/// A fully decoded STL file, prior to becoming a [`Model`].
///
/// Buffers are sized once from the declared triangle count and filled in
/// order through [`StlFile::add_triangle`]; they never grow.
#[derive(Debug, Clone)]
pub struct StlFile {
    name: String,
    triangle_count: u32,
    normals: Vec<f32>,
    vertices: Vec<f32>,
    attributes: Vec<u16>,
    bounds: Bounds,
    cursor: usize,
}

impl StlFile {
    /// Allocate buffers for `triangles` facets.
    pub fn new(name: impl Into<String>, triangles: u32) -> Self {
        let slots = triangles as usize;
        Self {
            name: name.into(),
            triangle_count: triangles,
            normals: vec![0.0; FLOATS_PER_TRIANGLE * slots],
            vertices: vec![0.0; FLOATS_PER_TRIANGLE * slots],
            attributes: vec![0; slots],
            bounds: Bounds::ZERO,
            cursor: 0,
        }
    }

    /// Write the next triangle into the preallocated buffers.
    ///
    /// The face normal is copied into all three vertex slots and the bounds
    /// grow to include each corner.
    pub fn add_triangle(&mut self, record: &TriangleRecord) -> Result<()> {
        if self.cursor >= self.attributes.len() {
            return Err(Error::TriangleOverflow {
                capacity: self.triangle_count,
            });
        }

        let offset = self.cursor * FLOATS_PER_TRIANGLE;
        let normal = [record.normal.x, record.normal.y, record.normal.z];

        for (slot, vertex) in record.vertices.iter().enumerate() {
            let base = offset + slot * 3;
            let position = [vertex.x, vertex.y, vertex.z];

            self.normals[base..base + 3].copy_from_slice(&normal);
            self.vertices[base..base + 3].copy_from_slice(&position);
            self.bounds.include(position);
        }

        self.attributes[self.cursor] = record.attribute;
        self.cursor += 1;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Triangle count declared by the header
    pub fn triangle_count(&self) -> u32 {
        self.triangle_count
    }

    /// How many triangles have been written so far
    pub fn triangles_written(&self) -> usize {
        self.cursor
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn attributes(&self) -> &[u16] {
        &self.attributes
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Hand the buffers over to a new [`Model`] without copying them.
    pub fn to_model(self) -> Model {
        Model::from_decoded(self.name, self.normals, self.vertices, self.bounds)
    }
}

/// Decoder lifecycle. `Loading` holds between `load` and `parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    #[default]
    Idle,
    Loading,
}

/// Stateful binary STL decoder.
///
/// One source at a time: `load` moves the parser to `Loading`, `parse`
/// decodes and returns it to `Idle` whether decoding succeeds or not.
#[derive(Debug, Default)]
pub struct StlParser {
    state: ParserState,
    buffer: Option<Vec<u8>>,
}

impl StlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Drain a reader into the parser.
    pub fn load<R: Read>(&mut self, mut reader: R) -> Result<()> {
        self.begin_load()?;

        let mut buffer = Vec::new();
        if let Err(err) = reader.read_to_end(&mut buffer) {
            self.reset();
            return Err(err.into());
        }

        self.buffer = Some(buffer);
        Ok(())
    }

    /// Take an in-memory byte buffer as the source.
    pub fn load_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.begin_load()?;
        self.buffer = Some(bytes.into());
        Ok(())
    }

    /// Decode the loaded source. The parser is `Idle` afterwards either way.
    pub fn parse(&mut self) -> Result<StlFile> {
        let buffer = self.buffer.take();
        self.state = ParserState::Idle;

        match buffer {
            Some(buffer) => parse_binary_stl(&buffer),
            None => Err(Error::NothingLoaded),
        }
    }

    /// Load and parse in one call
    pub fn decode<R: Read>(&mut self, reader: R) -> Result<StlFile> {
        self.load(reader)?;
        self.parse()
    }

    /// Discard any loaded source and return to `Idle`.
    pub fn reset(&mut self) {
        self.buffer = None;
        self.state = ParserState::Idle;
    }

    fn begin_load(&mut self) -> Result<()> {
        if self.state != ParserState::Idle {
            warn!(state = ?self.state, "Rejected load on busy STL parser");
            return Err(Error::AlreadyInUse);
        }
        self.state = ParserState::Loading;
        Ok(())
    }
}

/// Decode a complete binary STL byte buffer.
pub fn parse_binary_stl(data: &[u8]) -> Result<StlFile> {
    let actual = data.len() as u64;
    let truncated = |expected: u64| Error::TruncatedInput { expected, actual };

    if data.len() < PREAMBLE_SIZE {
        warn!(bytes = data.len(), "STL source shorter than its header");
        return Err(truncated(PREAMBLE_SIZE as u64));
    }

    let (body, (name, triangles)) =
        parse_preamble(data).map_err(|_| truncated(PREAMBLE_SIZE as u64))?;

    let expected = PREAMBLE_SIZE as u64 + u64::from(triangles) * TRIANGLE_SIZE as u64;
    if actual < expected {
        warn!(triangles, expected, actual, "STL source truncated");
        return Err(truncated(expected));
    }

    debug!(name = %name, triangles, bytes = data.len(), "Decoded STL header");

    let mut file = StlFile::new(name, triangles);
    let mut input = &body[..triangles as usize * TRIANGLE_SIZE];

    for _ in 0..triangles {
        let (rest, record) = parse_triangle(input).map_err(|_| truncated(expected))?;
        file.add_triangle(&record)?;
        input = rest;
    }

    debug!(
        triangles,
        x = ?file.bounds.x,
        y = ?file.bounds.y,
        z = ?file.bounds.z,
        "Decoded STL body"
    );

    Ok(file)
}

fn parse_preamble(input: &[u8]) -> IResult<&[u8], (String, u32)> {
    let (input, header) = take(HEADER_SIZE)(input)?;
    let (input, triangles) = le_u32(input)?;
    Ok((input, (header_name(header), triangles)))
}

/// Header text up to the first NUL, with surrounding whitespace removed.
fn header_name(header: &[u8]) -> String {
    let end = header.iter().position(|&b| b == 0).unwrap_or(header.len());
    String::from_utf8_lossy(&header[..end]).trim().to_string()
}

fn parse_triangle(input: &[u8]) -> IResult<&[u8], TriangleRecord> {
    let (input, normal) = parse_vector3(input)?;
    let (input, v1) = parse_vector3(input)?;
    let (input, v2) = parse_vector3(input)?;
    let (input, v3) = parse_vector3(input)?;
    let (input, attribute) = le_u16(input)?;

    Ok((
        input,
        TriangleRecord::new(
            Vector3::from(normal),
            [Point3::from(v1), Point3::from(v2), Point3::from(v3)],
            attribute,
        ),
    ))
}

fn parse_vector3(input: &[u8]) -> IResult<&[u8], [f32; 3]> {
    let (input, (x, y, z)) = tuple((le_f32, le_f32, le_f32))(input)?;
    Ok((input, [x, y, z]))
}
