/// Error types for STL decoding and model construction
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding a byte source or building a model
#[derive(Debug, Error)]
pub enum Error {
    /// The requested format identifier has no registered decoder.
    #[error("unsupported model format: {format}")]
    UnsupportedFormat { format: String },

    /// A parser was asked to load while a previous load is still pending.
    #[error("cannot load a source while the parser is already in use")]
    AlreadyInUse,

    /// The declared triangle count needs more bytes than the source holds.
    #[error("truncated STL input: expected {expected} bytes, got {actual}")]
    TruncatedInput { expected: u64, actual: u64 },

    /// Buffers handed to `Model::new` do not describe whole vertices.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    /// `parse` was called without a loaded source.
    #[error("no source loaded")]
    NothingLoaded,

    /// `add_triangle` was called after every preallocated slot was written.
    #[error("triangle buffer full ({capacity} triangles)")]
    TriangleOverflow { capacity: u32 },

    /// Reading the byte source failed.
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
