//! Error types for the editor core.
//!
//! Every variant is recovered where it surfaces: the caller logs it and leaves
//! editor state as it was. Nothing here is fatal to a running session.

use thiserror::Error;

/// Result type alias using [`EditorError`].
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors that can occur while editing a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    /// The object lacks one of its index, position or normal buffers.
    #[error("object {object} is missing {buffer} data")]
    MissingGeometryData {
        /// The object id.
        object: String,
        /// Which buffer is absent ("index", "position" or "normal").
        buffer: &'static str,
    },

    /// A computed index points past the end of a buffer.
    #[error("{buffer} index {index} out of bounds (len {len})")]
    OutOfBoundsIndex {
        /// Which buffer was indexed.
        buffer: &'static str,
        /// The offending index.
        index: usize,
        /// Number of addressable elements in the buffer.
        len: usize,
    },

    /// A tool name outside select/move/rotate/scale.
    #[error("unknown tool name: {0}")]
    InvalidToolName(String),

    /// A host-side command could not be delivered or decoded.
    #[error("bridge call failed: {0}")]
    BridgeCallFailure(String),
}

impl EditorError {
    /// Create an out-of-bounds error.
    pub fn out_of_bounds(buffer: &'static str, index: usize, len: usize) -> Self {
        EditorError::OutOfBoundsIndex { buffer, index, len }
    }
}
