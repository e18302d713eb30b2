//! Encoder and decoder error types

use thiserror::Error;

use super::object::TypeId;
use crate::scene::CameraError;

/// Errors raised while writing a scene container
///
/// Every variant aborts the current serialization pass. The encoder never
/// retries and never tries to repair a partially written stream.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Underlying stream failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Two objects share the same non-empty id
    #[error("Duplicate object id: {0:?}")]
    DuplicateId(String),

    /// An xref names an id that was never written
    #[error("Unresolved reference to object id {0:?}")]
    UnresolvedReference(String),

    /// An xref was requested for an object without an id
    #[error("Cannot reference an object with an empty id")]
    EmptyReferenceId,

    /// The stream grew past the 32-bit offset range
    #[error("File offset {0} does not fit in a 32-bit reference")]
    OffsetOverflow(u64),

    /// The object already has a recorded file position
    #[error("Object {0:?} has already been written")]
    AlreadyWritten(String),

    /// A camera descriptor carries projection parameters no camera accepts
    #[error("Invalid camera descriptor: {0}")]
    InvalidCamera(#[from] CameraError),

    /// Output was attempted after finalization
    #[error("Writer has already been finalized")]
    AlreadyFinalized,
}

/// Errors raised while reading a scene container back
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Underlying stream failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The header does not start with the container magic
    #[error("Invalid magic number")]
    InvalidMagic,

    /// The container major version is not supported
    #[error("Unsupported version: {0}.{1}")]
    UnsupportedVersion(u8, u8),

    /// An envelope carries an unknown type tag
    #[error("Unknown type tag: {0}")]
    UnknownTypeTag(u32),

    /// An envelope has a different type than requested
    #[error("Expected {expected:?} object, found {found:?}")]
    UnexpectedType {
        /// Requested type
        expected: TypeId,
        /// Type found in the envelope
        found: TypeId,
    },

    /// A light payload carries an unknown light type
    #[error("Unknown light type: {0}")]
    UnknownLightType(u8),

    /// A node payload carries an unknown node type
    #[error("Unknown node type: {0}")]
    UnknownNodeType(u32),

    /// A camera payload carries an unknown camera type
    #[error("Unknown camera type: {0}")]
    UnknownCameraType(u8),

    /// A string field is not valid UTF-8
    #[error("String field is not valid UTF-8")]
    InvalidUtf8,

    /// The header records no reference table
    #[error("Container has no reference table")]
    MissingReferenceTable,

    /// The reference table has no entry for the id
    #[error("No object with id {0:?}")]
    MissingObject(String),
}

/// Encoder result type
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Decoder result type
pub type DecodeResult<T> = Result<T, DecodeError>;
