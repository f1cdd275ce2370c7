//! Error types for reflective deserialization.

use thiserror::Error;

use crate::kind::PrimitiveKind;

/// Errors that can occur when loading reflection data or decoding resources.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (short reads, invalid UTF-8).
    #[error("{0}")]
    Common(#[from] veles_common::Error),

    /// Malformed reflection schema document.
    #[error("malformed reflection schema: {0}")]
    Schema(#[from] serde_json::Error),

    /// Two type definitions share a qualified name.
    #[error("duplicate qualified type name in schema: {0}")]
    DuplicateTypeName(String),

    /// Two type definitions share a hash1 value.
    #[error("duplicate type hash in schema: {0:#010x}")]
    DuplicateTypeHash(u32),

    /// No type definition with the given qualified name.
    #[error("unknown type for qualified name: {0}")]
    UnknownTypeName(String),

    /// No type definition with the given hash1 value.
    #[error("unknown type for hash: {0:#010x}")]
    UnknownTypeHash(u32),

    /// A kind that requires a referenced type has none in the schema.
    #[error("type {0} has no referenced type")]
    MissingReferencedType(String),

    /// A variant header's declared size does not match the resolved type.
    #[error("variant size mismatch for {type_name}: header says {declared}, class size is {class_size}")]
    VariantSizeMismatch {
        type_name: String,
        declared: u32,
        class_size: u32,
    },

    /// The schema uses an encoding this decoder does not implement.
    #[error("unimplemented encoding: {0}")]
    UnimplementedKind(PrimitiveKind),

    /// XML export error.
    #[error("export error: {0}")]
    Export(String),
}

/// Result type for reflection operations.
pub type Result<T> = std::result::Result<T, Error>;
