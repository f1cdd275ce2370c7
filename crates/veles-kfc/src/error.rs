//! Error types for KFC2 parsing.

use thiserror::Error;

/// Errors that can occur when working with KFC2 archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (bad magic, short reads, invalid UTF-8).
    #[error("{0}")]
    Common(#[from] veles_common::Error),

    /// A reserved section has a non-zero offset or count.
    ///
    /// Sections 2 and 3 are unused in every known archive; a non-zero header
    /// means the file uses a feature this parser does not know about.
    #[error("cannot parse archive with non-empty reserved section {0}")]
    ReservedSection(u32),

    /// The archive does not contain exactly one resource bundle.
    #[error("cannot parse archive with {0} resource bundles (expected exactly 1)")]
    BundleCount(usize),

    /// A resource info record has non-zero reserved fields.
    #[error("invalid resource record: reserved fields must be zero")]
    InvalidResourceRecord,

    /// Malformed SVN version tag.
    #[error("malformed SVN version tag: {0}")]
    SvnVersion(String),

    /// Resource index out of range.
    #[error("resource index {index} out of range (count: {count})")]
    ResourceIndex { index: usize, count: usize },

    /// A resource's data range extends past the end of the file.
    #[error("resource {index} range {start:#x}..{end:#x} exceeds file size {len:#x}")]
    ResourceBounds {
        index: usize,
        start: usize,
        end: usize,
        len: usize,
    },
}

/// Result type for KFC2 operations.
pub type Result<T> = std::result::Result<T, Error>;
