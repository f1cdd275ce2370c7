//! Primitive kinds of the reflection schema.

use serde::Deserialize;

/// The encoding strategy of a reflected type.
///
/// The tags are the exact strings used by the reflection schema document.
/// Dispatch over this enum is exhaustive, so an encoding this decoder does
/// not handle shows up as an explicit [`UnimplementedKind`] error rather
/// than a silent fallthrough.
///
/// [`UnimplementedKind`]: crate::Error::UnimplementedKind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum PrimitiveKind {
    /// No encoding; never valid to decode.
    None,
    Bool,
    Uint8,
    Sint8,
    Uint16,
    Sint16,
    Uint32,
    Sint32,
    Uint64,
    Sint64,
    Float32,
    Float64,
    /// Wraps a backing integer type carrying the enumerated value.
    Enum,
    Bitmask8,
    Bitmask16,
    Bitmask32,
    Bitmask64,
    /// Alias for another type.
    Typedef,
    /// Fields at declared offsets, optionally inheriting a base type.
    Struct,
    /// `fields_count` inline elements of the referenced type.
    StaticArray,
    /// Dynamic inline array; not used by archive payloads.
    DsArray,
    /// Dynamic inline string; not used by archive payloads.
    DsString,
    /// Dynamic inline optional; not used by archive payloads.
    DsOptional,
    /// Dynamic inline variant; not used by archive payloads.
    DsVariant,
    /// Offset-indirected array: u32 relative offset + u32 element count.
    BlobArray,
    /// Offset-indirected UTF-8 string: u32 relative offset + u32 byte length.
    BlobString,
    /// Offset-indirected optional: u32 relative offset, zero means absent.
    BlobOptional,
    /// Offset-indirected tagged union: u32 hash1 + u32 relative offset + u32 size.
    BlobVariant,
    /// Opaque 16-byte resource reference.
    ObjectReference,
    /// Opaque 16-byte GUID.
    Guid,
}

impl PrimitiveKind {
    /// Get the schema tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool => "Bool",
            Self::Uint8 => "Uint8",
            Self::Sint8 => "Sint8",
            Self::Uint16 => "Uint16",
            Self::Sint16 => "Sint16",
            Self::Uint32 => "Uint32",
            Self::Sint32 => "Sint32",
            Self::Uint64 => "Uint64",
            Self::Sint64 => "Sint64",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Enum => "Enum",
            Self::Bitmask8 => "Bitmask8",
            Self::Bitmask16 => "Bitmask16",
            Self::Bitmask32 => "Bitmask32",
            Self::Bitmask64 => "Bitmask64",
            Self::Typedef => "Typedef",
            Self::Struct => "Struct",
            Self::StaticArray => "StaticArray",
            Self::DsArray => "DsArray",
            Self::DsString => "DsString",
            Self::DsOptional => "DsOptional",
            Self::DsVariant => "DsVariant",
            Self::BlobArray => "BlobArray",
            Self::BlobString => "BlobString",
            Self::BlobOptional => "BlobOptional",
            Self::BlobVariant => "BlobVariant",
            Self::ObjectReference => "ObjectReference",
            Self::Guid => "Guid",
        }
    }
}

impl std::fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
