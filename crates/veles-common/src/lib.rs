//! Common utilities for Veles.
//!
//! This crate provides foundational types used across all Veles crates:
//!
//! - [`BinaryReader`] - Positioned little-endian reading from byte slices
//! - [`KfcGuid`] - The 16-byte resource identifier used in KFC2 archives
//! - [`Error`] - Shared low-level error type

mod error;
mod guid;
mod reader;

pub use error::{Error, Result};
pub use guid::KfcGuid;
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
