//! Veles - Enshrouded KFC2 archive extraction and decoding library.
//!
//! This crate provides a unified interface to the Veles library ecosystem
//! for working with Enshrouded game files.
//!
//! # Crates
//!
//! - [`veles_common`] - Common utilities (binary reading, GUIDs)
//! - [`veles_kfc`] - KFC2 archive container parsing
//! - [`veles_reflection`] - Schema-driven resource deserialization
//!
//! # Example
//!
//! ```no_run
//! use veles::prelude::*;
//!
//! // Open a KFC2 archive
//! let file = KfcFile::open("enshrouded.kfc")?;
//! let archive = file.archive();
//! println!("Resources: {}", archive.resource_count());
//!
//! // Decode the first resource against the reflection schema
//! let types = veles::reflection::schema::load_from_file("reflection_info.json")?;
//! let catalog = TypeCatalog::build(types)?;
//! let deserializer = Deserializer::new(&catalog);
//!
//! let bytes = file.resource_bytes(0)?;
//! let mut reader = BinaryReader::new(bytes);
//! let tree = deserializer.decode(&mut reader, archive.resource_infos()[0].type_name_hash, "_root")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use veles_common as common;
pub use veles_kfc as kfc;
pub use veles_reflection as reflection;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use veles_common::{BinaryReader, KfcGuid};
    pub use veles_kfc::{KfcArchive, KfcFile, SvnVersion};
    pub use veles_reflection::{Deserializer, Node, TypeCatalog, Value, XmlExporter};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
