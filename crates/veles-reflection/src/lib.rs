//! Schema-driven reflective deserializer for Enshrouded resources.
//!
//! Resources extracted from a KFC2 archive are opaque byte blobs; their
//! layout is described by an externally dumped reflection schema (a JSON
//! list of type definitions). This crate loads that schema, indexes it, and
//! decodes resource bytes into typed trees.
//!
//! # Quick Start
//!
//! ```no_run
//! use veles_common::BinaryReader;
//! use veles_reflection::{schema, Deserializer, TypeCatalog, XmlExporter};
//!
//! let types = schema::load_from_file("reflection_info.json")?;
//! let catalog = TypeCatalog::build(types)?;
//! let deserializer = Deserializer::new(&catalog);
//!
//! let resource_bytes = std::fs::read("some.resource")?;
//! let mut reader = BinaryReader::new(&resource_bytes);
//! let tree = deserializer.decode(&mut reader, 0x2B8D_1A6F, "_root")?;
//!
//! println!("{}", XmlExporter::to_xml_string(&tree)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Decoding model
//!
//! Every type has a [`PrimitiveKind`] that picks its encoding: fixed-width
//! primitives and bitmasks read inline; enums and typedefs delegate to a
//! referenced backing type; structs seek each field to its declared offset
//! and honor inheritance; blob kinds store a small inline header whose
//! relative offset points at the real content elsewhere in the buffer.
//!
//! The four `Ds*` dynamic kinds and `None` are not implemented and fail
//! with [`Error::UnimplementedKind`] instead of guessing at a layout.

mod catalog;
mod deserializer;
mod error;
mod kind;
mod node;

pub mod schema;

#[cfg(feature = "xml-export")]
mod xml;

pub use catalog::TypeCatalog;
pub use deserializer::Deserializer;
pub use error::{Error, Result};
pub use kind::PrimitiveKind;
pub use node::{Node, Value};
pub use schema::TypeDefinition;

#[cfg(feature = "xml-export")]
pub use xml::XmlExporter;
