//! Reflection schema model.
//!
//! The schema is an externally produced JSON document: an ordered list of
//! type definitions dumped from the game's reflection data. Field names
//! here mirror the document's keys.

use std::path::Path;

use serde::Deserialize;

use crate::kind::PrimitiveKind;
use crate::Result;

/// A node in a type's namespace chain.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceTree {
    pub name: String,
    pub parent: Option<Box<NamespaceTree>>,
}

/// Attribute metadata attached to a struct field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldAttribute {
    #[serde(rename = "type")]
    pub attribute_type: FieldAttributeType,
    pub value: String,
}

/// The type half of a field attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldAttributeType {
    pub namespace: NamespaceTree,
    #[serde(rename = "desc")]
    pub description: String,
    pub referenced_type_name: Option<String>,
}

/// A field of a struct type.
#[derive(Debug, Clone, Deserialize)]
pub struct StructField {
    pub name: String,
    pub type_name: String,
    /// Byte offset of the field within the struct. Declared alignments do
    /// not reliably predict this, so decoding always seeks to it directly.
    pub data_offset: u64,
    pub field_attribute: Option<FieldAttribute>,
}

/// A named value of an enum type.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumField {
    pub name: String,
    pub value: u64,
}

/// One reflected type.
///
/// A type is identified by two independent keys: its qualified name and the
/// 32-bit `hash1` of that name. `referenced_type_name` is the base class for
/// structs, the element type for arrays, and the wrapped type for enums and
/// typedefs.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDefinition {
    pub type_name_1: String,
    pub type_name_2: String,
    pub qualified_name: String,
    pub namespace_tree: NamespaceTree,
    pub referenced_type_name: Option<String>,
    pub class_size: u32,
    pub alignment_1: u32,
    pub alignment_2: u32,
    pub fields_count: u32,
    pub primitive_type: PrimitiveKind,
    #[serde(rename = "field_4D")]
    pub field_4d: u32,
    #[serde(rename = "field_4E")]
    pub field_4e: u32,
    #[serde(rename = "field_4F")]
    pub field_4f: u32,
    pub hash1: u32,
    pub hash2: u32,
    pub struct_fields: Vec<StructField>,
    pub enum_fields: Vec<EnumField>,
}

/// Load a type definition list from a JSON string.
pub fn load_from_json(json: &str) -> Result<Vec<TypeDefinition>> {
    Ok(serde_json::from_str(json)?)
}

/// Load a type definition list from a JSON file on disk.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<TypeDefinition>> {
    let json = std::fs::read_to_string(path)?;
    load_from_json(&json)
}
