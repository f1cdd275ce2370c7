//! Schema-driven reflective deserialization of resource bytes.
//!
//! A resource's binary layout is not self-describing: it is interpreted
//! against the reflection schema, starting from the type hash recorded in
//! the archive's resource tables. Decoding walks the type graph recursively,
//! reading fixed-width values inline and following blob indirection for
//! dynamically sized data.
//!
//! Blob headers use the same relative-offset convention as the archive
//! header: the offset resolves against the position of the offset field
//! itself. After a blob's content has been read, the cursor is restored to
//! just past the header, so a blob field always advances the cursor by its
//! fixed header size regardless of content - 8 bytes for arrays and strings,
//! 4 for optionals, 12 for variants. The restore happens on the error path
//! too, keeping the cursor valid for sibling fields.

use veles_common::{BinaryReader, KfcGuid};

use crate::catalog::TypeCatalog;
use crate::kind::PrimitiveKind;
use crate::node::{Node, Value};
use crate::schema::TypeDefinition;
use crate::{Error, Result};

/// Reflective decoder over a type catalog.
///
/// The deserializer itself is stateless; each decode call owns its cursor
/// and its output tree, so one deserializer may serve concurrent decodes as
/// long as every caller brings its own reader.
#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> Deserializer<'a> {
    /// Create a deserializer over a built catalog.
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self { catalog }
    }

    /// Decode one object of the type identified by `type_hash`, starting at
    /// the reader's current position.
    pub fn decode(
        &self,
        reader: &mut BinaryReader<'_>,
        type_hash: u32,
        name: &str,
    ) -> Result<Node> {
        let ty = self.catalog.by_hash1(type_hash)?;
        self.decode_type(reader, ty, name)
    }

    fn decode_type(
        &self,
        reader: &mut BinaryReader<'_>,
        ty: &TypeDefinition,
        name: &str,
    ) -> Result<Node> {
        let mut node = Node::new(name, ty.qualified_name.clone());

        match ty.primitive_type {
            PrimitiveKind::Bool => node.value = Some(Value::Bool(reader.read_bool()?)),
            PrimitiveKind::Uint8 => node.value = Some(Value::Uint8(reader.read_u8()?)),
            PrimitiveKind::Sint8 => node.value = Some(Value::Sint8(reader.read_i8()?)),
            PrimitiveKind::Uint16 => node.value = Some(Value::Uint16(reader.read_u16()?)),
            PrimitiveKind::Sint16 => node.value = Some(Value::Sint16(reader.read_i16()?)),
            PrimitiveKind::Uint32 => node.value = Some(Value::Uint32(reader.read_u32()?)),
            PrimitiveKind::Sint32 => node.value = Some(Value::Sint32(reader.read_i32()?)),
            PrimitiveKind::Uint64 => node.value = Some(Value::Uint64(reader.read_u64()?)),
            PrimitiveKind::Sint64 => node.value = Some(Value::Sint64(reader.read_i64()?)),
            PrimitiveKind::Float32 => node.value = Some(Value::Float32(reader.read_f32()?)),
            PrimitiveKind::Float64 => node.value = Some(Value::Float64(reader.read_f64()?)),

            // Bitmasks carry flag bits, not an enumerated value; they read
            // as plain unsigned integers of their width.
            PrimitiveKind::Bitmask8 => node.value = Some(Value::Uint8(reader.read_u8()?)),
            PrimitiveKind::Bitmask16 => node.value = Some(Value::Uint16(reader.read_u16()?)),
            PrimitiveKind::Bitmask32 => node.value = Some(Value::Uint32(reader.read_u32()?)),
            PrimitiveKind::Bitmask64 => node.value = Some(Value::Uint64(reader.read_u64()?)),

            PrimitiveKind::Enum => {
                let backing = self.referenced_type(ty)?;
                node.children.push(self.decode_type(reader, backing, "_enum")?);
            }

            PrimitiveKind::Typedef => {
                let aliased = self.referenced_type(ty)?;
                node.children
                    .push(self.decode_type(reader, aliased, "_typedef")?);
            }

            PrimitiveKind::Struct => self.decode_struct(reader, ty, &mut node)?,

            PrimitiveKind::StaticArray => {
                let element_ty = self.referenced_type(ty)?;
                for i in 0..ty.fields_count {
                    let element = self.decode_type(reader, element_ty, &format!("[{}]", i))?;
                    node.children.push(element);
                }
            }

            PrimitiveKind::BlobArray => self.decode_blob_array(reader, ty, &mut node)?,
            PrimitiveKind::BlobString => self.decode_blob_string(reader, &mut node)?,
            PrimitiveKind::BlobOptional => self.decode_blob_optional(reader, ty, &mut node)?,
            PrimitiveKind::BlobVariant => self.decode_blob_variant(reader, &mut node)?,

            PrimitiveKind::ObjectReference | PrimitiveKind::Guid => {
                node.value = Some(Value::Guid(reader.read_struct::<KfcGuid>()?));
            }

            PrimitiveKind::None
            | PrimitiveKind::DsArray
            | PrimitiveKind::DsString
            | PrimitiveKind::DsOptional
            | PrimitiveKind::DsVariant => {
                return Err(Error::UnimplementedKind(ty.primitive_type));
            }
        }

        Ok(node)
    }

    /// Decode a struct: optional base type at the struct's start, then each
    /// field at its declared offset, then skip to the declared class size.
    fn decode_struct(
        &self,
        reader: &mut BinaryReader<'_>,
        ty: &TypeDefinition,
        node: &mut Node,
    ) -> Result<()> {
        let struct_start = reader.position();
        let mut bytes_accounted: u64 = 0;

        if let Some(base_name) = ty.referenced_type_name.as_deref() {
            let base_ty = self.catalog.by_qualified_name(base_name)?;

            let base_start = reader.position();
            let base_node = self.decode_type(reader, base_ty, "_base")?;
            node.children.push(base_node);
            let base_span = reader.position() - base_start;

            // Abstract-ish base types declare a fake size (e.g. 1 byte) but
            // serialize no real data; counting their declared size would
            // throw off the offsets of everything after them.
            if base_span > 1 {
                bytes_accounted += u64::from(base_ty.class_size);
            }
        }

        for field in &ty.struct_fields {
            let field_ty = self.catalog.by_qualified_name(&field.type_name)?;

            // Declared alignments do not reliably predict the real layout;
            // always seek to the field's recorded offset.
            reader.seek(struct_start + field.data_offset as usize);

            let field_start = reader.position();
            let field_node = self.decode_type(reader, field_ty, &field.name)?;
            node.children.push(field_node);
            bytes_accounted += (reader.position() - field_start) as u64;
        }

        // Structs may have trailing padding; if anything real was read,
        // land the cursor exactly at the declared size.
        if bytes_accounted > 0 {
            reader.seek(struct_start + ty.class_size as usize);
        }

        Ok(())
    }

    /// u32 relative offset + u32 element count; elements live at the
    /// resolved offset, cursor ends just past the 8-byte header.
    fn decode_blob_array(
        &self,
        reader: &mut BinaryReader<'_>,
        ty: &TypeDefinition,
        node: &mut Node,
    ) -> Result<()> {
        let element_ty = self.referenced_type(ty)?;

        let base = reader.position();
        let relative_offset = reader.read_u32()?;
        let count = reader.read_u32()?;

        reader.seek(base + relative_offset as usize);
        let elements = (0..count)
            .map(|i| self.decode_type(reader, element_ty, &format!("[{}]", i)))
            .collect::<Result<Vec<_>>>();
        reader.seek(base + 8);

        node.children = elements?;
        Ok(())
    }

    /// u32 relative offset + u32 byte length; UTF-8 content lives at the
    /// resolved offset, cursor ends just past the 8-byte header.
    fn decode_blob_string(
        &self,
        reader: &mut BinaryReader<'_>,
        node: &mut Node,
    ) -> Result<()> {
        let base = reader.position();
        let relative_offset = reader.read_u32()?;
        let byte_length = reader.read_u32()?;

        reader.seek(base + relative_offset as usize);
        let content = reader
            .read_string(byte_length as usize)
            .map(str::to_owned);
        reader.seek(base + 8);

        node.value = Some(Value::String(content?));
        Ok(())
    }

    /// u32 relative offset only; zero means absent. Cursor ends just past
    /// the 4-byte header either way.
    fn decode_blob_optional(
        &self,
        reader: &mut BinaryReader<'_>,
        ty: &TypeDefinition,
        node: &mut Node,
    ) -> Result<()> {
        let base = reader.position();
        let relative_offset = reader.read_u32()?;

        if relative_offset != 0 {
            let inner_ty = self.referenced_type(ty)?;

            reader.seek(base + relative_offset as usize);
            let inner = self.decode_type(reader, inner_ty, "_optional");
            reader.seek(base + 4);

            node.children.push(inner?);
        }

        Ok(())
    }

    /// u32 type hash, then u32 relative offset + u32 data size. The offset
    /// resolves against the position after the hash; cursor ends 12 bytes
    /// past the header start either way.
    fn decode_blob_variant(
        &self,
        reader: &mut BinaryReader<'_>,
        node: &mut Node,
    ) -> Result<()> {
        let type_hash = reader.read_u32()?;
        let data_base = reader.position();
        let relative_offset = reader.read_u32()?;
        let data_size = reader.read_u32()?;

        if type_hash != 0 || data_size > 0 {
            let inner_ty = self.catalog.by_hash1(type_hash)?;

            if data_size != inner_ty.class_size {
                return Err(Error::VariantSizeMismatch {
                    type_name: inner_ty.qualified_name.clone(),
                    declared: data_size,
                    class_size: inner_ty.class_size,
                });
            }

            reader.seek(data_base + relative_offset as usize);
            let inner = self.decode_type(reader, inner_ty, "_variant");
            reader.seek(data_base + 8);

            node.children.push(inner?);
        }

        Ok(())
    }

    fn referenced_type(&self, ty: &TypeDefinition) -> Result<&TypeDefinition> {
        let name = ty
            .referenced_type_name
            .as_deref()
            .ok_or_else(|| Error::MissingReferencedType(ty.qualified_name.clone()))?;
        self.catalog.by_qualified_name(name)
    }
}
