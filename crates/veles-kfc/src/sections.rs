//! Record types for the fifteen KFC2 metadata sections.
//!
//! Each section is a sequence of fixed-size records read field-by-field off
//! the archive cursor. Field order is 1:1 with the on-disk layout.

use veles_common::{BinaryReader, KfcGuid};

use crate::{Error, Result};

/// A record that can be read off a section table.
pub trait SectionRecord: Sized {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self>;
}

/// Section 1 - one entry per content container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerInfo {
    pub container_size: u32,
    pub unk_field_4: u32,
    pub entry_count: u32,
    pub unk_field_c: u32,
}

impl SectionRecord for ContainerInfo {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            container_size: reader.read_u32()?,
            unk_field_4: reader.read_u32()?,
            entry_count: reader.read_u32()?,
            unk_field_c: reader.read_u32()?,
        })
    }
}

/// Section 4 - the resource payload region. Exactly one per archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBundle {
    /// Absolute file offset where the payload region starts.
    pub file_offset_start: u32,
    pub bundle_size: u32,
    pub entry_count: u32,
}

impl SectionRecord for ResourceBundle {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            file_offset_start: reader.read_u32()?,
            bundle_size: reader.read_u32()?,
            entry_count: reader.read_u32()?,
        })
    }
}

/// Sections 6, 9 and 12 - hash-bucket index ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupTableEntry {
    pub min_index: u32,
    pub max_index: u32,
}

impl SectionRecord for LookupTableEntry {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            min_index: reader.read_u32()?,
            max_index: reader.read_u32()?,
        })
    }
}

/// Section 7 - one entry per content blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentInfo {
    pub content_size: u32,
    /// Indexes into the content lookup table, masked by its length.
    pub lookup_table_id: u16,
    pub unk_field_6: u16,
    /// Matches the hash1 field content references use.
    pub content_hash: u32,
    pub unk_field_c: u16,
    pub unk_s7_index: u16,
}

impl SectionRecord for ContentInfo {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            content_size: reader.read_u32()?,
            lookup_table_id: reader.read_u16()?,
            unk_field_6: reader.read_u16()?,
            content_hash: reader.read_u32()?,
            unk_field_c: reader.read_u16()?,
            unk_s7_index: reader.read_u16()?,
        })
    }
}

/// Section 8 - where each content blob lives.
///
/// The container index and file offset share one u64 (16/48 bit split); the
/// content type and block count share one u32 (8/24 bit split).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLocation {
    pub container_index: u16,
    pub file_offset: u64,
    pub block_offset: u32,
    pub content_type: u8,
    pub block_count: u32,
}

impl SectionRecord for ContentLocation {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let location_data = reader.read_u64()?;
        let container_index = (location_data >> 48) as u16;
        let file_offset = location_data & 0xFFFF_FFFF_FFFF;

        let block_offset = reader.read_u32()?;

        let content_data = reader.read_u32()?;
        let content_type = (content_data >> 24) as u8;
        let block_count = content_data & 0xFF_FFFF;

        Ok(Self {
            container_index,
            file_offset,
            block_offset,
            content_type,
            block_count,
        })
    }
}

/// Section 10 - resource identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    pub guid: KfcGuid,
    /// hash1 of the resource's fully qualified type name.
    pub type_name_hash: u32,
    pub part_index: u32,
}

impl SectionRecord for ResourceInfo {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let guid = reader.read_struct::<KfcGuid>()?;
        let type_name_hash = reader.read_u32()?;
        let part_index = reader.read_u32()?;
        let reserved0 = reader.read_u32()?;
        let reserved1 = reader.read_u32()?;

        if reserved0 != 0 || reserved1 != 0 {
            return Err(Error::InvalidResourceRecord);
        }

        Ok(Self {
            guid,
            type_name_hash,
            part_index,
        })
    }
}

/// Section 11 - where each resource's bytes live within the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLocation {
    /// Offset relative to [`ResourceBundle::file_offset_start`].
    pub offset: u32,
    pub size: u32,
}

impl SectionRecord for ResourceLocation {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            offset: reader.read_u32()?,
            size: reader.read_u32()?,
        })
    }
}

/// Section 13 - FNV1A-32 hash of a fully qualified type name (hash1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionTypeNameHash {
    pub type_name_hash: u32,
}

impl SectionRecord for ReflectionTypeNameHash {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            type_name_hash: reader.read_u32()?,
        })
    }
}

/// Section 14 - per-type instance counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectionTypeInfo {
    /// Matches the hash2 field of the reflection data.
    pub type_hash_2: u32,
    pub unk_field_4: u32,
    /// Number of resources of this type in the bundle.
    pub instance_count: u32,
}

impl SectionRecord for ReflectionTypeInfo {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(Self {
            type_hash_2: reader.read_u32()?,
            unk_field_4: reader.read_u32()?,
            instance_count: reader.read_u32()?,
        })
    }
}

// Section 5 entries are bare resource-table indices.
impl SectionRecord for u32 {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        Ok(reader.read_u32()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_location_bit_packing() {
        let mut data = Vec::new();
        // containerIndex 0x0102 in the top 16 bits, fileOffset 0x0000_DEAD_BEEF in the low 48
        data.extend_from_slice(&0x0102_0000_DEAD_BEEFu64.to_le_bytes());
        data.extend_from_slice(&0x1234_5678u32.to_le_bytes());
        // contentType 0xAB in the top 8 bits, blockCount 0x000042 in the low 24
        data.extend_from_slice(&0xAB00_0042u32.to_le_bytes());

        let mut reader = BinaryReader::new(&data);
        let loc = ContentLocation::read(&mut reader).unwrap();

        assert_eq!(loc.container_index, 0x0102);
        assert_eq!(loc.file_offset, 0x0000_DEAD_BEEF);
        assert_eq!(loc.block_offset, 0x1234_5678);
        assert_eq!(loc.content_type, 0xAB);
        assert_eq!(loc.block_count, 0x42);
        assert_eq!(reader.position(), 16);
    }

    #[test]
    fn test_resource_info_reserved_fields() {
        let mut data = vec![0u8; 16]; // guid
        data.extend_from_slice(&0xAABB_CCDDu32.to_le_bytes()); // type name hash
        data.extend_from_slice(&3u32.to_le_bytes()); // part index
        data.extend_from_slice(&0u32.to_le_bytes()); // reserved0
        data.extend_from_slice(&0u32.to_le_bytes()); // reserved1

        let mut reader = BinaryReader::new(&data);
        let info = ResourceInfo::read(&mut reader).unwrap();
        assert_eq!(info.type_name_hash, 0xAABB_CCDD);
        assert_eq!(info.part_index, 3);

        // Any non-zero reserved field is fatal, regardless of the rest.
        for reserved_index in 0..2 {
            let mut bad = data.clone();
            bad[24 + reserved_index * 4] = 1;
            let mut reader = BinaryReader::new(&bad);
            assert!(matches!(
                ResourceInfo::read(&mut reader),
                Err(Error::InvalidResourceRecord)
            ));
        }
    }
}
