//! KFC2 archive container parsing.
//!
//! A KFC2 file is a header, fifteen fixed-purpose metadata sections, and one
//! large payload region holding every resource's serialized bytes. The header
//! stores each section as a (relative offset, count) pair; the relative
//! offset resolves against the file position of the offset field itself.

use std::fs::File;
use std::ops::Range;
use std::path::Path;

use memmap2::Mmap;
use veles_common::BinaryReader;

use crate::sections::{
    ContainerInfo, ContentInfo, ContentLocation, LookupTableEntry, ReflectionTypeInfo,
    ReflectionTypeNameHash, ResourceBundle, ResourceInfo, ResourceLocation, SectionRecord,
};
use crate::svn::SvnVersion;
use crate::{Error, Result};

/// Magic bytes at the start of every KFC2 archive.
pub const KFC2_MAGIC: &[u8; 4] = b"KFC2";

/// A section's (relative offset, count) pair, with the position it was read at.
///
/// The capture of `base` must happen before the offset field is consumed:
/// `offset()` resolves as `base + relative_offset`, not relative to the
/// position after the pair.
#[derive(Debug, Clone, Copy)]
struct SectionHeader {
    base: usize,
    relative_offset: u32,
    count: u32,
}

impl SectionHeader {
    fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let base = reader.position();
        let relative_offset = reader.read_u32()?;
        let count = reader.read_u32()?;
        Ok(Self {
            base,
            relative_offset,
            count,
        })
    }

    #[inline]
    fn offset(&self) -> usize {
        self.base + self.relative_offset as usize
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.relative_offset == 0 && self.count == 0
    }
}

/// The parsed metadata of a KFC2 archive.
///
/// Holds the fifteen section tables; the resource payload bytes themselves
/// stay in the backing file and are addressed via [`resource_range`]
/// (see [`KfcFile`] for a memory-mapped pairing).
///
/// [`resource_range`]: Self::resource_range
#[derive(Debug, Clone)]
pub struct KfcArchive {
    svn_version: SvnVersion,
    container_infos: Vec<ContainerInfo>,
    resource_bundles: Vec<ResourceBundle>,
    resource_priorities: Vec<u32>,
    content_lookup_table: Vec<LookupTableEntry>,
    content_infos: Vec<ContentInfo>,
    content_locations: Vec<ContentLocation>,
    resource_lookup_table: Vec<LookupTableEntry>,
    resource_infos: Vec<ResourceInfo>,
    resource_locations: Vec<ResourceLocation>,
    reflection_type_lookup_table: Vec<LookupTableEntry>,
    reflection_type_name_hashes: Vec<ReflectionTypeNameHash>,
    reflection_type_infos: Vec<ReflectionTypeInfo>,
}

impl KfcArchive {
    /// Parse the archive metadata from the full file contents.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);

        reader.expect_magic(KFC2_MAGIC)?;
        let _data_start_offset = reader.read_u32()?;
        let _field_8 = reader.read_u32()?;
        let _field_c = reader.read_u32()?;

        // The fifteen section headers are interleaved with the cursor: each
        // relative offset resolves against the position of its own offset
        // field, so they must be consumed strictly in file order.
        let version_tag = SectionHeader::read(&mut reader)?;
        let container_info = SectionHeader::read(&mut reader)?;
        let reserved2 = SectionHeader::read(&mut reader)?;
        let reserved3 = SectionHeader::read(&mut reader)?;
        let resource_bundle = SectionHeader::read(&mut reader)?;
        let resource_priority = SectionHeader::read(&mut reader)?;
        let content_lookup = SectionHeader::read(&mut reader)?;
        let content_info = SectionHeader::read(&mut reader)?;
        let content_location = SectionHeader::read(&mut reader)?;
        let resource_lookup = SectionHeader::read(&mut reader)?;
        let resource_info = SectionHeader::read(&mut reader)?;
        let resource_location = SectionHeader::read(&mut reader)?;
        let reflection_type_lookup = SectionHeader::read(&mut reader)?;
        let reflection_type_name_hash = SectionHeader::read(&mut reader)?;
        let reflection_type_info = SectionHeader::read(&mut reader)?;

        // Sections 2 and 3 are reserved; any use of them means a format
        // feature this parser does not know.
        if !reserved2.is_empty() {
            return Err(Error::ReservedSection(2));
        }
        if !reserved3.is_empty() {
            return Err(Error::ReservedSection(3));
        }

        // Section 0 - SVN version tag
        reader.seek(version_tag.offset());
        let svn_version = SvnVersion::parse(reader.read_string(version_tag.count as usize)?)?;

        // Section 1 - Container Info Table
        let container_infos = read_table(&mut reader, &container_info)?;

        // Section 4 - Resource Bundle Table
        let resource_bundles: Vec<ResourceBundle> = read_table(&mut reader, &resource_bundle)?;
        if resource_bundles.len() != 1 {
            return Err(Error::BundleCount(resource_bundles.len()));
        }

        // Section 5 - Resource Priority Table
        let resource_priorities = read_table(&mut reader, &resource_priority)?;

        // Section 6 - Content Lookup Table
        let content_lookup_table = read_table(&mut reader, &content_lookup)?;

        // Section 7 - Content Info Table
        let content_infos = read_table(&mut reader, &content_info)?;

        // Section 8 - Content Location Table
        let content_locations = read_table(&mut reader, &content_location)?;

        // Section 9 - Resource Lookup Table
        let resource_lookup_table = read_table(&mut reader, &resource_lookup)?;

        // Section 10 - Resource Info Table
        let resource_infos = read_table(&mut reader, &resource_info)?;

        // Section 11 - Resource Location Table
        let resource_locations = read_table(&mut reader, &resource_location)?;

        // Section 12 - Reflection Type Lookup Table
        let reflection_type_lookup_table = read_table(&mut reader, &reflection_type_lookup)?;

        // Section 13 - Reflection Type Name Hash Table
        let reflection_type_name_hashes = read_table(&mut reader, &reflection_type_name_hash)?;

        // Section 14 - Reflection Type Info Table
        let reflection_type_infos = read_table(&mut reader, &reflection_type_info)?;

        Ok(Self {
            svn_version,
            container_infos,
            resource_bundles,
            resource_priorities,
            content_lookup_table,
            content_infos,
            content_locations,
            resource_lookup_table,
            resource_infos,
            resource_locations,
            reflection_type_lookup_table,
            reflection_type_name_hashes,
            reflection_type_infos,
        })
    }

    /// The build version tag from section 0.
    #[inline]
    pub fn svn_version(&self) -> &SvnVersion {
        &self.svn_version
    }

    #[inline]
    pub fn container_infos(&self) -> &[ContainerInfo] {
        &self.container_infos
    }

    /// The single resource bundle (count is validated during parse).
    #[inline]
    pub fn bundle(&self) -> &ResourceBundle {
        &self.resource_bundles[0]
    }

    #[inline]
    pub fn resource_priorities(&self) -> &[u32] {
        &self.resource_priorities
    }

    #[inline]
    pub fn content_lookup_table(&self) -> &[LookupTableEntry] {
        &self.content_lookup_table
    }

    #[inline]
    pub fn content_infos(&self) -> &[ContentInfo] {
        &self.content_infos
    }

    #[inline]
    pub fn content_locations(&self) -> &[ContentLocation] {
        &self.content_locations
    }

    #[inline]
    pub fn resource_lookup_table(&self) -> &[LookupTableEntry] {
        &self.resource_lookup_table
    }

    #[inline]
    pub fn resource_infos(&self) -> &[ResourceInfo] {
        &self.resource_infos
    }

    #[inline]
    pub fn resource_locations(&self) -> &[ResourceLocation] {
        &self.resource_locations
    }

    #[inline]
    pub fn reflection_type_lookup_table(&self) -> &[LookupTableEntry] {
        &self.reflection_type_lookup_table
    }

    #[inline]
    pub fn reflection_type_name_hashes(&self) -> &[ReflectionTypeNameHash] {
        &self.reflection_type_name_hashes
    }

    #[inline]
    pub fn reflection_type_infos(&self) -> &[ReflectionTypeInfo] {
        &self.reflection_type_infos
    }

    /// Number of resources in the archive.
    #[inline]
    pub fn resource_count(&self) -> usize {
        self.resource_infos.len()
    }

    /// Absolute file offset where the resource payload region starts.
    #[inline]
    pub fn payload_base(&self) -> u64 {
        u64::from(self.bundle().file_offset_start)
    }

    /// Absolute byte range of a resource's payload within the file.
    pub fn resource_range(&self, index: usize) -> Option<Range<usize>> {
        let location = self.resource_locations.get(index)?;
        let start = self.payload_base() as usize + location.offset as usize;
        Some(start..start + location.size as usize)
    }
}

fn read_table<T: SectionRecord>(
    reader: &mut BinaryReader<'_>,
    header: &SectionHeader,
) -> Result<Vec<T>> {
    reader.seek(header.offset());
    (0..header.count).map(|_| T::read(reader)).collect()
}

/// A memory-mapped KFC2 file paired with its parsed metadata.
pub struct KfcFile {
    mmap: Mmap,
    archive: KfcArchive,
}

impl KfcFile {
    /// Open and parse an archive from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let archive = KfcArchive::parse(&mmap)?;
        Ok(Self { mmap, archive })
    }

    /// The parsed archive metadata.
    #[inline]
    pub fn archive(&self) -> &KfcArchive {
        &self.archive
    }

    /// The full file contents.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.mmap
    }

    /// The payload bytes of the resource at `index`.
    pub fn resource_bytes(&self, index: usize) -> Result<&[u8]> {
        let range = self
            .archive
            .resource_range(index)
            .ok_or(Error::ResourceIndex {
                index,
                count: self.archive.resource_count(),
            })?;

        if range.end > self.mmap.len() {
            return Err(Error::ResourceBounds {
                index,
                start: range.start,
                end: range.end,
                len: self.mmap.len(),
            });
        }

        Ok(&self.mmap[range])
    }
}

impl std::fmt::Debug for KfcFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KfcFile")
            .field("len", &self.mmap.len())
            .field("resources", &self.archive.resource_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVN_TAG: &str = "637515|^/game38/branches/ea_update_05|2025-01-29T16:45:54.448600Z";

    /// Lay out a synthetic archive: 16-byte header scalars, fifteen
    /// (relative offset, count) pairs, then the section data in order.
    /// Relative offsets are computed against each pair's own position.
    fn build_archive(sections: &[(Vec<u8>, u32)]) -> Vec<u8> {
        assert_eq!(sections.len(), 15);

        let header_len = 16 + 15 * 8;
        let mut out = vec![0u8; header_len];
        out[0..4].copy_from_slice(KFC2_MAGIC);
        out[4..8].copy_from_slice(&(header_len as u32).to_le_bytes());

        let mut data_cursor = header_len;
        let mut payload = Vec::new();
        for (i, (bytes, count)) in sections.iter().enumerate() {
            let field_pos = 16 + i * 8;
            let relative = if bytes.is_empty() && *count == 0 {
                0
            } else {
                (data_cursor - field_pos) as u32
            };
            out[field_pos..field_pos + 4].copy_from_slice(&relative.to_le_bytes());
            out[field_pos + 4..field_pos + 8].copy_from_slice(&count.to_le_bytes());
            payload.extend_from_slice(bytes);
            data_cursor += bytes.len();
        }

        out.extend_from_slice(&payload);
        out
    }

    fn u32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn resource_info_bytes(type_name_hash: u32, part_index: u32) -> Vec<u8> {
        let mut bytes = vec![0u8; 16];
        bytes.extend_from_slice(&u32s(&[type_name_hash, part_index, 0, 0]));
        bytes
    }

    fn valid_sections() -> Vec<(Vec<u8>, u32)> {
        vec![
            (SVN_TAG.as_bytes().to_vec(), SVN_TAG.len() as u32), // 0: version tag
            (u32s(&[4096, 0, 7, 0]), 1),                         // 1: container info
            (Vec::new(), 0),                                     // 2: reserved
            (Vec::new(), 0),                                     // 3: reserved
            (u32s(&[1000, 512, 2]), 1),                          // 4: resource bundle
            (u32s(&[1, 0]), 2),                                  // 5: priorities
            (u32s(&[0, 10, 11, 20]), 2),                         // 6: content lookup
            (u32s(&[64, 0x0001_0000, 0xDEAD_BEEF, 0x0002_0003]), 1), // 7: content info
            (u32s(&[0x100, 0, 0x40, 0x0100_0002]), 1),           // 8: content location
            (u32s(&[0, 1]), 1),                                  // 9: resource lookup
            (
                [
                    resource_info_bytes(0xAAAA_0001, 0),
                    resource_info_bytes(0xAAAA_0002, 1),
                ]
                .concat(),
                2,
            ), // 10: resource info
            (u32s(&[50, 16, 100, 32]), 2),                       // 11: resource location
            (u32s(&[0, 1]), 1),                                  // 12: reflection lookup
            (u32s(&[0xAAAA_0001]), 1),                           // 13: type name hashes
            (u32s(&[0xBBBB_0001, 0, 2]), 1),                     // 14: reflection type info
        ]
    }

    #[test]
    fn test_offset_resolves_against_field_position() {
        // The resolved offset is field position + raw value, regardless of
        // what gets read after the offset field.
        let mut data = vec![0u8; 8];
        data.extend_from_slice(&0x10u32.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());

        let mut reader = BinaryReader::new(&data);
        reader.seek(8);
        let header = SectionHeader::read(&mut reader).unwrap();

        assert_eq!(header.offset(), 8 + 0x10);
        assert_eq!(header.count, 3);
        assert_eq!(reader.position(), 16);
    }

    #[test]
    fn test_parse_valid_archive() {
        let data = build_archive(&valid_sections());
        let archive = KfcArchive::parse(&data).unwrap();

        assert_eq!(archive.svn_version().version, 637515);
        assert_eq!(archive.svn_version().to_string(), SVN_TAG);

        assert_eq!(archive.container_infos().len(), 1);
        assert_eq!(archive.container_infos()[0].container_size, 4096);
        assert_eq!(archive.bundle().file_offset_start, 1000);
        assert_eq!(archive.resource_priorities(), &[1, 0]);
        assert_eq!(archive.content_lookup_table().len(), 2);
        assert_eq!(archive.content_lookup_table()[1].min_index, 11);
        assert_eq!(archive.content_infos()[0].content_hash, 0xDEAD_BEEF);
        assert_eq!(archive.content_locations()[0].content_type, 0x01);
        assert_eq!(archive.content_locations()[0].block_count, 2);
        assert_eq!(archive.resource_infos().len(), 2);
        assert_eq!(archive.resource_infos()[1].part_index, 1);
        assert_eq!(archive.resource_locations().len(), 2);
        assert_eq!(archive.reflection_type_name_hashes()[0].type_name_hash, 0xAAAA_0001);
        assert_eq!(archive.reflection_type_infos()[0].instance_count, 2);
    }

    #[test]
    fn test_resource_range() {
        // (offset=50, size=16) against payload base 1000 -> [1050, 1066)
        let data = build_archive(&valid_sections());
        let archive = KfcArchive::parse(&data).unwrap();

        assert_eq!(archive.payload_base(), 1000);
        assert_eq!(archive.resource_range(0), Some(1050..1066));
        assert_eq!(archive.resource_range(1), Some(1100..1132));
        assert_eq!(archive.resource_range(2), None);
    }

    #[test]
    fn test_wrong_magic() {
        let mut data = build_archive(&valid_sections());
        data[0..4].copy_from_slice(b"KFC3");

        assert!(matches!(
            KfcArchive::parse(&data),
            Err(Error::Common(veles_common::Error::InvalidMagic { .. }))
        ));
    }

    #[test]
    fn test_reserved_section_must_be_empty() {
        for section in [2usize, 3] {
            let mut sections = valid_sections();
            sections[section] = (u32s(&[0]), 1);
            let data = build_archive(&sections);

            let index = section as u32;
            assert!(matches!(
                KfcArchive::parse(&data),
                Err(Error::ReservedSection(i)) if i == index
            ));
        }
    }

    #[test]
    fn test_bundle_count_must_be_one() {
        let mut sections = valid_sections();
        sections[4] = (u32s(&[1000, 512, 2, 2000, 512, 2]), 2);
        let data = build_archive(&sections);

        assert!(matches!(
            KfcArchive::parse(&data),
            Err(Error::BundleCount(2))
        ));

        let mut sections = valid_sections();
        sections[4] = (Vec::new(), 0);
        let data = build_archive(&sections);

        assert!(matches!(
            KfcArchive::parse(&data),
            Err(Error::BundleCount(0))
        ));
    }

    #[test]
    fn test_nonzero_reserved_resource_field_is_fatal() {
        let mut sections = valid_sections();
        let mut record = resource_info_bytes(0xAAAA_0001, 0);
        record[24] = 1; // reserved0
        sections[10] = (record, 1);
        let data = build_archive(&sections);

        assert!(matches!(
            KfcArchive::parse(&data),
            Err(Error::InvalidResourceRecord)
        ));
    }

    #[test]
    fn test_malformed_svn_tag() {
        let mut sections = valid_sections();
        let tag = "not-a-version-tag";
        sections[0] = (tag.as_bytes().to_vec(), tag.len() as u32);
        let data = build_archive(&sections);

        assert!(matches!(
            KfcArchive::parse(&data),
            Err(Error::SvnVersion(_))
        ));
    }

    #[test]
    fn test_truncated_archive() {
        let data = build_archive(&valid_sections());
        assert!(KfcArchive::parse(&data[..40]).is_err());
    }
}
