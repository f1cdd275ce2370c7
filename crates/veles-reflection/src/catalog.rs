//! Dual-keyed index over the loaded type definitions.

use std::hash::BuildHasherDefault;

use hashbrown::HashMap;
use rustc_hash::FxHasher;

use crate::schema::TypeDefinition;
use crate::{Error, Result};

type FxHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// An immutable index over the reflection schema.
///
/// Resources name their type by hash1; types name each other by qualified
/// name. Both keys are indexed independently from the same backing list -
/// neither is derived from the other. The catalog is read-only after build
/// and safe to share across concurrent decodes.
#[derive(Debug)]
pub struct TypeCatalog {
    types: Vec<TypeDefinition>,
    by_name: FxHashMap<String, usize>,
    by_hash1: FxHashMap<u32, usize>,
}

impl TypeCatalog {
    /// Build the catalog from a loaded type definition list.
    ///
    /// Fails if two definitions share a qualified name or a hash1 value;
    /// an ambiguous schema cannot resolve types deterministically.
    pub fn build(types: Vec<TypeDefinition>) -> Result<Self> {
        let mut by_name = FxHashMap::with_capacity_and_hasher(types.len(), Default::default());
        let mut by_hash1 = FxHashMap::with_capacity_and_hasher(types.len(), Default::default());

        for (index, ty) in types.iter().enumerate() {
            if by_name.insert(ty.qualified_name.clone(), index).is_some() {
                return Err(Error::DuplicateTypeName(ty.qualified_name.clone()));
            }
            if by_hash1.insert(ty.hash1, index).is_some() {
                return Err(Error::DuplicateTypeHash(ty.hash1));
            }
        }

        Ok(Self {
            types,
            by_name,
            by_hash1,
        })
    }

    /// Look up a type by its fully qualified name.
    pub fn by_qualified_name(&self, name: &str) -> Result<&TypeDefinition> {
        self.by_name
            .get(name)
            .map(|&index| &self.types[index])
            .ok_or_else(|| Error::UnknownTypeName(name.to_string()))
    }

    /// Look up a type by the hash1 of its qualified name.
    pub fn by_hash1(&self, hash: u32) -> Result<&TypeDefinition> {
        self.by_hash1
            .get(&hash)
            .map(|&index| &self.types[index])
            .ok_or(Error::UnknownTypeHash(hash))
    }

    /// Number of types in the catalog.
    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the catalog is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all type definitions in schema order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::PrimitiveKind;
    use crate::schema::NamespaceTree;

    fn type_def(qualified_name: &str, hash1: u32) -> TypeDefinition {
        TypeDefinition {
            type_name_1: qualified_name.to_string(),
            type_name_2: qualified_name.to_string(),
            qualified_name: qualified_name.to_string(),
            namespace_tree: NamespaceTree {
                name: String::new(),
                parent: None,
            },
            referenced_type_name: None,
            class_size: 4,
            alignment_1: 4,
            alignment_2: 4,
            fields_count: 0,
            primitive_type: PrimitiveKind::Uint32,
            field_4d: 0,
            field_4e: 0,
            field_4f: 0,
            hash1,
            hash2: 0,
            struct_fields: Vec::new(),
            enum_fields: Vec::new(),
        }
    }

    #[test]
    fn test_dual_key_lookup() {
        let catalog =
            TypeCatalog::build(vec![type_def("uint32", 1), type_def("game::Item", 2)]).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.by_qualified_name("game::Item").unwrap().hash1, 2);
        assert_eq!(catalog.by_hash1(1).unwrap().qualified_name, "uint32");
    }

    #[test]
    fn test_missing_keys() {
        let catalog = TypeCatalog::build(vec![type_def("uint32", 1)]).unwrap();

        assert!(matches!(
            catalog.by_qualified_name("game::Missing"),
            Err(Error::UnknownTypeName(_))
        ));
        assert!(matches!(
            catalog.by_hash1(999),
            Err(Error::UnknownTypeHash(999))
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = TypeCatalog::build(vec![type_def("uint32", 1), type_def("uint32", 2)]);
        assert!(matches!(result, Err(Error::DuplicateTypeName(_))));
    }

    #[test]
    fn test_duplicate_hash_rejected() {
        let result = TypeCatalog::build(vec![type_def("uint32", 1), type_def("uint64", 1)]);
        assert!(matches!(result, Err(Error::DuplicateTypeHash(1))));
    }
}
