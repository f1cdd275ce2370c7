//! KFC GUID type - the 16-byte resource identifier used in KFC2 archives.
//!
//! Resource identities use the Microsoft GUID memory layout: the first three
//! groups are stored little-endian, the trailing eight bytes in order. The
//! textual form therefore does not match a byte-order hex dump.

use std::fmt;
use std::str::FromStr;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Error;

/// A 16-byte GUID as stored in KFC2 resource tables.
///
/// Format: `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`
///
/// # Byte Layout
///
/// - String positions 0-7 (first group): bytes 3,2,1,0
/// - String positions 9-12 (second group): bytes 5,4
/// - String positions 14-17 (third group): bytes 7,6
/// - String positions 19-22 (fourth group): bytes 8,9
/// - String positions 24-35 (fifth group): bytes 10..16 in order
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct KfcGuid {
    bytes: [u8; 16],
}

impl KfcGuid {
    /// Empty GUID (all zeros).
    pub const EMPTY: Self = Self { bytes: [0; 16] };

    /// Create a new KfcGuid from raw bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes of the GUID.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Check if the GUID is empty (all zeros).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes == [0; 16]
    }
}

impl fmt::Debug for KfcGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KfcGuid({})", self)
    }
}

impl fmt::Display for KfcGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.bytes[3], self.bytes[2], self.bytes[1], self.bytes[0],
            self.bytes[5], self.bytes[4],
            self.bytes[7], self.bytes[6],
            self.bytes[8], self.bytes[9],
            self.bytes[10], self.bytes[11], self.bytes[12], self.bytes[13], self.bytes[14], self.bytes[15]
        )
    }
}

impl FromStr for KfcGuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 36 || !s.is_ascii() {
            return Err(Error::InvalidGuid(format!(
                "expected 36 ASCII characters, got {}",
                s.len()
            )));
        }

        let raw = s.as_bytes();
        if raw[8] != b'-' || raw[13] != b'-' || raw[18] != b'-' || raw[23] != b'-' {
            return Err(Error::InvalidGuid("invalid hyphen positions".into()));
        }

        let parse_hex = |start: usize| -> Result<u8, Error> {
            u8::from_str_radix(&s[start..start + 2], 16)
                .map_err(|_| Error::InvalidGuid(format!("invalid hex at position {}", start)))
        };

        let mut bytes = [0u8; 16];

        // Map string positions to byte positions (inverse of Display)
        bytes[3] = parse_hex(0)?;
        bytes[2] = parse_hex(2)?;
        bytes[1] = parse_hex(4)?;
        bytes[0] = parse_hex(6)?;

        bytes[5] = parse_hex(9)?;
        bytes[4] = parse_hex(11)?;

        bytes[7] = parse_hex(14)?;
        bytes[6] = parse_hex(16)?;

        bytes[8] = parse_hex(19)?;
        bytes[9] = parse_hex(21)?;

        for (i, pos) in (24..36).step_by(2).enumerate() {
            bytes[10 + i] = parse_hex(pos)?;
        }

        Ok(Self { bytes })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for KfcGuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for KfcGuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_guid() {
        let guid = KfcGuid::EMPTY;
        assert!(guid.is_empty());
        assert_eq!(
            guid.to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_byte_ordering() {
        // First three groups are little-endian in memory.
        let guid = KfcGuid::from_bytes([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
            0x0E, 0x0F,
        ]);
        assert_eq!(guid.to_string(), "03020100-0504-0706-0809-0a0b0c0d0e0f");
    }

    #[test]
    fn test_roundtrip() {
        let original = "cd861d95-a79c-4c11-8b48-8fae34a4156c";
        let guid: KfcGuid = original.parse().unwrap();
        assert_eq!(guid.to_string(), original);
    }

    #[test]
    fn test_invalid_length() {
        assert!("too-short".parse::<KfcGuid>().is_err());
    }

    #[test]
    fn test_invalid_hyphens() {
        assert!("cd861d95_a79c-4c11-8b48-8fae34a4156c".parse::<KfcGuid>().is_err());
    }
}
