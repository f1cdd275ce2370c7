//! SVN version tag handling.
//!
//! Section 0 of a KFC2 archive is a single UTF-8 string identifying the
//! build that produced the file: `version|branch|timestamp`.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// The build version tag stored in section 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnVersion {
    /// SVN revision number.
    pub version: i64,
    /// Branch path, e.g. `^/game38/branches/ea_update_05`.
    pub branch: String,
    /// Build timestamp.
    pub timestamp: DateTime<Utc>,
}

impl SvnVersion {
    /// Parse a `version|branch|timestamp` tag.
    pub fn parse(tag: &str) -> Result<Self> {
        if tag.is_empty() {
            return Err(Error::SvnVersion("empty version tag".into()));
        }

        let parts: Vec<&str> = tag.split('|').collect();
        if parts.len() != 3 {
            return Err(Error::SvnVersion(format!(
                "expected 'version|branch|timestamp', got {} fields",
                parts.len()
            )));
        }

        let version: i64 = parts[0]
            .parse()
            .map_err(|_| Error::SvnVersion(format!("invalid version number: {:?}", parts[0])))?;

        let timestamp = DateTime::parse_from_rfc3339(parts[2])
            .map_err(|_| Error::SvnVersion(format!("invalid timestamp: {:?}", parts[2])))?
            .with_timezone(&Utc);

        Ok(Self {
            version,
            branch: parts[1].to_string(),
            timestamp,
        })
    }
}

impl fmt::Display for SvnVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Archives carry a fixed 6-digit fractional second; reformatting the
        // canonical form must reproduce it byte-for-byte.
        write!(
            f,
            "{}|{}|{}",
            self.version,
            self.branch,
            self.timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "637515|^/game38/branches/ea_update_05|2025-01-29T16:45:54.448600Z";

    #[test]
    fn test_parse() {
        let svn = SvnVersion::parse(TAG).unwrap();
        assert_eq!(svn.version, 637515);
        assert_eq!(svn.branch, "^/game38/branches/ea_update_05");
        assert_eq!(
            svn.timestamp,
            DateTime::parse_from_rfc3339("2025-01-29T16:45:54.448600Z").unwrap()
        );
    }

    #[test]
    fn test_reformat_roundtrip() {
        let svn = SvnVersion::parse(TAG).unwrap();
        assert_eq!(svn.to_string(), TAG);
    }

    #[test]
    fn test_wrong_field_count() {
        assert!(SvnVersion::parse("637515|branch-only").is_err());
        assert!(SvnVersion::parse("").is_err());
    }

    #[test]
    fn test_invalid_version_number() {
        assert!(SvnVersion::parse("abc|branch|2025-01-29T16:45:54.448600Z").is_err());
    }

    #[test]
    fn test_invalid_timestamp() {
        assert!(SvnVersion::parse("1|branch|yesterday").is_err());
    }
}
