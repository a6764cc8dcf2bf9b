//! SNMP version enumeration.

use crate::error::Error;

/// SNMP protocol version.
///
/// Only the community-based versions are supported; the version tag is
/// validated when a session is created, so a `Version` in hand is always
/// one an agent exchange can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Version {
    /// SNMPv1 (RFC 1157)
    V1,
    /// SNMPv2c (RFC 1901)
    #[default]
    V2c,
}

impl Version {
    /// Get the BER-encoded version number.
    pub const fn as_i64(self) -> i64 {
        match self {
            Version::V1 => 0,
            Version::V2c => 1,
        }
    }

    /// Create from BER-encoded version number.
    pub const fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Version::V1),
            1 => Some(Version::V2c),
            _ => None,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Version::V1 => write!(f, "SNMPv1"),
            Version::V2c => write!(f, "SNMPv2c"),
        }
    }
}

impl std::str::FromStr for Version {
    type Err = Error;

    /// Parse the version strings accepted from configuration: "1"/"v1" and
    /// "2c"/"v2c". Anything else is a configuration error.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "1" | "v1" => Ok(Version::V1),
            "2c" | "v2c" => Ok(Version::V2c),
            other => Err(Error::config(format!(
                "unknown SNMP version {:?} (expected \"1\" or \"2c\")",
                other
            ))),
        }
    }
}
