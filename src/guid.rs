//! Cluster-flavoured GUIDs.
//!
//! The cluster prints a 128-bit id as four little-endian 32-bit words in
//! lowercase hex without padding (`1-2c-3-4`), which is not the RFC 4122
//! text form, so `uuid::Uuid` is only used as the random source.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::yson::Yson;

/// Error returned when a string is not a GUID in cluster text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid GUID format: {0:?}")]
pub struct ParseGuidError(pub String);

/// 128-bit identifier used for correlation and transaction ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Guid([u8; 16]);

impl Guid {
    /// Generate a random GUID.
    pub fn new() -> Self {
        Self(*uuid::Uuid::new_v4().as_bytes())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 16]
    }

    /// Split into the four words used by the text form.
    pub fn parts(&self) -> (u32, u32, u32, u32) {
        let word = |i: usize| u32::from_le_bytes([self.0[i], self.0[i + 1], self.0[i + 2], self.0[i + 3]]);
        (word(0), word(4), word(8), word(12))
    }

    pub fn from_parts(a: u32, b: u32, c: u32, d: u32) -> Self {
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&a.to_le_bytes());
        bytes[4..8].copy_from_slice(&b.to_le_bytes());
        bytes[8..12].copy_from_slice(&c.to_le_bytes());
        bytes[12..16].copy_from_slice(&d.to_le_bytes());
        Self(bytes)
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b, c, d) = self.parts();
        write!(f, "{a:x}-{b:x}-{c:x}-{d:x}")
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

impl FromStr for Guid {
    type Err = ParseGuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseGuidError(s.to_string());

        let mut words = [0u32; 4];
        let mut parts = s.split('-');
        for word in &mut words {
            let part = parts.next().ok_or_else(invalid)?;
            if part.is_empty() || part.len() > 8 {
                return Err(invalid());
            }
            *word = u32::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::from_parts(words[0], words[1], words[2], words[3]))
    }
}

impl From<Guid> for Yson {
    fn from(guid: Guid) -> Self {
        Yson::String(guid.to_string())
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_form() {
        let guid = Guid::from_parts(1, 0x2c, 0xdeadbeef, 0);
        assert_eq!(guid.to_string(), "1-2c-deadbeef-0");
        assert_eq!("1-2c-deadbeef-0".parse::<Guid>().unwrap(), guid);
    }

    #[test]
    fn test_random_round_trip() {
        let guid = Guid::new();
        assert!(!guid.is_zero());
        assert_eq!(guid.to_string().parse::<Guid>().unwrap(), guid);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["", "1-2-3", "1-2-3-4-5", "x-2-3-4", "1--3-4", "123456789-0-0-0"] {
            assert!(bad.parse::<Guid>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_serde_as_string() {
        let guid = Guid::from_parts(10, 11, 12, 13);
        let json = serde_json::to_string(&guid).unwrap();
        assert_eq!(json, "\"a-b-c-d\"");
        assert_eq!(serde_json::from_str::<Guid>(&json).unwrap(), guid);
    }
}
