use std::{
    borrow::Borrow,
    fmt,
    ops::Deref,
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Wrapper type around [`bytes::Bytes`] that is displayed and (de)serialized as 0x-prefixed hex.
///
/// Used for every identity in the router: tokens, pools (which double as their pool token),
/// wrapped assets and accounts.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes(pub bytes::Bytes);

#[derive(Error, Debug, PartialEq)]
#[error("Failed to parse hex bytes '{input}': {source}")]
pub struct ParseBytesError {
    input: String,
    #[source]
    source: hex::FromHexError,
}

impl Bytes {
    pub fn new() -> Self {
        Self(bytes::Bytes::new())
    }

    /// Returns a zero filled value of the given length.
    pub fn zero(length: usize) -> Self {
        Self(bytes::Bytes::from(vec![0u8; length]))
    }

    /// Builds a 20 byte identifier whose low bytes hold `value` big endian.
    pub fn from_low_u64(value: u64) -> Self {
        let mut buf = vec![0u8; 12];
        buf.extend_from_slice(&value.to_be_bytes());
        Self(bytes::Bytes::from(buf))
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes(0x{})", hex::encode(self.0.as_ref()))
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_ref()))
    }
}

impl fmt::LowerHex for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        write!(f, "{}", hex::encode(self.0.as_ref()))
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Borrow<[u8]> for Bytes {
    fn borrow(&self) -> &[u8] {
        self.as_ref()
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(bytes::Bytes::from(value))
    }
}

impl From<&[u8]> for Bytes {
    fn from(value: &[u8]) -> Self {
        Self(bytes::Bytes::copy_from_slice(value))
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(value: [u8; N]) -> Self {
        Self(bytes::Bytes::copy_from_slice(&value))
    }
}

impl FromStr for Bytes {
    type Err = ParseBytesError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let stripped = value
            .strip_prefix("0x")
            .unwrap_or(value);
        hex::decode(stripped)
            .map(Into::into)
            .map_err(|source| ParseBytesError { input: value.to_string(), source })
    }
}

impl Serialize for Bytes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Bytes::from_str(&value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_str_with_and_without_prefix() {
        let prefixed = Bytes::from_str("0x0a0b").unwrap();
        let plain = Bytes::from_str("0a0b").unwrap();

        assert_eq!(prefixed, plain);
        assert_eq!(prefixed.to_vec(), vec![0x0a, 0x0b]);
    }

    #[test]
    fn test_from_str_invalid() {
        assert!(Bytes::from_str("0xzz").is_err());
    }

    #[test]
    fn test_display_and_lower_hex() {
        let value = Bytes::from_low_u64(0xbeef);

        assert_eq!(value.len(), 20);
        assert_eq!(value.to_string(), "0x000000000000000000000000000000000000beef");
        assert_eq!(format!("{value:#x}"), "0x000000000000000000000000000000000000beef");
    }

    #[test]
    fn test_serde_roundtrip_as_hex_string() {
        let value = Bytes::from([0xde, 0xad]);

        let encoded = serde_json::to_string(&value).unwrap();
        assert_eq!(encoded, "\"0xdead\"");

        let decoded: Bytes = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_is_zero() {
        assert!(Bytes::zero(20).is_zero());
        assert!(!Bytes::from_low_u64(1).is_zero());
    }
}
