use std::fmt;
use std::str::FromStr;

use crate::hex::{hex_decode, hex_to_string};
use crate::{HashError, HASH_HEX_SIZE, HASH_SIZE};

/// An object identifier — the SHA3-256 digest of an object's typed payload.
///
/// The all-zeros id is a reserved sentinel meaning "no object" (for example
/// the parent of a root commit, or the tree of an empty index).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; HASH_SIZE]);

impl ObjectId {
    /// The null id (all zeros).
    pub const NULL: Self = Self([0u8; HASH_SIZE]);

    /// Create an ObjectId from a raw digest.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create an ObjectId from a byte slice of exactly [`HASH_SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        if bytes.len() != HASH_SIZE {
            return Err(HashError::InvalidHashLength {
                expected: HASH_SIZE,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; HASH_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Create an ObjectId from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, HashError> {
        if hex.len() != HASH_HEX_SIZE {
            return Err(HashError::InvalidHexLength {
                expected: HASH_HEX_SIZE,
                actual: hex.len(),
            });
        }
        let mut bytes = [0u8; HASH_SIZE];
        hex_decode(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Check if this is the null (all-zeros) id.
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Get the lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex_to_string(&self.0)
    }

    /// Get the abbreviated 8-character hex form used in log output.
    pub fn short_hex(&self) -> String {
        self.to_hex()[..8].to_string()
    }

    /// Get the loose object path component: `"xx/xxxx..."`.
    pub fn fanout_path(&self) -> String {
        let hex = self.to_hex();
        format!("{}/{}", &hex[..2], &hex[2..])
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl FromStr for ObjectId {
    type Err = HashError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SAMPLE_HEX: &str = "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a";

    #[test]
    fn from_hex_roundtrip() {
        let oid = ObjectId::from_hex(SAMPLE_HEX).unwrap();
        assert_eq!(oid.to_hex(), SAMPLE_HEX);
        let parsed: ObjectId = SAMPLE_HEX.parse().unwrap();
        assert_eq!(parsed, oid);
    }

    #[test]
    fn from_hex_wrong_length() {
        let err = ObjectId::from_hex("abcd").unwrap_err();
        assert!(matches!(err, HashError::InvalidHexLength { actual: 4, .. }));
    }

    #[test]
    fn from_hex_invalid_chars() {
        let bad = "z".repeat(64);
        let err = ObjectId::from_hex(&bad).unwrap_err();
        assert!(matches!(err, HashError::InvalidHex { .. }));
    }

    #[test]
    fn from_bytes_wrong_length() {
        let err = ObjectId::from_bytes(&[0; 10]).unwrap_err();
        assert!(matches!(
            err,
            HashError::InvalidHashLength {
                expected: 32,
                actual: 10
            }
        ));
    }

    #[test]
    fn null_oid() {
        assert!(ObjectId::NULL.is_null());
        let non_null = ObjectId::from_hex(SAMPLE_HEX).unwrap();
        assert!(!non_null.is_null());
    }

    #[test]
    fn debug_shows_short_hash() {
        let oid = ObjectId::from_hex(SAMPLE_HEX).unwrap();
        assert_eq!(format!("{:?}", oid), "ObjectId(a7ffc6f8)");
    }

    #[test]
    fn ordering() {
        let a = ObjectId::from_hex(&format!("{:064x}", 1u128)).unwrap();
        let b = ObjectId::from_hex(&format!("{:064x}", 2u128)).unwrap();
        assert!(a < b);
    }

    #[test]
    fn hashmap_key() {
        let oid = ObjectId::from_hex(SAMPLE_HEX).unwrap();
        let mut map = HashMap::new();
        map.insert(oid, "value");
        assert_eq!(map.get(&oid), Some(&"value"));
    }

    #[test]
    fn fanout_path() {
        let oid = ObjectId::from_hex(SAMPLE_HEX).unwrap();
        assert_eq!(oid.fanout_path(), format!("a7/{}", &SAMPLE_HEX[2..]));
    }
}
