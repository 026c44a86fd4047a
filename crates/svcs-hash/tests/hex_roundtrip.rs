//! Hex codec and object-id round-trip properties.

use svcs_hash::{hex, HashError, Hasher, ObjectId, HASH_HEX_SIZE};

#[test]
fn encode_length_is_64() {
    let oid = Hasher::digest(b"anything");
    assert_eq!(oid.to_hex().len(), HASH_HEX_SIZE);
}

#[test]
fn decode_encode_identity() {
    for seed in [b"a".as_slice(), b"bb", b"", b"\x00\xff"] {
        let oid = Hasher::digest(seed);
        let hex = oid.to_hex();
        assert_eq!(ObjectId::from_hex(&hex).unwrap(), oid);
    }
}

#[test]
fn decode_rejects_every_other_length() {
    for len in [0usize, 1, 40, 63, 65, 128] {
        let s = "a".repeat(len);
        let err = ObjectId::from_hex(&s).unwrap_err();
        assert!(
            matches!(err, HashError::InvalidHexLength { actual, .. } if actual == len),
            "length {len} should be rejected"
        );
    }
}

#[test]
fn decode_rejects_non_hex() {
    let s = format!("g{}", "a".repeat(63));
    assert!(matches!(
        ObjectId::from_hex(&s),
        Err(HashError::InvalidHex { position: 0, .. })
    ));
}

#[test]
fn uppercase_decodes_to_same_id() {
    let oid = Hasher::digest(b"case");
    let upper = oid.to_hex().to_uppercase();
    assert_eq!(ObjectId::from_hex(&upper).unwrap(), oid);
}

#[test]
fn is_hex_predicate() {
    assert!(hex::is_hex("0123456789abcdefABCDEF"));
    assert!(!hex::is_hex("0123x"));
}

#[test]
fn distinct_inputs_distinct_digests() {
    let mut seen = std::collections::HashSet::new();
    for i in 0..256u32 {
        let oid = Hasher::digest(&i.to_le_bytes());
        assert!(seen.insert(oid), "collision at {i}");
    }
}
