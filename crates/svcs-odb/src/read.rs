use std::fs;

use svcs_hash::ObjectId;
use svcs_object::{header, Object, ObjectType};

use crate::codec;
use crate::{ObjectStore, OdbError};

impl ObjectStore {
    /// Check if an object exists.
    pub fn contains(&self, oid: &ObjectId) -> bool {
        self.object_path(oid).is_file()
    }

    /// Read an object by id.
    ///
    /// Fails with [`OdbError::NotFound`] if the object does not exist, and
    /// with [`OdbError::Corrupt`] if it exists but cannot be decoded.
    pub fn read(&self, oid: &ObjectId) -> Result<Object, OdbError> {
        let decompressed = self.read_decompressed(oid)?;
        let (obj_type, payload_size, header_len) = parse_validated_header(&decompressed, oid)?;

        let payload = &decompressed[header_len..];
        if payload.len() != payload_size {
            return Err(OdbError::Corrupt {
                oid: oid.to_hex(),
                reason: format!(
                    "size mismatch: header declares {}, payload is {}",
                    payload_size,
                    payload.len()
                ),
            });
        }

        Ok(Object::parse_payload(obj_type, payload)?)
    }

    /// Read just the header (type + size) of an object.
    pub fn read_header(&self, oid: &ObjectId) -> Result<(ObjectType, usize), OdbError> {
        let decompressed = self.read_decompressed(oid)?;
        let (obj_type, payload_size, _) = parse_validated_header(&decompressed, oid)?;
        Ok((obj_type, payload_size))
    }

    fn read_decompressed(&self, oid: &ObjectId) -> Result<Vec<u8>, OdbError> {
        let path = self.object_path(oid);
        let compressed = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(OdbError::NotFound(*oid))
            }
            Err(e) => return Err(OdbError::Io(e)),
        };

        codec::decompress(&compressed).map_err(|e| OdbError::Decompress {
            oid: oid.to_hex(),
            source: e,
        })
    }
}

fn parse_validated_header(
    decompressed: &[u8],
    oid: &ObjectId,
) -> Result<(ObjectType, usize, usize), OdbError> {
    header::parse_header(decompressed).map_err(|e| OdbError::Corrupt {
        oid: oid.to_hex(),
        reason: e.to_string(),
    })
}
