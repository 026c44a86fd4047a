use std::fs;
use std::path::Path;

use svcs_hash::{Hasher, ObjectId};
use svcs_object::{header, Object, ObjectType};

use crate::codec;
use crate::{ObjectStore, OdbError};

impl ObjectStore {
    /// Write an object to the store. Returns its id.
    ///
    /// No-op if the object already exists (content-addressed idempotence).
    /// The file is written atomically (temp file + rename).
    pub fn write(&self, obj: &Object) -> Result<ObjectId, OdbError> {
        let payload = obj.serialize_payload();
        self.write_raw(obj.object_type(), &payload)
    }

    /// Write a raw payload with a known type. Returns the object id.
    pub fn write_raw(&self, obj_type: ObjectType, payload: &[u8]) -> Result<ObjectId, OdbError> {
        let hdr = header::write_header(obj_type, payload.len());

        // The id is computed over the uncompressed header + payload.
        let oid = {
            let mut hasher = Hasher::new();
            hasher.update(&hdr);
            hasher.update(payload);
            hasher.finalize()
        };

        if self.contains(&oid) {
            return Ok(oid);
        }

        let final_path = self.object_path(&oid);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = write_to_temp(self.objects_dir(), &hdr, payload, self.compression_level)?;
        finalize_object(&tmp_path, &final_path)?;

        Ok(oid)
    }
}

/// Compress header + payload into a temp file under `objects_dir`.
fn write_to_temp(
    objects_dir: &Path,
    hdr: &[u8],
    payload: &[u8],
    level: flate2::Compression,
) -> Result<std::path::PathBuf, OdbError> {
    fs::create_dir_all(objects_dir)?;
    let tmp_path = objects_dir.join(format!(
        "tmp_obj_{}",
        std::process::id()
            ^ std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos()
    ));

    let mut buf = Vec::with_capacity(hdr.len() + payload.len());
    buf.extend_from_slice(hdr);
    buf.extend_from_slice(payload);
    let compressed = codec::compress(&buf, level)?;
    fs::write(&tmp_path, compressed)?;

    Ok(tmp_path)
}

/// Atomically move a temp file to its final destination.
///
/// If the destination already exists (race with another writer), the temp
/// file is removed and the write is treated as successful.
fn finalize_object(tmp: &Path, final_path: &Path) -> Result<(), OdbError> {
    match fs::rename(tmp, final_path) {
        Ok(()) => Ok(()),
        Err(_) if final_path.exists() => {
            let _ = fs::remove_file(tmp);
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp);
            Err(OdbError::Io(e))
        }
    }
}
