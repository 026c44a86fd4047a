use std::fs;

use svcs_hash::{hex, ObjectId};

use crate::{ObjectStore, OdbError};

impl ObjectStore {
    /// Enumerate the ids of all stored objects.
    pub fn iter_oids(&self) -> Result<Vec<ObjectId>, OdbError> {
        let mut oids = Vec::new();

        let fanout_dirs = match fs::read_dir(self.objects_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(oids),
            Err(e) => return Err(OdbError::Io(e)),
        };

        for dir_entry in fanout_dirs {
            let dir_entry = dir_entry?;
            let dir_name = dir_entry.file_name();
            let Some(prefix) = dir_name.to_str() else {
                continue;
            };
            if prefix.len() != 2 || !hex::is_hex(prefix) || !dir_entry.path().is_dir() {
                continue;
            }

            for file_entry in fs::read_dir(dir_entry.path())? {
                let file_entry = file_entry?;
                let file_name = file_entry.file_name();
                let Some(rest) = file_name.to_str() else {
                    continue;
                };
                let full = format!("{prefix}{rest}");
                if let Ok(oid) = ObjectId::from_hex(&full) {
                    oids.push(oid);
                }
            }
        }

        oids.sort();
        Ok(oids)
    }

    /// Resolve a hex id prefix to a full object id.
    ///
    /// Fails with [`OdbError::Ambiguous`] when more than one object matches
    /// and [`OdbError::PrefixNotFound`] when none does. Prefixes shorter
    /// than 4 characters are rejected as invalid.
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId, OdbError> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 4 || prefix.len() > 64 || !hex::is_hex(&prefix) {
            return Err(OdbError::InvalidPrefix(prefix));
        }
        if prefix.len() == 64 {
            let oid = ObjectId::from_hex(&prefix).map_err(OdbError::Hash)?;
            return if self.contains(&oid) {
                Ok(oid)
            } else {
                Err(OdbError::PrefixNotFound(prefix))
            };
        }

        let matches: Vec<ObjectId> = self
            .iter_oids()?
            .into_iter()
            .filter(|oid| oid.to_hex().starts_with(&prefix))
            .collect();

        match matches.len() {
            0 => Err(OdbError::PrefixNotFound(prefix)),
            1 => Ok(matches[0]),
            count => Err(OdbError::Ambiguous { prefix, count }),
        }
    }
}
