use bstr::{BStr, BString, ByteSlice};
use svcs_hash::{ObjectId, HASH_SIZE};

use crate::{ObjectError, ObjectType};

/// File mode for tree entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Regular file (100644)
    Regular,
    /// Executable file (100755)
    Executable,
    /// Subdirectory (040000)
    Tree,
}

impl FileMode {
    /// Parse from octal ASCII bytes (e.g., `b"100644"`).
    pub fn from_bytes(s: &[u8]) -> Result<Self, ObjectError> {
        let raw = parse_octal(s)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))?;
        Self::from_raw(raw)
            .ok_or_else(|| ObjectError::InvalidFileMode(String::from_utf8_lossy(s).into()))
    }

    /// Create from the raw numeric value.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o040000 => Some(Self::Tree),
            _ => None,
        }
    }

    /// Get the raw numeric value.
    pub fn raw(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Tree => 0o40000,
        }
    }

    /// Serialize to octal ASCII bytes (no leading zeros).
    pub fn as_bytes(&self) -> BString {
        BString::from(format!("{:o}", self.raw()))
    }

    /// Is this a tree (directory) entry?
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    /// Is this a blob (file) entry?
    pub fn is_blob(&self) -> bool {
        matches!(self, Self::Regular | Self::Executable)
    }

    /// The object type the entry's id refers to.
    pub fn object_type(&self) -> ObjectType {
        if self.is_tree() {
            ObjectType::Tree
        } else {
            ObjectType::Blob
        }
    }
}

/// Parse an octal ASCII string to u32.
fn parse_octal(s: &[u8]) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut val: u32 = 0;
    for &b in s {
        if !(b'0'..=b'7').contains(&b) {
            return None;
        }
        val = val.checked_mul(8)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(val)
}

/// A single entry in a tree object.
///
/// Trees here are flat: `name` is the full working-tree-relative path of the
/// entry, with forward slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: BString,
    pub oid: ObjectId,
}

/// A tree object — a snapshot listing of tracked paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tree payload from binary format.
    ///
    /// Each entry is: `<mode-ascii> <name>\0<32 raw digest bytes>`
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let mut entries = Vec::new();
        let mut pos = 0;

        while pos < payload.len() {
            let space_pos = payload[pos..]
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "missing space after mode".into(),
                })?
                + pos;

            let mode = FileMode::from_bytes(&payload[pos..space_pos]).map_err(|_| {
                ObjectError::InvalidTreeEntry {
                    offset: pos,
                    reason: "invalid mode".into(),
                }
            })?;

            let name_start = space_pos + 1;
            let null_pos = payload[name_start..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| ObjectError::InvalidTreeEntry {
                    offset: name_start,
                    reason: "missing null after name".into(),
                })?
                + name_start;

            let name = BString::from(&payload[name_start..null_pos]);

            let oid_start = null_pos + 1;
            if oid_start + HASH_SIZE > payload.len() {
                return Err(ObjectError::InvalidTreeEntry {
                    offset: oid_start,
                    reason: "truncated object id".into(),
                });
            }
            let oid = ObjectId::from_bytes(&payload[oid_start..oid_start + HASH_SIZE])?;

            entries.push(TreeEntry { mode, name, oid });
            pos = oid_start + HASH_SIZE;
        }

        Ok(Self { entries })
    }

    /// Serialize tree payload to binary format.
    ///
    /// Entries are written sorted by path bytes so identical contents yield
    /// identical object ids.
    pub fn serialize_payload(&self) -> Vec<u8> {
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));

        let mut out = Vec::new();
        for entry in sorted {
            out.extend_from_slice(&entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(&entry.name);
            out.push(0);
            out.extend_from_slice(entry.oid.as_bytes());
        }
        out
    }

    /// Sort entries by path bytes in place.
    pub fn sort(&mut self) {
        self.entries.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Lookup an entry by path.
    pub fn find(&self, name: &BStr) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name.as_bstr() == name)
    }

    /// Iterate entries.
    pub fn iter(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcs_hash::Hasher;

    #[test]
    fn file_mode_roundtrip() {
        for mode in [FileMode::Regular, FileMode::Executable, FileMode::Tree] {
            let bytes = mode.as_bytes();
            let parsed = FileMode::from_bytes(&bytes).unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn file_mode_rejects_unknown() {
        assert!(FileMode::from_bytes(b"120000").is_err());
        assert!(FileMode::from_bytes(b"").is_err());
        assert!(FileMode::from_bytes(b"10064x").is_err());
    }

    #[test]
    fn file_mode_predicates() {
        assert!(FileMode::Tree.is_tree());
        assert!(!FileMode::Regular.is_tree());
        assert!(FileMode::Regular.is_blob());
        assert!(FileMode::Executable.is_blob());
        assert_eq!(FileMode::Regular.object_type(), ObjectType::Blob);
        assert_eq!(FileMode::Tree.object_type(), ObjectType::Tree);
    }

    #[test]
    fn parse_empty_tree() {
        let tree = Tree::parse(b"").unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn parse_single_entry() {
        let oid = Hasher::digest(b"content");
        let mut data = Vec::new();
        data.extend_from_slice(b"100644 hello.txt\0");
        data.extend_from_slice(oid.as_bytes());

        let tree = Tree::parse(&data).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.entries[0].mode, FileMode::Regular);
        assert_eq!(tree.entries[0].name, "hello.txt");
        assert_eq!(tree.entries[0].oid, oid);
    }

    #[test]
    fn parse_truncated_oid() {
        let mut data = Vec::new();
        data.extend_from_slice(b"100644 f\0");
        data.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            Tree::parse(&data),
            Err(ObjectError::InvalidTreeEntry { .. })
        ));
    }

    #[test]
    fn serialize_sorts_by_path_bytes() {
        let oid = Hasher::digest(b"x");
        let tree = Tree {
            entries: vec![
                TreeEntry {
                    mode: FileMode::Regular,
                    name: BString::from("b.txt"),
                    oid,
                },
                TreeEntry {
                    mode: FileMode::Regular,
                    name: BString::from("a/c.txt"),
                    oid,
                },
            ],
        };

        let parsed = Tree::parse(&tree.serialize_payload()).unwrap();
        assert_eq!(parsed.entries[0].name, "a/c.txt");
        assert_eq!(parsed.entries[1].name, "b.txt");
    }

    #[test]
    fn serialize_roundtrip() {
        let tree = Tree {
            entries: vec![TreeEntry {
                mode: FileMode::Executable,
                name: BString::from("bin/run.sh"),
                oid: Hasher::digest(b"#!/bin/sh\n"),
            }],
        };
        let parsed = Tree::parse(&tree.serialize_payload()).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn identical_contents_identical_payload() {
        let oid = Hasher::digest(b"same");
        let make = |order: &[&str]| Tree {
            entries: order
                .iter()
                .map(|n| TreeEntry {
                    mode: FileMode::Regular,
                    name: BString::from(*n),
                    oid,
                })
                .collect(),
        };
        let a = make(&["x", "y"]);
        let b = make(&["y", "x"]);
        assert_eq!(a.serialize_payload(), b.serialize_payload());
    }

    #[test]
    fn find_entry() {
        let tree = Tree {
            entries: vec![TreeEntry {
                mode: FileMode::Regular,
                name: BString::from("README.md"),
                oid: ObjectId::NULL,
            }],
        };
        assert!(tree.find(BStr::new("README.md")).is_some());
        assert!(tree.find(BStr::new("absent")).is_none());
    }
}
