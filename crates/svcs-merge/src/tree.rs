//! Tree-level merge: classify every path across base/ours/theirs and drive
//! per-file content merges.

use std::collections::{BTreeMap, BTreeSet};

use bstr::BString;
use svcs_hash::ObjectId;
use svcs_object::{FileMode, Object};
use svcs_odb::ObjectStore;

use crate::content::{merge_content, ContentMergeResult};
use crate::{ConflictKind, LineRange, MergeConflict, MergeError};

/// One side's view of a path: blob id and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileEntry {
    pub oid: ObjectId,
    pub mode: FileMode,
}

/// A file in the merged result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedFile {
    pub content: Vec<u8>,
    pub mode: FileMode,
    /// Whether the content carries conflict markers.
    pub has_conflicts: bool,
}

/// Result of a tree-level merge.
#[derive(Debug, Clone, Default)]
pub struct TreeMergeResult {
    /// The merged view of every surviving path. Conflicted files carry
    /// marker content.
    pub files: BTreeMap<BString, MergedFile>,
    /// All conflicts, in path order.
    pub conflicts: Vec<MergeConflict>,
}

impl TreeMergeResult {
    /// Whether the merge completed without conflicts.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Merge three flat file maps, reading blob contents from `store`.
///
/// `theirs_label` names the incoming branch in conflict markers.
pub fn merge_trees(
    store: &ObjectStore,
    base: &BTreeMap<BString, FileEntry>,
    ours: &BTreeMap<BString, FileEntry>,
    theirs: &BTreeMap<BString, FileEntry>,
    theirs_label: &str,
) -> Result<TreeMergeResult, MergeError> {
    let mut result = TreeMergeResult::default();

    let mut paths: BTreeSet<&BString> = BTreeSet::new();
    paths.extend(base.keys());
    paths.extend(ours.keys());
    paths.extend(theirs.keys());

    for path in paths {
        let b = base.get(path);
        let o = ours.get(path);
        let t = theirs.get(path);

        match (b, o, t) {
            // Present everywhere: the three-way content case.
            (Some(b), Some(o), Some(t)) => {
                merge_present_everywhere(store, &mut result, path, b, o, t, theirs_label)?;
            }

            // Added on both sides.
            (None, Some(o), Some(t)) => {
                if o.oid == t.oid {
                    result.files.insert(
                        path.clone(),
                        MergedFile {
                            content: read_blob(store, path, &o.oid)?,
                            mode: o.mode,
                            has_conflicts: false,
                        },
                    );
                } else {
                    let our_content = read_blob(store, path, &o.oid)?;
                    let their_content = read_blob(store, path, &t.oid)?;
                    let merged =
                        merge_content(b"", &our_content, &their_content, theirs_label);
                    record_conflicted_file(
                        &mut result,
                        path,
                        ConflictKind::AddAdd,
                        &our_content,
                        &their_content,
                        merged.content().to_vec(),
                        o.mode,
                    );
                }
            }

            // Deleted by theirs.
            (Some(b), Some(o), None) => {
                if o.oid == b.oid {
                    // Unmodified by us, deleted by them: the deletion wins.
                } else {
                    let our_content = read_blob(store, path, &o.oid)?;
                    record_conflicted_file(
                        &mut result,
                        path,
                        ConflictKind::ModifyDelete,
                        &our_content,
                        b"",
                        our_content.clone(),
                        o.mode,
                    );
                }
            }

            // Deleted by ours.
            (Some(b), None, Some(t)) => {
                if t.oid == b.oid {
                    // Unmodified by them, deleted by us: the deletion wins.
                } else {
                    let their_content = read_blob(store, path, &t.oid)?;
                    record_conflicted_file(
                        &mut result,
                        path,
                        ConflictKind::DeleteModify,
                        b"",
                        &their_content,
                        their_content.clone(),
                        t.mode,
                    );
                }
            }

            // Added by exactly one side.
            (None, Some(entry), None) | (None, None, Some(entry)) => {
                result.files.insert(
                    path.clone(),
                    MergedFile {
                        content: read_blob(store, path, &entry.oid)?,
                        mode: entry.mode,
                        has_conflicts: false,
                    },
                );
            }

            // Deleted by both sides.
            (Some(_), None, None) => {}

            (None, None, None) => unreachable!("path collected from one of the maps"),
        }
    }

    Ok(result)
}

#[allow(clippy::too_many_arguments)]
fn merge_present_everywhere(
    store: &ObjectStore,
    result: &mut TreeMergeResult,
    path: &BString,
    b: &FileEntry,
    o: &FileEntry,
    t: &FileEntry,
    theirs_label: &str,
) -> Result<(), MergeError> {
    // Mode resolution: a side that changed the mode wins; both changing it
    // differently is a conflict.
    let mode = if o.mode == t.mode {
        Ok(o.mode)
    } else if o.mode == b.mode {
        Ok(t.mode)
    } else if t.mode == b.mode {
        Ok(o.mode)
    } else {
        Err(())
    };

    let our_content = read_blob(store, path, &o.oid)?;
    let their_content = read_blob(store, path, &t.oid)?;

    let Ok(mode) = mode else {
        result.conflicts.push(MergeConflict {
            path: path.clone(),
            kind: ConflictKind::ModeChange,
            our_range: LineRange::default(),
            their_range: LineRange::default(),
            our_content: BString::from(format!("{:o}", o.mode.raw())),
            their_content: BString::from(format!("{:o}", t.mode.raw())),
        });
        // Keep our version of the file alongside the mode conflict.
        result.files.insert(
            path.clone(),
            MergedFile {
                content: our_content,
                mode: o.mode,
                has_conflicts: true,
            },
        );
        return Ok(());
    };

    if o.oid == b.oid && t.oid == b.oid {
        result.files.insert(
            path.clone(),
            MergedFile {
                content: our_content,
                mode,
                has_conflicts: false,
            },
        );
        return Ok(());
    }

    let base_content = read_blob(store, path, &b.oid)?;
    match merge_content(&base_content, &our_content, &their_content, theirs_label) {
        ContentMergeResult::Clean(content) => {
            result.files.insert(
                path.clone(),
                MergedFile {
                    content,
                    mode,
                    has_conflicts: false,
                },
            );
        }
        ContentMergeResult::Conflict { content, conflicts } => {
            for mut conflict in conflicts {
                conflict.path = path.clone();
                result.conflicts.push(conflict);
            }
            result.files.insert(
                path.clone(),
                MergedFile {
                    content,
                    mode,
                    has_conflicts: true,
                },
            );
        }
    }

    Ok(())
}

fn record_conflicted_file(
    result: &mut TreeMergeResult,
    path: &BString,
    kind: ConflictKind,
    our_content: &[u8],
    their_content: &[u8],
    file_content: Vec<u8>,
    mode: FileMode,
) {
    result.conflicts.push(MergeConflict {
        path: path.clone(),
        kind,
        our_range: whole_file_range(our_content),
        their_range: whole_file_range(their_content),
        our_content: BString::from(our_content),
        their_content: BString::from(their_content),
    });
    result.files.insert(
        path.clone(),
        MergedFile {
            content: file_content,
            mode,
            has_conflicts: true,
        },
    );
}

fn whole_file_range(content: &[u8]) -> LineRange {
    let lines = svcs_diff::algorithm::split_lines(content).len() as u32;
    if lines == 0 {
        LineRange::default()
    } else {
        LineRange::new(1, lines)
    }
}

fn read_blob(store: &ObjectStore, path: &BString, oid: &ObjectId) -> Result<Vec<u8>, MergeError> {
    match store.read(oid)? {
        Object::Blob(blob) => Ok(blob.data.into()),
        other => Err(MergeError::NotABlob {
            path: path.clone(),
            actual: other.object_type().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcs_object::Blob;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: ObjectStore,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        Fixture {
            store: ObjectStore::open(dir.path().join("objects")),
            _dir: dir,
        }
    }

    fn blob(store: &ObjectStore, data: &[u8]) -> FileEntry {
        FileEntry {
            oid: store.write(&Object::Blob(Blob::new(data.to_vec()))).unwrap(),
            mode: FileMode::Regular,
        }
    }

    fn map(entries: Vec<(&str, FileEntry)>) -> BTreeMap<BString, FileEntry> {
        entries
            .into_iter()
            .map(|(p, e)| (BString::from(p), e))
            .collect()
    }

    #[test]
    fn clean_merge_of_disjoint_edits() {
        let fx = fixture();
        let base = blob(&fx.store, b"a\nb\nc\n");
        let ours = blob(&fx.store, b"A\nb\nc\n");
        let theirs = blob(&fx.store, b"a\nb\nC\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![("f.txt", base)]),
            &map(vec![("f.txt", ours)]),
            &map(vec![("f.txt", theirs)]),
            "x",
        )
        .unwrap();

        assert!(result.is_clean());
        assert_eq!(result.files[&BString::from("f.txt")].content, b"A\nb\nC\n");
    }

    #[test]
    fn content_conflict_propagates_with_path() {
        let fx = fixture();
        let base = blob(&fx.store, b"a\nb\nc\n");
        let ours = blob(&fx.store, b"a\nB1\nc\n");
        let theirs = blob(&fx.store, b"a\nB2\nc\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![("f.txt", base)]),
            &map(vec![("f.txt", ours)]),
            &map(vec![("f.txt", theirs)]),
            "x",
        )
        .unwrap();

        assert_eq!(result.conflicts.len(), 1);
        let conflict = &result.conflicts[0];
        assert_eq!(conflict.path, "f.txt");
        assert_eq!(conflict.kind, ConflictKind::Content);

        let merged = &result.files[&BString::from("f.txt")];
        assert!(merged.has_conflicts);
        let text = String::from_utf8_lossy(&merged.content);
        assert!(text.contains("<<<<<<< HEAD"));
        assert!(text.contains(">>>>>>> x"));
    }

    #[test]
    fn add_add_same_content_is_clean() {
        let fx = fixture();
        let added = blob(&fx.store, b"same\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![]),
            &map(vec![("new.txt", added)]),
            &map(vec![("new.txt", added)]),
            "x",
        )
        .unwrap();

        assert!(result.is_clean());
        assert_eq!(result.files[&BString::from("new.txt")].content, b"same\n");
    }

    #[test]
    fn add_add_different_content_conflicts() {
        let fx = fixture();
        let ours = blob(&fx.store, b"ours\n");
        let theirs = blob(&fx.store, b"theirs\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![]),
            &map(vec![("new.txt", ours)]),
            &map(vec![("new.txt", theirs)]),
            "x",
        )
        .unwrap();

        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].kind, ConflictKind::AddAdd);
        assert_eq!(result.conflicts[0].our_content, "ours\n");
        assert_eq!(result.conflicts[0].their_content, "theirs\n");
    }

    #[test]
    fn modify_delete_conflicts() {
        let fx = fixture();
        let base = blob(&fx.store, b"original\n");
        let modified = blob(&fx.store, b"modified\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![("f.txt", base)]),
            &map(vec![("f.txt", modified)]),
            &map(vec![]),
            "x",
        )
        .unwrap();

        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].kind, ConflictKind::ModifyDelete);
        // Our modified version survives in the working set.
        assert_eq!(result.files[&BString::from("f.txt")].content, b"modified\n");
    }

    #[test]
    fn delete_modify_conflicts() {
        let fx = fixture();
        let base = blob(&fx.store, b"original\n");
        let modified = blob(&fx.store, b"modified\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![("f.txt", base)]),
            &map(vec![]),
            &map(vec![("f.txt", modified)]),
            "x",
        )
        .unwrap();

        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].kind, ConflictKind::DeleteModify);
        assert!(result.conflicts[0].our_range.is_empty());
    }

    #[test]
    fn clean_delete_wins_when_other_side_unchanged() {
        let fx = fixture();
        let base = blob(&fx.store, b"original\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![("f.txt", base)]),
            &map(vec![("f.txt", base)]),
            &map(vec![]),
            "x",
        )
        .unwrap();

        assert!(result.is_clean());
        assert!(!result.files.contains_key(&BString::from("f.txt")));
    }

    #[test]
    fn one_side_add_is_accepted() {
        let fx = fixture();
        let added = blob(&fx.store, b"new\n");

        let result = merge_trees(
            &fx.store,
            &map(vec![]),
            &map(vec![]),
            &map(vec![("theirs.txt", added)]),
            "x",
        )
        .unwrap();

        assert!(result.is_clean());
        assert!(result.files.contains_key(&BString::from("theirs.txt")));
    }

    #[test]
    fn mode_change_both_sides_conflicts() {
        let fx = fixture();
        let oid = fx
            .store
            .write(&Object::Blob(Blob::new(b"#!/bin/sh\n".to_vec())))
            .unwrap();
        let base = FileEntry {
            oid,
            mode: FileMode::Regular,
        };
        let ours = FileEntry {
            oid,
            mode: FileMode::Executable,
        };
        // Their side flips to a different mode class entirely.
        let theirs = FileEntry {
            oid,
            mode: FileMode::Tree,
        };

        let result = merge_trees(
            &fx.store,
            &map(vec![("run.sh", base)]),
            &map(vec![("run.sh", ours)]),
            &map(vec![("run.sh", theirs)]),
            "x",
        )
        .unwrap();

        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].kind, ConflictKind::ModeChange);
    }

    #[test]
    fn one_side_mode_change_is_accepted() {
        let fx = fixture();
        let oid = fx
            .store
            .write(&Object::Blob(Blob::new(b"#!/bin/sh\n".to_vec())))
            .unwrap();
        let base = FileEntry {
            oid,
            mode: FileMode::Regular,
        };
        let ours = FileEntry {
            oid,
            mode: FileMode::Executable,
        };

        let result = merge_trees(
            &fx.store,
            &map(vec![("run.sh", base)]),
            &map(vec![("run.sh", ours)]),
            &map(vec![("run.sh", base)]),
            "x",
        )
        .unwrap();

        assert!(result.is_clean());
        assert_eq!(
            result.files[&BString::from("run.sh")].mode,
            FileMode::Executable
        );
    }
}
