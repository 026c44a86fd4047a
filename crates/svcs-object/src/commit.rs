use bstr::{BStr, BString, ByteSlice};
use svcs_hash::ObjectId;
use svcs_utils::date::Signature;

use crate::ObjectError;

/// A commit object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Id of the snapshot tree.
    pub tree: ObjectId,
    /// Parent commit ids: empty for a root commit, one for a regular
    /// commit, two or more for a merge.
    pub parents: Vec<ObjectId>,
    /// Author identity and timestamp.
    pub author: Signature,
    /// Committer identity and timestamp.
    pub committer: Signature,
    /// Reserved signature field. Preserved for round-trip; never computed
    /// or verified.
    pub signature: Option<BString>,
    /// Commit message (everything after the blank line separator).
    pub message: BString,
}

impl Commit {
    /// Parse commit payload from raw bytes (no object header).
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let mut tree: Option<ObjectId> = None;
        let mut parents = Vec::new();
        let mut author: Option<Signature> = None;
        let mut committer: Option<Signature> = None;
        let mut signature: Option<BString> = None;

        let data = payload;
        let mut pos = 0;

        // Headers are lines before the first blank line.
        while pos < data.len() {
            if data[pos] == b'\n' {
                pos += 1;
                break;
            }

            let line_end = data[pos..]
                .iter()
                .position(|&b| b == b'\n')
                .map(|p| p + pos)
                .unwrap_or(data.len());
            let line = &data[pos..line_end];

            let space_pos = line
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| ObjectError::InvalidHeader("malformed commit header line".into()))?;
            let key = &line[..space_pos];
            let value = &line[space_pos + 1..];

            match key {
                b"tree" => {
                    let hex = std::str::from_utf8(value)
                        .map_err(|_| ObjectError::InvalidHeader("non-UTF8 tree id".into()))?;
                    tree = Some(ObjectId::from_hex(hex)?);
                }
                b"parent" => {
                    let hex = std::str::from_utf8(value)
                        .map_err(|_| ObjectError::InvalidHeader("non-UTF8 parent id".into()))?;
                    parents.push(ObjectId::from_hex(hex)?);
                }
                b"author" => {
                    author = Some(parse_signature(value)?);
                }
                b"committer" => {
                    committer = Some(parse_signature(value)?);
                }
                b"signature" => {
                    // Multi-line: continuation lines start with a space.
                    let mut sig = Vec::from(value);
                    let mut next = line_end + 1;
                    while next < data.len() && data[next] == b' ' {
                        sig.push(b'\n');
                        let cont_end = data[next..]
                            .iter()
                            .position(|&b| b == b'\n')
                            .map(|p| p + next)
                            .unwrap_or(data.len());
                        sig.extend_from_slice(&data[next + 1..cont_end]);
                        next = cont_end + 1;
                    }
                    signature = Some(BString::from(sig));
                    pos = next;
                    continue;
                }
                other => {
                    return Err(ObjectError::InvalidHeader(format!(
                        "unknown commit header: {}",
                        BStr::new(other)
                    )));
                }
            }

            pos = line_end + 1;
        }

        let tree = tree.ok_or(ObjectError::MissingCommitField { field: "tree" })?;
        let author = author.ok_or(ObjectError::MissingCommitField { field: "author" })?;
        let committer = committer.ok_or(ObjectError::MissingCommitField { field: "committer" })?;

        let message = BString::from(&data[pos.min(data.len())..]);

        Ok(Self {
            tree,
            parents,
            author,
            committer,
            signature,
            message,
        })
    }

    /// Serialize commit payload to bytes (no object header).
    pub fn serialize_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"tree ");
        out.extend_from_slice(self.tree.to_hex().as_bytes());
        out.push(b'\n');

        for parent in &self.parents {
            out.extend_from_slice(b"parent ");
            out.extend_from_slice(parent.to_hex().as_bytes());
            out.push(b'\n');
        }

        out.extend_from_slice(b"author ");
        out.extend_from_slice(&self.author.to_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"committer ");
        out.extend_from_slice(&self.committer.to_bytes());
        out.push(b'\n');

        if let Some(ref sig) = self.signature {
            out.extend_from_slice(b"signature ");
            for (i, line) in sig.split(|&b| b == b'\n').enumerate() {
                if i > 0 {
                    out.push(b'\n');
                    out.push(b' ');
                }
                out.extend_from_slice(line);
            }
            out.push(b'\n');
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        out
    }

    /// Get the first parent (None for root commits).
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Is this a merge commit? (more than one parent)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// Is this a root commit? (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Get just the summary (first line) of the message.
    pub fn summary(&self) -> &BStr {
        let msg: &[u8] = self.message.as_ref();
        match msg.find_byte(b'\n') {
            Some(pos) => BStr::new(&msg[..pos]),
            None => BStr::new(msg),
        }
    }
}

fn parse_signature(data: &[u8]) -> Result<Signature, ObjectError> {
    Signature::parse(BStr::new(data)).map_err(|e| ObjectError::InvalidSignature(e.to_string()))
}
