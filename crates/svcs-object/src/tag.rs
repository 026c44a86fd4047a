use bstr::{BStr, BString};
use svcs_hash::ObjectId;
use svcs_utils::date::Signature;

use crate::{ObjectError, ObjectType};

/// An annotated tag object.
///
/// The ref layout reserves `refs/tags/`; annotated tag objects use this
/// payload grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Id of the tagged object.
    pub target: ObjectId,
    /// Type of the tagged object.
    pub target_type: ObjectType,
    /// Tag name.
    pub name: BString,
    /// Tagger identity (optional in old tags).
    pub tagger: Option<Signature>,
    /// Tag message.
    pub message: BString,
}

impl Tag {
    /// Parse tag payload from raw bytes (no object header).
    pub fn parse(payload: &[u8]) -> Result<Self, ObjectError> {
        let mut target: Option<ObjectId> = None;
        let mut target_type: Option<ObjectType> = None;
        let mut name: Option<BString> = None;
        let mut tagger: Option<Signature> = None;

        let data = payload;
        let mut pos = 0;

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
                .ok_or_else(|| ObjectError::InvalidHeader("malformed tag header line".into()))?;
            let key = &line[..space_pos];
            let value = &line[space_pos + 1..];

            match key {
                b"object" => {
                    let hex = std::str::from_utf8(value)
                        .map_err(|_| ObjectError::InvalidHeader("non-UTF8 object id".into()))?;
                    target = Some(ObjectId::from_hex(hex)?);
                }
                b"type" => {
                    target_type = Some(ObjectType::from_bytes(value)?);
                }
                b"tag" => {
                    name = Some(BString::from(value));
                }
                b"tagger" => {
                    tagger = Some(
                        Signature::parse(BStr::new(value))
                            .map_err(|e| ObjectError::InvalidSignature(e.to_string()))?,
                    );
                }
                other => {
                    return Err(ObjectError::InvalidHeader(format!(
                        "unknown tag header: {}",
                        BStr::new(other)
                    )));
                }
            }

            pos = line_end + 1;
        }

        let target = target.ok_or(ObjectError::MissingTagField { field: "object" })?;
        let target_type = target_type.ok_or(ObjectError::MissingTagField { field: "type" })?;
        let name = name.ok_or(ObjectError::MissingTagField { field: "tag" })?;

        Ok(Self {
            target,
            target_type,
            name,
            tagger,
            message: BString::from(&data[pos.min(data.len())..]),
        })
    }

    /// Serialize tag payload to bytes (no object header).
    pub fn serialize_payload(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(b"object ");
        out.extend_from_slice(self.target.to_hex().as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"type ");
        out.extend_from_slice(self.target_type.as_bytes());
        out.push(b'\n');

        out.extend_from_slice(b"tag ");
        out.extend_from_slice(&self.name);
        out.push(b'\n');

        if let Some(ref tagger) = self.tagger {
            out.extend_from_slice(b"tagger ");
            out.extend_from_slice(&tagger.to_bytes());
            out.push(b'\n');
        }

        out.push(b'\n');
        out.extend_from_slice(&self.message);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svcs_hash::Hasher;

    fn sample_tag_bytes() -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(format!("object {}\n", Hasher::digest(b"commit").to_hex()).as_bytes());
        out.extend_from_slice(b"type commit\n");
        out.extend_from_slice(b"tag v1.0\n");
        out.extend_from_slice(b"tagger A <a@b.com> 1000000000 +0000\n");
        out.extend_from_slice(b"\nrelease\n");
        out
    }

    #[test]
    fn parse_tag() {
        let tag = Tag::parse(&sample_tag_bytes()).unwrap();
        assert_eq!(tag.target_type, ObjectType::Commit);
        assert_eq!(tag.name, "v1.0");
        assert_eq!(tag.tagger.as_ref().unwrap().name, "A");
        assert_eq!(tag.message, "release\n");
    }

    #[test]
    fn serialize_roundtrip() {
        let original = sample_tag_bytes();
        let tag = Tag::parse(&original).unwrap();
        assert_eq!(tag.serialize_payload(), original);
    }

    #[test]
    fn missing_object_errors() {
        assert!(matches!(
            Tag::parse(b"type commit\ntag v1\n\nmsg\n"),
            Err(ObjectError::MissingTagField { field: "object" })
        ));
    }
}
