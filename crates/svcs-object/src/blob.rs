use bstr::BString;

/// A blob object — the opaque content of a tracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: BString,
}

impl Blob {
    /// Wrap raw file bytes.
    pub fn new(data: impl Into<BString>) -> Self {
        Self { data: data.into() }
    }

    /// Parse blob payload (the payload is the content, verbatim).
    pub fn parse(payload: &[u8]) -> Self {
        Self {
            data: BString::from(payload),
        }
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}
