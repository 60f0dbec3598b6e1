//! Decoded container values

/// A named byte buffer inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// What the data is (`SRAM_<game>`, `FREEZE_<game>_0`, ...)
    pub id: String,
    pub content: Vec<u8>,
}

impl Blob {
    pub fn new(id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Result of decoding a byte buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    /// `None` when the input was not a container at all
    pub console_id: Option<String>,
    /// Blobs in encode order
    pub blobs: Vec<Blob>,
    /// Decoding stopped early on an incomplete blob record
    pub truncated: bool,
}

impl Container {
    /// Empty result for input that is not in this format
    pub fn unrecognized() -> Self {
        Self::default()
    }

    /// Whether the input carried the container magic
    pub fn is_recognized(&self) -> bool {
        self.console_id.is_some()
    }

    /// First blob with the given ID
    pub fn blob(&self, id: &str) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn into_blobs(self) -> Vec<Blob> {
        self.blobs
    }
}
