//! Image references.

/// An image embedded in a document.
///
/// Images compare by identifier, never by pixel content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    /// Content hash (SHA-1 hex for word-processor images)
    pub hash: Option<String>,

    /// Relationship ID inside the source package
    pub rel_id: Option<String>,

    /// Size of the image data in bytes
    pub size: Option<u64>,

    /// Part name or original filename
    pub filename: Option<String>,
}

impl Image {
    /// Create an image identified by content hash.
    pub fn with_hash(hash: impl Into<String>) -> Self {
        Self {
            hash: Some(hash.into()),
            ..Default::default()
        }
    }

    /// Create an image identified only by relationship ID.
    pub fn with_rel_id(rel_id: impl Into<String>) -> Self {
        Self {
            rel_id: Some(rel_id.into()),
            ..Default::default()
        }
    }

    /// Set size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Set filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Identifier used for comparison: the hash, else the relationship ID.
    ///
    /// An empty hash counts as no hash.
    pub fn identifier(&self) -> &str {
        self.hash
            .as_deref()
            .filter(|h| !h.is_empty())
            .or(self.rel_id.as_deref())
            .unwrap_or_default()
    }

    /// Identifier shortened to `len` characters for display.
    pub fn short_identifier(&self, len: usize) -> String {
        let id = self.identifier();
        match id.char_indices().nth(len) {
            Some((end, _)) => format!("{}...", &id[..end]),
            None => id.to_string(),
        }
    }
}
