//! Plain text extractor.

use super::{ExtractOptions, Extractor};
use crate::error::Result;
use crate::model::Block;
use std::path::Path;

/// Extracts one paragraph per non-empty line.
///
/// Lines are trimmed; invalid UTF-8 is replaced rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Create a new text extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for TextExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", "text", "md"]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn extract_bytes(
        &self,
        bytes: &[u8],
        _source: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<Block>> {
        let content = String::from_utf8_lossy(bytes);
        let text = content.strip_prefix('\u{feff}').unwrap_or(&content[..]);

        let blocks = text
            .lines()
            .map(str::trim)
            .filter(|line| options.keep_blank_lines || !line.is_empty())
            .map(|line| Block::paragraph(options.normalize(line)))
            .collect();
        Ok(blocks)
    }
}
