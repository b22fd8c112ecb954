//! Block extraction with a registry of per-format extractors.
//!
//! Each extractor turns one file format into an ordered block sequence.
//! Extractors are registered by file extension and dispatched by the
//! registry.
//!
//! # Example
//!
//! ```no_run
//! use docdelta::extract::{ExtractOptions, ExtractorRegistry};
//! use std::path::Path;
//!
//! fn main() -> docdelta::Result<()> {
//!     let registry = ExtractorRegistry::with_defaults();
//!     let (old, new) = registry.extract_pair(
//!         Path::new("v1.txt"),
//!         Path::new("v2.txt"),
//!         &ExtractOptions::default(),
//!     )?;
//!     println!("{} / {} blocks", old.len(), new.len());
//!     Ok(())
//! }
//! ```

mod docx;
mod json;
mod package;
mod text;
mod tsv;
mod xlsx;

pub use docx::DocxExtractor;
pub use json::JsonBlockExtractor;
pub use text::TextExtractor;
pub use tsv::TsvExtractor;
pub use xlsx::XlsxExtractor;

use crate::error::{Error, Result};
use crate::model::Block;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use unicode_normalization::UnicodeNormalization;

/// Options for block extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Apply Unicode NFC normalization to extracted text
    pub normalize_unicode: bool,

    /// Keep blank lines as empty paragraphs (text input)
    pub keep_blank_lines: bool,
}

impl ExtractOptions {
    /// Create new extraction options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable NFC normalization.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize_unicode = normalize;
        self
    }

    /// Keep or drop blank lines.
    pub fn with_blank_lines(mut self, keep: bool) -> Self {
        self.keep_blank_lines = keep;
        self
    }

    /// Apply the configured text normalization.
    pub fn normalize(&self, text: &str) -> String {
        if self.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            normalize_unicode: true,
            keep_blank_lines: false,
        }
    }
}

/// Trait for block extractors.
///
/// Implement this trait to add support for a new document format.
pub trait Extractor: Send + Sync {
    /// Get the supported file extensions for this extractor.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["txt"]`).
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this extractor.
    fn name(&self) -> &str;

    /// Extract blocks from file content. `source` names the input in errors
    /// and may be used for metadata such as a sheet name.
    fn extract_bytes(&self, bytes: &[u8], source: &Path, options: &ExtractOptions)
        -> Result<Vec<Block>>;

    /// Extract blocks from a file.
    fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<Vec<Block>> {
        let bytes = read_source(path)?;
        self.extract_bytes(&bytes, path, options)
    }

    /// Check if this extractor supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Registry for block extractors.
///
/// The registry maps file extensions to extractors.
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn Extractor>>,
    by_name: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the built-in extractors (DOCX, XLSX, text,
    /// TSV, JSON blocks).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxExtractor::new()));
        registry.register(Arc::new(XlsxExtractor::new()));
        registry.register(Arc::new(TextExtractor::new()));
        registry.register(Arc::new(TsvExtractor::new()));
        registry.register(Arc::new(JsonBlockExtractor::new()));
        registry
    }

    /// Register an extractor for all its supported extensions.
    pub fn register(&mut self, extractor: Arc<dyn Extractor>) {
        for ext in extractor.supported_extensions() {
            self.extractors.insert(ext.to_lowercase(), extractor.clone());
        }
        self.by_name.insert(extractor.name().to_lowercase(), extractor);
    }

    /// Get an extractor by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&ext.to_lowercase()).cloned()
    }

    /// Get an extractor by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Extractor>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.extractors.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.extractors.keys().map(|s| s.as_str()).collect();
        exts.sort_unstable();
        exts
    }

    /// Extract blocks from a file using the extractor for its extension.
    pub fn extract(&self, path: &Path, options: &ExtractOptions) -> Result<Vec<Block>> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("{} has no extension", path.display()))
            })?;

        let extractor = self
            .get_by_extension(ext)
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("no extractor for extension: {}", ext))
            })?;

        let blocks = extractor.extract(path, options)?;
        let counts = BlockCounts::of(&blocks);
        log::info!(
            "Extracted {} blocks from {} ({}): {} paragraphs, {} tables, {} images",
            blocks.len(),
            path.display(),
            extractor.name(),
            counts.paragraphs,
            counts.tables,
            counts.images
        );
        Ok(blocks)
    }

    /// Extract the old and new documents in parallel.
    ///
    /// When both fail, the old document's error is returned.
    pub fn extract_pair(
        &self,
        old: &Path,
        new: &Path,
        options: &ExtractOptions,
    ) -> Result<(Vec<Block>, Vec<Block>)> {
        let (old_blocks, new_blocks) =
            rayon::join(|| self.extract(old, options), || self.extract(new, options));
        Ok((old_blocks?, new_blocks?))
    }
}

/// Per-type block counts of an extracted document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockCounts {
    pub paragraphs: usize,
    pub tables: usize,
    pub images: usize,
    pub unknown: usize,
}

impl BlockCounts {
    /// Count the blocks of each type.
    pub fn of(blocks: &[Block]) -> Self {
        let mut counts = Self::default();
        for block in blocks {
            if block.is_paragraph() {
                counts.paragraphs += 1;
            } else if block.is_table() {
                counts.tables += 1;
            } else if block.is_image() {
                counts.images += 1;
            } else {
                counts.unknown += 1;
            }
        }
        counts
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
