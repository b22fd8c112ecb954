//! # docdelta
//!
//! Structural comparison of documents into ranked, navigable change reports.
//!
//! Two versions of a document are extracted into ordered sequences of typed
//! blocks (paragraphs, tables, images), aligned into a minimal edit script,
//! diffed inside paired blocks (characters in text, cells in tables), scored
//! for significance and assembled into a report rendered as interactive HTML
//! or JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docdelta::{render, DocDelta, HtmlOptions};
//!
//! fn main() -> docdelta::Result<()> {
//!     let report = DocDelta::new().compare_files("contract_v1.txt", "contract_v2.txt")?;
//!     render::write_html(&report, &HtmlOptions::default(), "report.html")?;
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Block alignment**: Myers diff over block keys, with paired blocks in
//!   replace runs reported as changes
//! - **Nested diffs**: character-level for text, cell-level for tables
//! - **Scoring and ranking**: structural scores, optional semantic annotation
//! - **Reports**: self-contained interactive HTML, lossless JSON
//! - **Parallel extraction**: both documents are read with Rayon

pub mod annotate;
pub mod diff;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod report;
pub mod score;

// Re-export commonly used types
pub use annotate::{Annotation, ChangeType, LexicalAnnotator, SemanticAnnotator};
pub use diff::{compare_blocks, CompareOptions, StructuralDiffer, SubDiffer};
pub use error::{Error, Result};
pub use extract::{ExtractOptions, Extractor, ExtractorRegistry};
pub use model::{Block, ChangeKind, ChangeRecord, Image, Paragraph, SubDiff, Table, TextStyle};
pub use render::{HtmlOptions, JsonFormat, Theme};
pub use report::{Report, ReportAssembler, ReportEntry, Summary};
pub use score::{ScoreConfig, Scorer, Severity};

use chrono::Utc;
use std::path::Path;
use std::sync::Arc;

/// Compare two document files with default settings.
///
/// # Example
///
/// ```no_run
/// use docdelta::compare_files;
///
/// let report = compare_files("old.txt", "new.txt").unwrap();
/// println!("{} changes", report.toc.len());
/// ```
pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(old: P, new: Q) -> Result<Report> {
    DocDelta::new().compare_files(old, new)
}

/// Builder for the extract, compare and assemble pipeline.
///
/// # Example
///
/// ```no_run
/// use docdelta::{CompareOptions, DocDelta, ScoreConfig};
///
/// let report = DocDelta::new()
///     .with_compare_options(CompareOptions::new().with_max_inline_chars(10_000))
///     .with_score_config(ScoreConfig::new().with_fallback_factor(0.5))
///     .without_annotator()
///     .compare_files("old.json", "new.json")?;
/// # Ok::<(), docdelta::Error>(())
/// ```
pub struct DocDelta {
    registry: ExtractorRegistry,
    extract_options: ExtractOptions,
    compare_options: CompareOptions,
    score_config: ScoreConfig,
    annotator: Option<Arc<dyn SemanticAnnotator>>,
    timestamp: bool,
}

impl DocDelta {
    /// Create a builder with the default extractors and the lexical annotator.
    pub fn new() -> Self {
        Self {
            registry: ExtractorRegistry::with_defaults(),
            extract_options: ExtractOptions::default(),
            compare_options: CompareOptions::default(),
            score_config: ScoreConfig::default(),
            annotator: Some(Arc::new(LexicalAnnotator::new())),
            timestamp: false,
        }
    }

    /// Use a custom extractor registry.
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Set comparison options.
    pub fn with_compare_options(mut self, options: CompareOptions) -> Self {
        self.compare_options = options;
        self
    }

    /// Set scoring configuration.
    pub fn with_score_config(mut self, config: ScoreConfig) -> Self {
        self.score_config = config;
        self
    }

    /// Use a custom semantic annotator.
    pub fn with_annotator(mut self, annotator: Arc<dyn SemanticAnnotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Rank on structural scores only.
    pub fn without_annotator(mut self) -> Self {
        self.annotator = None;
        self
    }

    /// Stamp reports with the generation time.
    pub fn with_timestamp(mut self, stamp: bool) -> Self {
        self.timestamp = stamp;
        self
    }

    /// Extract both files and compare them.
    pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(&self, old: P, new: Q) -> Result<Report> {
        let (old, new) = (old.as_ref(), new.as_ref());
        let (old_blocks, new_blocks) = self.registry.extract_pair(old, new, &self.extract_options)?;

        Ok(self.compare(
            &old_blocks,
            &new_blocks,
            &display_name(old),
            &display_name(new),
        ))
    }

    /// Compare two block sequences.
    pub fn compare(&self, old: &[Block], new: &[Block], old_name: &str, new_name: &str) -> Report {
        let records = diff::compare_blocks_with_options(old, new, &self.compare_options);
        log::info!(
            "Aligned {} old and {} new blocks into {} records",
            old.len(),
            new.len(),
            records.len()
        );

        let mut assembler = ReportAssembler::new()
            .with_score_config(self.score_config.clone())
            .with_compare_options(self.compare_options.clone())
            .with_sources(old_name, new_name);
        if let Some(annotator) = self.annotator.as_deref() {
            assembler = assembler.with_annotator(annotator);
        }
        if self.timestamp {
            assembler = assembler.with_timestamp(Utc::now());
        }
        assembler.assemble(records)
    }
}

impl Default for DocDelta {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = DocDelta::default();
        assert!(builder.annotator.is_some());
        assert!(!builder.timestamp);
        assert_eq!(
            builder.compare_options.max_inline_chars,
            diff::DEFAULT_MAX_INLINE_CHARS
        );
    }

    #[test]
    fn test_builder_chained() {
        let builder = DocDelta::new()
            .without_annotator()
            .with_timestamp(true)
            .with_score_config(ScoreConfig::new().with_change_weight(3.0))
            .with_extract_options(ExtractOptions::new().with_blank_lines(true));

        assert!(builder.annotator.is_none());
        assert!(builder.timestamp);
        assert_eq!(builder.score_config.change_weight, 3.0);
        assert!(builder.extract_options.keep_blank_lines);
    }

    #[test]
    fn test_compare_blocks_end_to_end() {
        let old = vec![Block::paragraph("Price: 100 EUR"), Block::paragraph("Terms")];
        let new = vec![Block::paragraph("Price: 120 EUR"), Block::paragraph("Terms")];
        let report = DocDelta::new().compare(&old, &new, "a", "b");

        assert_eq!(report.stats.totals.changed, 1);
        assert_eq!(report.stats.totals.unchanged, 1);
        assert_eq!(report.toc, vec![0]);
        let annotation = report.entries[0].annotation.as_ref().unwrap();
        assert_eq!(annotation.change_type, ChangeType::Substantive);
        assert_eq!(report.metadata.tool_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_timestamp_is_opt_in() {
        let with = DocDelta::new().with_timestamp(true).compare(&[], &[], "a", "b");
        assert!(with.metadata.generated_at.is_some());
        let without = DocDelta::new().compare(&[], &[], "a", "b");
        assert!(without.metadata.generated_at.is_none());
    }

    #[test]
    fn test_compare_files_missing() {
        let result = compare_files("/nonexistent/a.txt", "/nonexistent/b.txt");
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/dir/v1.txt")), "v1.txt");
    }
}
