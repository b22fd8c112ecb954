//! Report assembly.
//!
//! The assembler turns the aligner's change records into a [`Report`]:
//! one scored (and optionally annotated) entry per record, aggregate counts,
//! a ranked table of contents, and a summary.
//!
//! # Example
//!
//! ```
//! use docdelta::diff::compare_blocks;
//! use docdelta::model::Block;
//! use docdelta::report::ReportAssembler;
//!
//! let old = vec![Block::paragraph("Total: 10 kg")];
//! let new = vec![Block::paragraph("Total: 12 kg"), Block::image("abc")];
//! let report = ReportAssembler::new().assemble(compare_blocks(&old, &new));
//!
//! assert_eq!(report.entries.len(), 2);
//! assert_eq!(report.toc.len(), 2);
//! ```

mod summary;

pub use summary::Summary;

use crate::annotate::{Annotation, SemanticAnnotator};
use crate::diff::CompareOptions;
use crate::model::{ChangeKind, ChangeRecord};
use crate::score::{ScoreConfig, Scorer, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One change record with its score and optional annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Position in the change list (also the HTML anchor)
    pub index: usize,

    /// The aligned record
    pub change: ChangeRecord,

    /// Structural significance, 0 to 10
    pub score: f64,

    /// Semantic annotation (changed records only, when an annotator ran)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl ReportEntry {
    /// Change kind of the record.
    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }

    /// Block type of the record.
    pub fn block_type(&self) -> &str {
        self.change.block_type()
    }

    /// Severity tier of the structural score.
    pub fn severity(&self) -> Severity {
        Severity::from_score(self.score)
    }

    /// Key used to rank the table of contents.
    ///
    /// The semantic score when annotated, otherwise the structural score
    /// scaled by `fallback_factor`.
    pub fn rank_score(&self, fallback_factor: f64) -> f64 {
        match &self.annotation {
            Some(annotation) => annotation.semantic_score,
            None => self.score * fallback_factor,
        }
    }
}

/// Record counts per change kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    /// Added blocks
    pub added: usize,
    /// Deleted blocks
    pub deleted: usize,
    /// Changed pairs
    pub changed: usize,
    /// Unchanged blocks
    pub unchanged: usize,
}

impl KindCounts {
    /// Count one record of the given kind.
    pub fn increment(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Deleted => self.deleted += 1,
            ChangeKind::Changed => self.changed += 1,
            ChangeKind::Unchanged => self.unchanged += 1,
        }
    }

    /// Count of the given kind.
    pub fn get(&self, kind: ChangeKind) -> usize {
        match kind {
            ChangeKind::Added => self.added,
            ChangeKind::Deleted => self.deleted,
            ChangeKind::Changed => self.changed,
            ChangeKind::Unchanged => self.unchanged,
        }
    }

    /// Total records.
    pub fn total(&self) -> usize {
        self.added + self.deleted + self.changed + self.unchanged
    }
}

/// Aggregate counts of a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    /// Counts per change kind
    pub totals: KindCounts,

    /// Counts per block type and change kind
    pub by_type: BTreeMap<String, KindCounts>,
}

impl ReportStats {
    fn record(&mut self, entry: &ReportEntry) {
        let kind = entry.kind();
        self.totals.increment(kind);
        self.by_type
            .entry(entry.block_type().to_string())
            .or_default()
            .increment(kind);
    }
}

/// Run metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Display name of the old document
    pub old_source: String,

    /// Display name of the new document
    pub new_source: String,

    /// Version of the tool that produced the report
    pub tool_version: String,

    /// Time of generation; unset for reproducible output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// A complete comparison report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub metadata: ReportMetadata,

    /// Aggregate counts
    pub stats: ReportStats,

    /// Summary of the changes
    pub summary: Summary,

    /// Entry indices of all non-unchanged entries, most relevant first
    pub toc: Vec<usize>,

    /// All entries in document order
    pub entries: Vec<ReportEntry>,
}

impl Report {
    /// Number of aligned blocks.
    pub fn total_blocks(&self) -> usize {
        self.entries.len()
    }

    /// Check if the documents differ.
    pub fn has_changes(&self) -> bool {
        !self.toc.is_empty()
    }

    /// Entries in table-of-contents order.
    pub fn ranked(&self) -> impl Iterator<Item = &ReportEntry> {
        self.toc.iter().filter_map(|&i| self.entries.get(i))
    }
}

/// Builds reports from change records.
///
/// The annotator is borrowed for the assembler's lifetime; without one, the
/// table of contents is ranked on structural scores alone.
pub struct ReportAssembler<'a> {
    scorer: Scorer,
    annotator: Option<&'a dyn SemanticAnnotator>,
    compare_options: CompareOptions,
    metadata: ReportMetadata,
}

impl<'a> ReportAssembler<'a> {
    /// Create an assembler with the default scorer and no annotator.
    pub fn new() -> Self {
        Self {
            scorer: Scorer::default(),
            annotator: None,
            compare_options: CompareOptions::default(),
            metadata: ReportMetadata {
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                ..ReportMetadata::default()
            },
        }
    }

    /// Set the scoring configuration.
    pub fn with_score_config(mut self, config: ScoreConfig) -> Self {
        self.scorer = Scorer::new(config);
        self
    }

    /// Set the semantic annotator.
    pub fn with_annotator(mut self, annotator: &'a dyn SemanticAnnotator) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Set the limits used when measuring the similarity of changed pairs.
    pub fn with_compare_options(mut self, options: CompareOptions) -> Self {
        self.compare_options = options;
        self
    }

    /// Set the display names of the compared documents.
    pub fn with_sources(mut self, old: impl Into<String>, new: impl Into<String>) -> Self {
        self.metadata.old_source = old.into();
        self.metadata.new_source = new.into();
        self
    }

    /// Stamp the report with a generation time.
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.metadata.generated_at = Some(at);
        self
    }

    /// Assemble a report from records in document order.
    pub fn assemble(&self, records: Vec<ChangeRecord>) -> Report {
        let entries: Vec<ReportEntry> = records
            .into_iter()
            .enumerate()
            .map(|(index, change)| self.entry(index, change))
            .collect();

        let mut stats = ReportStats::default();
        for entry in &entries {
            stats.record(entry);
        }

        let toc = self.rank(&entries);
        let summary = Summary::from_entries(&entries);

        log::info!(
            "Assembled report: {} blocks, {} changes",
            entries.len(),
            toc.len()
        );

        Report {
            metadata: self.metadata.clone(),
            stats,
            summary,
            toc,
            entries,
        }
    }

    fn entry(&self, index: usize, change: ChangeRecord) -> ReportEntry {
        // measured once, shared by scorer and annotator
        let similarity = match &change {
            ChangeRecord::Changed { old, new, detail } => {
                Some(self.compare_options.pair_similarity(old, new, detail.as_ref()))
            }
            _ => None,
        };
        let score = self
            .scorer
            .score_with_similarity(&change, similarity.unwrap_or(1.0));
        let annotation = similarity.and_then(|s| self.annotate(index, &change, s));
        ReportEntry {
            index,
            change,
            score,
            annotation,
        }
    }

    fn annotate(
        &self,
        index: usize,
        change: &ChangeRecord,
        similarity: f64,
    ) -> Option<Annotation> {
        let annotator = self.annotator?;
        let ChangeRecord::Changed { old, new, .. } = change else {
            return None;
        };

        let (old_text, new_text) = (old.plain_text(), new.plain_text());
        match annotator.annotate_with_similarity(&old_text, &new_text, similarity) {
            Ok(annotation) => Some(annotation),
            Err(e) => {
                log::debug!(
                    "Annotator '{}' failed on entry {}: {}",
                    annotator.name(),
                    index,
                    e
                );
                None
            }
        }
    }

    fn rank(&self, entries: &[ReportEntry]) -> Vec<usize> {
        let factor = self.scorer.config().fallback_factor;
        let mut ranked: Vec<(usize, f64)> = entries
            .iter()
            .filter(|e| e.change.is_change())
            .map(|e| (e.index, e.rank_score(factor)))
            .collect();
        // sort_by is stable: equal keys keep document order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.into_iter().map(|(index, _)| index).collect()
    }
}

impl Default for ReportAssembler<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::{ChangeType, LexicalAnnotator};
    use crate::diff::compare_blocks;
    use crate::error::{Error, Result};
    use crate::model::Block;

    struct FixedAnnotator(f64);

    impl SemanticAnnotator for FixedAnnotator {
        fn name(&self) -> &str {
            "fixed"
        }

        fn annotate(&self, _old: &str, _new: &str) -> Result<Annotation> {
            Ok(Annotation::new(
                vec!["number".into()],
                self.0,
                ChangeType::Substantive,
                0.9,
            ))
        }
    }

    struct BrokenAnnotator;

    impl SemanticAnnotator for BrokenAnnotator {
        fn name(&self) -> &str {
            "broken"
        }

        fn annotate(&self, _old: &str, _new: &str) -> Result<Annotation> {
            Err(Error::Annotation("model unavailable".into()))
        }
    }

    /// Reports the similarity it was handed as its semantic score.
    struct EchoAnnotator;

    impl SemanticAnnotator for EchoAnnotator {
        fn name(&self) -> &str {
            "echo"
        }

        fn annotate(&self, _old: &str, _new: &str) -> Result<Annotation> {
            Err(Error::Annotation("needs similarity".into()))
        }

        fn annotate_with_similarity(
            &self,
            _old: &str,
            _new: &str,
            similarity: f64,
        ) -> Result<Annotation> {
            Ok(Annotation::new(
                Vec::new(),
                similarity * 10.0,
                ChangeType::Undefined,
                1.0,
            ))
        }
    }

    fn sample() -> Vec<ChangeRecord> {
        let old = vec![
            Block::paragraph("Intro"),
            Block::paragraph("Price 100"),
            Block::table(vec![vec!["A", "B"]]),
        ];
        let new = vec![
            Block::paragraph("Intro"),
            Block::paragraph("Price 120"),
            Block::table(vec![vec!["A", "C"]]),
            Block::image("abc"),
        ];
        compare_blocks(&old, &new)
    }

    #[test]
    fn test_counts() {
        let report = ReportAssembler::new().assemble(sample());
        assert_eq!(report.stats.totals.unchanged, 1);
        assert_eq!(report.stats.totals.changed, 2);
        assert_eq!(report.stats.totals.added, 1);
        assert_eq!(report.stats.totals.total(), report.total_blocks());

        let tables = report.stats.by_type["table"];
        assert_eq!(tables.get(ChangeKind::Changed), 1);
        let keys: Vec<_> = report.stats.by_type.keys().cloned().collect();
        assert_eq!(keys, ["image", "paragraph", "table"]);
    }

    #[test]
    fn test_similarity_is_shared_with_annotator() {
        let report = ReportAssembler::new()
            .with_annotator(&EchoAnnotator)
            .assemble(sample());
        let entry = &report.entries[1];
        let expected = crate::diff::similarity_ratio("Price 100", "Price 120");
        let seen = entry.annotation.as_ref().unwrap().semantic_score / 10.0;
        assert!((seen - expected).abs() < 1e-9);
        assert_eq!(
            entry.score,
            Scorer::default().score_with_similarity(&entry.change, expected)
        );
        assert!(report.entries[0].annotation.is_none());
    }

    #[test]
    fn test_toc_is_permutation_of_changes() {
        let report = ReportAssembler::new().assemble(sample());
        let mut toc = report.toc.clone();
        toc.sort_unstable();
        assert_eq!(toc, vec![1, 2, 3]);
        assert!(report.ranked().all(|e| e.change.is_change()));
    }

    #[test]
    fn test_structural_ranking_without_annotator() {
        let report = ReportAssembler::new().assemble(sample());
        let scores: Vec<f64> = report.ranked().map(|e| e.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(report.entries.iter().all(|e| e.annotation.is_none()));
    }

    #[test]
    fn test_ties_keep_document_order() {
        let records = vec![
            ChangeRecord::Added {
                block: Block::paragraph("a"),
            },
            ChangeRecord::Deleted {
                block: Block::paragraph("b"),
            },
            ChangeRecord::Added {
                block: Block::paragraph("c"),
            },
        ];
        let report = ReportAssembler::new().assemble(records);
        assert_eq!(report.toc, vec![0, 1, 2]);
    }

    #[test]
    fn test_annotated_entries_rank_by_semantic_score() {
        let annotator = FixedAnnotator(9.5);
        let report = ReportAssembler::new()
            .with_annotator(&annotator)
            .assemble(sample());

        // changed entries (1, 2) carry 9.5; the added image falls back to
        // its structural score scaled by 0.6
        assert_eq!(report.toc, vec![1, 2, 3]);
        assert!(report.entries[1].annotation.is_some());
        assert!(report.entries[3].annotation.is_none());
        assert!(report.entries[0].annotation.is_none());
    }

    #[test]
    fn test_annotator_failure_is_recovered() {
        let annotator = BrokenAnnotator;
        let report = ReportAssembler::new()
            .with_annotator(&annotator)
            .assemble(sample());
        assert_eq!(report.entries.len(), 4);
        assert!(report.entries.iter().all(|e| e.annotation.is_none()));
        assert_eq!(report.toc.len(), 3);
    }

    #[test]
    fn test_lexical_annotator_integration() {
        let annotator = LexicalAnnotator::new();
        let report = ReportAssembler::new()
            .with_annotator(&annotator)
            .with_sources("v1.txt", "v2.txt")
            .assemble(sample());
        let ann = report.entries[1].annotation.as_ref().unwrap();
        assert_eq!(ann.change_type, ChangeType::Substantive);
        assert_eq!(report.metadata.old_source, "v1.txt");
        assert!(report.metadata.generated_at.is_none());
    }

    #[test]
    fn test_empty_input() {
        let report = ReportAssembler::new().assemble(Vec::new());
        assert!(!report.has_changes());
        assert_eq!(report.total_blocks(), 0);
        assert!(report.stats.by_type.is_empty());
    }
}
