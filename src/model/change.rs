//! Change records produced by the diff engine.

use super::Block;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of one aligned position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Block present only in the new document
    Added,
    /// Block present only in the old document
    Deleted,
    /// Block paired with a different counterpart
    Changed,
    /// Block identical (by key) in both documents
    Unchanged,
}

impl ChangeKind {
    /// All kinds, in report order.
    pub const ALL: [ChangeKind; 4] = [
        ChangeKind::Added,
        ChangeKind::Deleted,
        ChangeKind::Changed,
        ChangeKind::Unchanged,
    ];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Changed => "changed",
            ChangeKind::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output unit of the diff engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum ChangeRecord {
    /// Block aligned with an identical counterpart; holds the old block.
    Unchanged {
        /// The old block
        block: Block,
    },

    /// Old and new block paired inside a replace run.
    Changed {
        /// Block from the old document
        old: Block,
        /// Block from the new document
        new: Block,
        /// Nested diff, when one could be computed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<SubDiff>,
    },

    /// Block present only in the new document.
    Added {
        /// The new block
        block: Block,
    },

    /// Block present only in the old document.
    Deleted {
        /// The old block
        block: Block,
    },
}

impl ChangeRecord {
    /// Get the change kind.
    pub fn kind(&self) -> ChangeKind {
        match self {
            ChangeRecord::Unchanged { .. } => ChangeKind::Unchanged,
            ChangeRecord::Changed { .. } => ChangeKind::Changed,
            ChangeRecord::Added { .. } => ChangeKind::Added,
            ChangeRecord::Deleted { .. } => ChangeKind::Deleted,
        }
    }

    /// Block on the old side, if any.
    pub fn old_block(&self) -> Option<&Block> {
        match self {
            ChangeRecord::Unchanged { block } | ChangeRecord::Deleted { block } => Some(block),
            ChangeRecord::Changed { old, .. } => Some(old),
            ChangeRecord::Added { .. } => None,
        }
    }

    /// Block on the new side, if any.
    ///
    /// For unchanged records this is the old block, which is key-equal to
    /// its new counterpart.
    pub fn new_block(&self) -> Option<&Block> {
        match self {
            ChangeRecord::Unchanged { block } | ChangeRecord::Added { block } => Some(block),
            ChangeRecord::Changed { new, .. } => Some(new),
            ChangeRecord::Deleted { .. } => None,
        }
    }

    /// Block that represents this record (the new block of a changed pair).
    pub fn primary_block(&self) -> &Block {
        match self {
            ChangeRecord::Unchanged { block }
            | ChangeRecord::Added { block }
            | ChangeRecord::Deleted { block } => block,
            ChangeRecord::Changed { new, .. } => new,
        }
    }

    /// Type tag of the represented block.
    pub fn block_type(&self) -> &str {
        self.primary_block().type_tag()
    }

    /// Nested diff of a changed pair.
    pub fn detail(&self) -> Option<&SubDiff> {
        match self {
            ChangeRecord::Changed { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }

    /// Check if this record reports a difference.
    pub fn is_change(&self) -> bool {
        self.kind() != ChangeKind::Unchanged
    }
}

/// Nested diff of a changed pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubDiff {
    /// Character-level diff of two paragraphs
    Inline(InlineDiff),
    /// Cell-level diff of two tables
    Table(TableDiff),
}

/// Role of a span in an inline diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanTag {
    /// Text present on both sides
    Equal,
    /// Text present only in the old string
    Deleted,
    /// Text present only in the new string
    Inserted,
}

/// A run of text in an inline diff. Text is stored raw, never escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSpan {
    /// Role of the run
    pub tag: SpanTag,
    /// Run text
    pub text: String,
}

impl InlineSpan {
    /// Create a span.
    pub fn new(tag: SpanTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
        }
    }
}

/// Character-level diff of two strings as a sequence of tagged spans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineDiff {
    /// Spans in reading order
    pub spans: Vec<InlineSpan>,
}

impl InlineDiff {
    /// Reconstruct the old string (equal and deleted spans).
    pub fn old_text(&self) -> String {
        self.side_text(SpanTag::Deleted)
    }

    /// Reconstruct the new string (equal and inserted spans).
    pub fn new_text(&self) -> String {
        self.side_text(SpanTag::Inserted)
    }

    /// Check if the diff contains no deletion or insertion.
    pub fn is_unchanged(&self) -> bool {
        self.spans.iter().all(|s| s.tag == SpanTag::Equal)
    }

    fn side_text(&self, own: SpanTag) -> String {
        self.spans
            .iter()
            .filter(|s| s.tag == SpanTag::Equal || s.tag == own)
            .map(|s| s.text.as_str())
            .collect()
    }
}

/// Comparison of one table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellDiff {
    /// Identical cell text
    Same {
        /// Cell text
        text: String,
    },
    /// Differing cell text (a missing cell counts as "")
    Changed {
        /// Old cell text
        old: String,
        /// New cell text
        new: String,
        /// Inline diff of the two texts
        inline: InlineDiff,
    },
}

impl CellDiff {
    /// Check if the cell differs.
    pub fn is_changed(&self) -> bool {
        matches!(self, CellDiff::Changed { .. })
    }
}

/// Cell-level diff of two tables, one row per row of the longer table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableDiff {
    /// Rows of cell diffs
    pub rows: Vec<Vec<CellDiff>>,
}

impl TableDiff {
    /// Number of changed cells.
    pub fn changed_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_changed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sides() {
        let rec = ChangeRecord::Changed {
            old: Block::paragraph("a"),
            new: Block::image("abc"),
            detail: None,
        };
        assert_eq!(rec.kind(), ChangeKind::Changed);
        assert_eq!(rec.old_block(), Some(&Block::paragraph("a")));
        assert_eq!(rec.block_type(), "image");
        assert!(rec.is_change());

        let rec = ChangeRecord::Added {
            block: Block::paragraph("x"),
        };
        assert!(rec.old_block().is_none());
        assert_eq!(rec.new_block(), Some(&Block::paragraph("x")));
    }

    #[test]
    fn test_inline_sides() {
        let diff = InlineDiff {
            spans: vec![
                InlineSpan::new(SpanTag::Equal, "ca"),
                InlineSpan::new(SpanTag::Deleted, "t"),
                InlineSpan::new(SpanTag::Inserted, "r"),
            ],
        };
        assert_eq!(diff.old_text(), "cat");
        assert_eq!(diff.new_text(), "car");
        assert!(!diff.is_unchanged());
    }

    #[test]
    fn test_record_json_shape() {
        let rec = ChangeRecord::Unchanged {
            block: Block::paragraph("Hello"),
        };
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(
            json,
            r#"{"change":"unchanged","block":{"type":"paragraph","text":"Hello"}}"#
        );

        let cell = CellDiff::Same { text: "A".into() };
        assert_eq!(
            serde_json::to_string(&cell).unwrap(),
            r#"{"type":"same","text":"A"}"#
        );
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<_> = ChangeKind::ALL.iter().map(ChangeKind::as_str).collect();
        assert_eq!(names, ["added", "deleted", "changed", "unchanged"]);
    }
}
