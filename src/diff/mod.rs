//! Structural diff engine.
//!
//! Blocks are aligned by [`key::block_key`]; paired blocks inside a replace
//! run are handed to a [`SubDiffer`] for a nested diff.
//!
//! # Example
//!
//! ```
//! use docdelta::diff::compare_blocks;
//! use docdelta::model::{Block, ChangeKind};
//!
//! let old = vec![Block::paragraph("Hello")];
//! let new = vec![Block::paragraph("Hello world")];
//! let records = compare_blocks(&old, &new);
//! assert_eq!(records[0].kind(), ChangeKind::Changed);
//! ```

mod align;
mod inline;
pub mod key;
mod table;

pub use align::{align, opcodes, Opcode};
pub use inline::{
    inline_diff, inline_diff_until, quick_ratio, similarity_ratio, similarity_ratio_until,
};
pub use key::{block_key, BlockKey};
pub use table::{cell_diff, table_diff};

use crate::error::{Error, Result};
use crate::model::{Block, ChangeRecord, SubDiff, Table};
use std::time::{Duration, Instant};

/// Default upper bound on characters per side of an inline diff.
pub const DEFAULT_MAX_INLINE_CHARS: usize = 50_000;

/// Default time budget of one character-level diff.
pub const DEFAULT_DIFF_TIMEOUT: Duration = Duration::from_secs(2);

/// Options for comparing block sequences.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Largest text (in characters, per side) that gets an inline diff.
    /// Larger pairs are reported as changed without detail, and their
    /// similarity is estimated in linear time.
    pub max_inline_chars: usize,

    /// Time budget of one character-level diff. Past it the diff is still
    /// complete but no longer minimal. `None` waits for the exact result.
    pub timeout: Option<Duration>,
}

impl CompareOptions {
    /// Create new compare options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inline diff size limit.
    pub fn with_max_inline_chars(mut self, max: usize) -> Self {
        self.max_inline_chars = max;
        self
    }

    /// Set the time budget of one character-level diff.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Deadline for a diff starting now.
    pub fn deadline(&self) -> Option<Instant> {
        self.timeout.map(|t| Instant::now() + t)
    }

    /// Check if a text is too long for a character-level diff.
    pub fn exceeds_limit(&self, text: &str) -> bool {
        text.chars().count() > self.max_inline_chars
    }

    /// Similarity of two texts within the size and time limits.
    pub fn similarity(&self, old: &str, new: &str) -> f64 {
        if self.exceeds_limit(old) || self.exceeds_limit(new) {
            return quick_ratio(old, new);
        }
        similarity_ratio_until(old, new, self.deadline())
    }

    /// Similarity of a changed pair.
    ///
    /// Reuses the inline diff of a paragraph pair when there is one, so the
    /// text is not diffed twice.
    pub fn pair_similarity(&self, old: &Block, new: &Block, detail: Option<&SubDiff>) -> f64 {
        match (old, new, detail) {
            (Block::Paragraph(_), Block::Paragraph(_), Some(SubDiff::Inline(diff))) => {
                diff.similarity()
            }
            _ => self.similarity(&old.plain_text(), &new.plain_text()),
        }
    }
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            max_inline_chars: DEFAULT_MAX_INLINE_CHARS,
            timeout: Some(DEFAULT_DIFF_TIMEOUT),
        }
    }
}

/// Computes the nested diff of a changed pair.
///
/// Returning `Ok(None)` means the pair has no meaningful nested diff.
/// Errors are recovered by the aligner: the pair is still reported as
/// changed, without detail.
pub trait SubDiffer: Send + Sync {
    /// Diff one old/new pair.
    fn diff_pair(&self, old: &Block, new: &Block) -> Result<Option<SubDiff>>;
}

/// Default differ: inline diff for paragraphs, cell diff for tables.
#[derive(Debug, Clone, Default)]
pub struct StructuralDiffer {
    options: CompareOptions,
}

impl StructuralDiffer {
    /// Create a differ with the given options.
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    fn check_size(&self, text: &str) -> Result<()> {
        if self.options.exceeds_limit(text) {
            return Err(Error::SubDiff(format!(
                "text of {} characters exceeds inline diff limit of {}",
                text.chars().count(),
                self.options.max_inline_chars
            )));
        }
        Ok(())
    }

    fn check_table(&self, table: &Table) -> Result<()> {
        table
            .rows
            .iter()
            .flatten()
            .try_for_each(|cell| self.check_size(cell))
    }
}

impl SubDiffer for StructuralDiffer {
    fn diff_pair(&self, old: &Block, new: &Block) -> Result<Option<SubDiff>> {
        match (old, new) {
            (Block::Paragraph(a), Block::Paragraph(b)) => {
                self.check_size(&a.text)?;
                self.check_size(&b.text)?;
                let deadline = self.options.deadline();
                Ok(Some(SubDiff::Inline(inline_diff_until(&a.text, &b.text, deadline))))
            }
            (Block::Table(a), Block::Table(b)) => {
                self.check_table(a)?;
                self.check_table(b)?;
                Ok(Some(SubDiff::Table(table_diff(a, b))))
            }
            _ => Ok(None),
        }
    }
}

/// Compare two block sequences with default options.
pub fn compare_blocks(old: &[Block], new: &[Block]) -> Vec<ChangeRecord> {
    align(old, new, &StructuralDiffer::default())
}

/// Compare two block sequences with custom options.
pub fn compare_blocks_with_options(
    old: &[Block],
    new: &[Block],
    options: &CompareOptions,
) -> Vec<ChangeRecord> {
    align(old, new, &StructuralDiffer::new(options.clone()))
}
