//! Semantic annotation of changed blocks.
//!
//! An annotator is an optional capability handed to the report assembler by
//! reference. Reports are complete without one; with one, each changed pair
//! gets labels, a semantic score used for ranking, a change type, and a
//! confidence.

mod lexical;

pub use lexical::LexicalAnnotator;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of edit, as judged by an annotator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Data, amounts, dates or meaning changed
    Substantive,
    /// Wording or style only
    Editorial,
    /// Sentence structure changed
    Formal,
    /// References to articles, clauses, paragraphs
    Technical,
    /// Not classified
    #[default]
    Undefined,
}

impl ChangeType {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Substantive => "substantive",
            ChangeType::Editorial => "editorial",
            ChangeType::Formal => "formal",
            ChangeType::Technical => "technical",
            ChangeType::Undefined => "undefined",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic annotation of one changed pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Content categories found in the text (sorted, unique)
    pub labels: Vec<String>,

    /// Semantic distance, 0 (same meaning) to 10 (unrelated)
    pub semantic_score: f64,

    /// Kind of edit
    pub change_type: ChangeType,

    /// Confidence of the classification, 0 to 1
    pub confidence: f64,
}

impl Annotation {
    /// Create an annotation, clamping scores to their ranges.
    pub fn new(
        labels: Vec<String>,
        semantic_score: f64,
        change_type: ChangeType,
        confidence: f64,
    ) -> Self {
        let mut labels = labels;
        labels.sort();
        labels.dedup();
        Self {
            labels,
            semantic_score: semantic_score.clamp(0.0, 10.0),
            change_type,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Produces semantic annotations for changed text.
pub trait SemanticAnnotator: Send + Sync {
    /// Name of this annotator.
    fn name(&self) -> &str;

    /// Annotate the change from `old_text` to `new_text`.
    fn annotate(&self, old_text: &str, new_text: &str) -> Result<Annotation>;

    /// Annotate a change whose character similarity is already known.
    ///
    /// The report assembler calls this with the similarity it computed for
    /// scoring. The default ignores it.
    fn annotate_with_similarity(
        &self,
        old_text: &str,
        new_text: &str,
        similarity: f64,
    ) -> Result<Annotation> {
        let _ = similarity;
        self.annotate(old_text, new_text)
    }
}
