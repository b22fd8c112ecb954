//! Pattern-based annotator.

use super::{Annotation, ChangeType, SemanticAnnotator};
use crate::diff::CompareOptions;
use crate::error::Result;
use crate::score::round2;
use regex::Regex;

/// Similarity at which the annotator is most confident in its classification.
const CONFIDENCE_PIVOT: f64 = 0.85;

/// Similarity above which a change counts as editorial.
const EDITORIAL_RATIO: f64 = 0.9;

/// References to legal provisions (section sign, article, clause, item,
/// journal of laws, position).
const LEGAL_PATTERN: &str = r"(?i)§|\b(?:art|ust|pkt|poz)\.|\bdz\.\s?u\.";

/// Annotator built on lexical patterns and character similarity.
///
/// Needs no language model; labels come from regular expressions over the
/// combined old and new text.
#[derive(Debug, Clone)]
pub struct LexicalAnnotator {
    labelers: Vec<(&'static str, Regex)>,
    legal_regex: Regex,
}

impl LexicalAnnotator {
    /// Create an annotator with the built-in patterns.
    pub fn new() -> Self {
        let labelers = vec![
            ("amount", Regex::new(r"(?i)\b(?:pln|eur|usd|gbp|zł)\b|[€$£]").unwrap()),
            (
                "date",
                Regex::new(r"\b(?:19|20)\d{2}\b|\b\d{1,2}[./-]\d{1,2}[./-]\d{2,4}\b").unwrap(),
            ),
            ("legal_reference", Regex::new(LEGAL_PATTERN).unwrap()),
            ("number", Regex::new(r"\d+(?:[.,]\d+)?").unwrap()),
            ("percent", Regex::new(r"%").unwrap()),
            ("unit", Regex::new(r"(?i)\b(?:kg|m|mm|cm|km|kw)\b|%").unwrap()),
        ];
        Self {
            labelers,
            legal_regex: Regex::new(LEGAL_PATTERN).unwrap(),
        }
    }

    /// Labels found in a text, sorted.
    pub fn labels(&self, text: &str) -> Vec<String> {
        self.labelers
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(label, _)| label.to_string())
            .collect()
    }

    /// Classify the kind of edit.
    pub fn classify(
        &self,
        old_text: &str,
        new_text: &str,
        labels: &[String],
        ratio: f64,
    ) -> ChangeType {
        let substantive = ["number", "amount", "date", "unit"];
        if labels.iter().any(|l| substantive.contains(&l.as_str())) {
            return ChangeType::Substantive;
        }
        if self.legal_regex.is_match(old_text) || self.legal_regex.is_match(new_text) {
            return ChangeType::Technical;
        }
        if ratio > EDITORIAL_RATIO {
            return ChangeType::Editorial;
        }
        if old_text.split_whitespace().count() != new_text.split_whitespace().count() {
            return ChangeType::Formal;
        }
        ChangeType::Substantive
    }
}

impl Default for LexicalAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnnotator for LexicalAnnotator {
    fn name(&self) -> &str {
        "lexical"
    }

    fn annotate(&self, old_text: &str, new_text: &str) -> Result<Annotation> {
        let ratio = CompareOptions::default().similarity(old_text, new_text);
        self.annotate_with_similarity(old_text, new_text, ratio)
    }

    fn annotate_with_similarity(
        &self,
        old_text: &str,
        new_text: &str,
        ratio: f64,
    ) -> Result<Annotation> {
        let combined = format!("{} {}", old_text, new_text);
        let labels = self.labels(&combined);
        let change_type = self.classify(old_text, new_text, &labels, ratio);
        let semantic_score = round2((1.0 - ratio) * 10.0);
        let confidence = round2(1.0 - (CONFIDENCE_PIVOT - ratio).abs());

        Ok(Annotation::new(labels, semantic_score, change_type, confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let ann = LexicalAnnotator::new();
        assert_eq!(
            ann.labels("Pay 100 EUR by 2024"),
            vec!["amount", "date", "number"]
        );
        assert_eq!(ann.labels("rate 5%"), vec!["number", "percent", "unit"]);
        assert_eq!(ann.labels("see § 4"), vec!["legal_reference", "number"]);
        assert!(ann.labels("plain words").is_empty());
    }

    #[test]
    fn test_substantive_when_numbers_change() {
        let ann = LexicalAnnotator::new();
        let a = ann.annotate("Pay 100 EUR", "Pay 200 EUR").unwrap();
        assert_eq!(a.change_type, ChangeType::Substantive);
        assert!(a.labels.contains(&"amount".to_string()));
    }

    #[test]
    fn test_technical_reference() {
        let ann = LexicalAnnotator::new();
        let a = ann.annotate("See § of the act", "See § of the statute").unwrap();
        assert_eq!(a.change_type, ChangeType::Technical);
    }

    #[test]
    fn test_editorial_when_nearly_identical() {
        let ann = LexicalAnnotator::new();
        let a = ann
            .annotate(
                "The parties shall sign the agreement promptly.",
                "The parties shall sign this agreement promptly.",
            )
            .unwrap();
        assert_eq!(a.change_type, ChangeType::Editorial);
        assert!(a.semantic_score < 1.0);
    }

    #[test]
    fn test_formal_when_word_count_differs() {
        let ann = LexicalAnnotator::new();
        let a = ann
            .annotate("Sign it now.", "Please sign the document now today.")
            .unwrap();
        assert_eq!(a.change_type, ChangeType::Formal);
    }

    #[test]
    fn test_scores_in_range() {
        let ann = LexicalAnnotator::new();
        let a = ann.annotate("", "completely new").unwrap();
        assert_eq!(a.semantic_score, 10.0);
        assert!((0.0..=1.0).contains(&a.confidence));

        let same = ann.annotate("same", "same").unwrap();
        assert_eq!(same.semantic_score, 0.0);
        assert_eq!(same.confidence, 0.85);
    }

    #[test]
    fn test_given_similarity_drives_scores() {
        let ann = LexicalAnnotator::new();
        let a = ann.annotate_with_similarity("some words", "other words", 0.85).unwrap();
        assert_eq!(a.semantic_score, 1.5);
        assert_eq!(a.confidence, 1.0);

        let same = ann.annotate("some words", "other words").unwrap();
        let ratio = crate::diff::similarity_ratio("some words", "other words");
        let given = ann
            .annotate_with_similarity("some words", "other words", ratio)
            .unwrap();
        assert_eq!(same, given);
    }
}
