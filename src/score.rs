//! Structural significance scoring.
//!
//! Every change gets a score in `[0, 10]` from lexical and structural
//! heuristics alone. Semantic scores from an annotator are kept separate and
//! only blended when ranking the table of contents.

use crate::diff::CompareOptions;
use crate::model::{ChangeRecord, IMAGE_TAG, TABLE_TAG};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Highest possible score.
pub const MAX_SCORE: f64 = 10.0;

/// Tunable scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Base score of added and deleted blocks
    pub presence_base: f64,

    /// Multiplier of `1 - similarity` for changed pairs
    pub change_weight: f64,

    /// Bonus when the changed text contains a digit
    pub digit_bonus: f64,

    /// Bonus when the changed text contains a unit or currency
    pub unit_bonus: f64,

    /// Bonus when the changed text contains a year (19xx, 20xx)
    pub year_bonus: f64,

    /// Bonus for image and table blocks
    pub structural_bonus: f64,

    /// Factor applied to the structural score of changes without a semantic
    /// score when ranking the table of contents. Kept below 1.
    pub fallback_factor: f64,
}

impl ScoreConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the changed-pair weight.
    pub fn with_change_weight(mut self, weight: f64) -> Self {
        self.change_weight = weight;
        self
    }

    /// Set the base of added/deleted blocks.
    pub fn with_presence_base(mut self, base: f64) -> Self {
        self.presence_base = base;
        self
    }

    /// Set the ranking fallback factor (clamped to `[0, 1)`).
    pub fn with_fallback_factor(mut self, factor: f64) -> Self {
        self.fallback_factor = factor.clamp(0.0, 0.99);
        self
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            presence_base: 2.5,
            change_weight: 6.0,
            digit_bonus: 0.8,
            unit_bonus: 0.8,
            year_bonus: 0.6,
            structural_bonus: 2.0,
            fallback_factor: 0.6,
        }
    }
}

/// Review severity derived from a structural score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Score below 3
    Low,
    /// Score from 3 up to 6
    Medium,
    /// Score of 6 or more
    High,
}

impl Severity {
    /// Classify a score.
    pub fn from_score(score: f64) -> Self {
        if score < 3.0 {
            Severity::Low
        } else if score < 6.0 {
            Severity::Medium
        } else {
            Severity::High
        }
    }

    /// Short CSS class name.
    pub fn css_class(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "med",
            Severity::High => "high",
        }
    }
}

/// Structural scorer.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScoreConfig,
    digit_regex: Regex,
    unit_regex: Regex,
    year_regex: Regex,
}

impl Scorer {
    /// Create a scorer.
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            digit_regex: Regex::new(r"\d").unwrap(),
            unit_regex: Regex::new(r"(?i)\b(?:kg|m|mm|cm|km|pln|eur|usd|kw)\b|[%€$]").unwrap(),
            year_regex: Regex::new(r"\b(?:19|20)\d{2}\b").unwrap(),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    /// Score a change record, in `[0, 10]` rounded to two decimals.
    ///
    /// Similarity of changed pairs is computed under the default
    /// [`CompareOptions`] limits.
    pub fn score(&self, record: &ChangeRecord) -> f64 {
        let similarity = match record {
            ChangeRecord::Changed { old, new, detail } => {
                CompareOptions::default().pair_similarity(old, new, detail.as_ref())
            }
            _ => 1.0,
        };
        self.score_with_similarity(record, similarity)
    }

    /// Score a change record whose old/new similarity is already known.
    ///
    /// `similarity` is ignored for records that are not changed pairs.
    pub fn score_with_similarity(&self, record: &ChangeRecord, similarity: f64) -> f64 {
        let cfg = &self.config;
        let mut score = match record {
            ChangeRecord::Unchanged { .. } => return 0.0,
            ChangeRecord::Added { .. } | ChangeRecord::Deleted { .. } => cfg.presence_base,
            ChangeRecord::Changed { old, new, .. } => {
                let old_text = old.plain_text();
                let new_text = new.plain_text();
                (1.0 - similarity) * cfg.change_weight + self.lexical_bonus(&old_text, &new_text)
            }
        };

        let block_type = record.block_type();
        if block_type == IMAGE_TAG || block_type == TABLE_TAG {
            score += cfg.structural_bonus;
        }

        round2(score.clamp(0.0, MAX_SCORE))
    }

    fn lexical_bonus(&self, old_text: &str, new_text: &str) -> f64 {
        let combined = format!("{} {}", old_text, new_text);
        let mut bonus = 0.0;
        if self.digit_regex.is_match(&combined) {
            bonus += self.config.digit_bonus;
        }
        if self.unit_regex.is_match(&combined) {
            bonus += self.config.unit_bonus;
        }
        if self.year_regex.is_match(&combined) {
            bonus += self.config.year_bonus;
        }
        bonus
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoreConfig::default())
    }
}

/// Round to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
