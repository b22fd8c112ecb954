//! Short human-readable summary of a report.

use super::ReportEntry;
use crate::annotate::ChangeType;
use crate::model::ChangeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Summary of the changed pairs in a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of aligned blocks
    pub total_blocks: usize,

    /// Number of changed pairs
    pub changed: usize,

    /// Most frequent change type among annotated changed pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_type: Option<ChangeType>,

    /// Share of changed pairs with the dominant type, in percent (one decimal)
    pub dominant_percent: f64,

    /// Union of annotation labels, sorted
    pub labels: Vec<String>,

    /// Rendered sentence
    pub text: String,
}

impl Summary {
    /// Summarize report entries.
    pub fn from_entries(entries: &[ReportEntry]) -> Self {
        let changed: Vec<&ReportEntry> = entries
            .iter()
            .filter(|e| e.kind() == ChangeKind::Changed)
            .collect();

        let mut summary = Summary {
            total_blocks: entries.len(),
            changed: changed.len(),
            ..Summary::default()
        };

        if changed.iter().any(|e| e.annotation.is_some()) {
            // counts in first-seen order, so ties go to the earliest type
            let mut counts: Vec<(ChangeType, usize)> = Vec::new();
            for entry in &changed {
                let ty = entry
                    .annotation
                    .as_ref()
                    .map(|a| a.change_type)
                    .unwrap_or_default();
                match counts.iter_mut().find(|(t, _)| *t == ty) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((ty, 1)),
                }
            }

            let mut best = counts[0];
            for &(ty, n) in &counts[1..] {
                if n > best.1 {
                    best = (ty, n);
                }
            }
            summary.dominant_type = Some(best.0);
            summary.dominant_percent =
                (best.1 as f64 / changed.len() as f64 * 1000.0).round() / 10.0;
        }

        let labels: BTreeSet<&str> = changed
            .iter()
            .filter_map(|e| e.annotation.as_ref())
            .flat_map(|a| a.labels.iter().map(String::as_str))
            .collect();
        summary.labels = labels.into_iter().map(String::from).collect();

        summary.text = summary.to_string();
        summary
    }

    /// Check if the report has no changed pairs.
    pub fn is_empty(&self) -> bool {
        self.changed == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No significant changes detected in the document.");
        }

        write!(
            f,
            "The document contains {} changes (out of {} blocks)",
            self.changed, self.total_blocks
        )?;
        if let Some(ty) = self.dominant_type {
            write!(f, ", of which {:.1}% are of type {}", self.dominant_percent, ty)?;
        }
        let labels = if self.labels.is_empty() {
            "none".to_string()
        } else {
            self.labels.join(", ")
        };
        write!(f, ". Dominant labels: {}.", labels)
    }
}
