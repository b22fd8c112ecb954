//! Tab-separated values extractor.

use super::{ExtractOptions, Extractor};
use crate::error::Result;
use crate::model::{Block, Table};
use std::path::Path;

/// Extracts a whole TSV file as one table named after the file stem.
#[derive(Debug, Clone, Default)]
pub struct TsvExtractor;

impl TsvExtractor {
    /// Create a new TSV extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for TsvExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["tsv"]
    }

    fn name(&self) -> &str {
        "tsv"
    }

    fn extract_bytes(
        &self,
        bytes: &[u8],
        source: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<Block>> {
        let content = String::from_utf8_lossy(bytes);

        let mut rows: Vec<Vec<String>> = content
            .lines()
            .map(|line| line.split('\t').map(|cell| options.normalize(cell.trim())).collect())
            .collect();

        while rows
            .last()
            .is_some_and(|row| row.iter().all(String::is_empty))
        {
            rows.pop();
        }

        if rows.iter().flatten().all(String::is_empty) {
            log::warn!("Skipping empty table in {}", source.display());
            return Ok(Vec::new());
        }

        let mut table = Table::from_rows(rows);
        if let Some(stem) = source.file_stem().and_then(|s| s.to_str()) {
            table = table.with_sheet(stem);
        }
        Ok(vec![Block::Table(table)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(bytes: &[u8]) -> Vec<Block> {
        TsvExtractor::new()
            .extract_bytes(bytes, Path::new("data/prices.tsv"), &ExtractOptions::default())
            .unwrap()
    }

    #[test]
    fn test_single_table() {
        let blocks = extract(b"item\tprice\napple\t3\npear\n\n");
        assert_eq!(blocks.len(), 1);
        match &blocks[0] {
            Block::Table(t) => {
                assert_eq!(t.sheet.as_deref(), Some("prices"));
                assert_eq!(t.row_count(), 3);
                assert_eq!(t.rows[2], vec!["pear"]);
                assert_eq!(t.cell(1, 1), Some("3"));
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_yields_nothing() {
        assert!(extract(b"").is_empty());
        assert!(extract(b"\t\n\t\t\n").is_empty());
    }
}
