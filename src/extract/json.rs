//! Extractor for pre-extracted block lists in JSON.

use super::{ExtractOptions, Extractor};
use crate::error::{Error, Result};
use crate::model::Block;
use std::path::Path;

/// Reads a JSON array of blocks in the interchange form
/// (`{"type": "paragraph", "text": "..."}` and so on).
///
/// This lets other tools feed their own extraction output into the diff.
#[derive(Debug, Clone, Default)]
pub struct JsonBlockExtractor;

impl JsonBlockExtractor {
    /// Create a new JSON block extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for JsonBlockExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "json"
    }

    fn extract_bytes(
        &self,
        bytes: &[u8],
        source: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<Block>> {
        let blocks: Vec<Block> =
            serde_json::from_slice(bytes).map_err(|e| Error::parse(source, e.to_string()))?;

        let unknown = blocks.iter().filter(|b| b.is_unknown()).count();
        if unknown > 0 {
            log::warn!(
                "{} blocks of unrecognized type in {}",
                unknown,
                source.display()
            );
        }

        Ok(blocks.into_iter().map(|b| normalize(b, options)).collect())
    }
}

fn normalize(block: Block, options: &ExtractOptions) -> Block {
    match block {
        Block::Paragraph(mut p) => {
            p.text = options.normalize(&p.text);
            Block::Paragraph(p)
        }
        Block::Table(mut t) => {
            for cell in t.rows.iter_mut().flatten() {
                *cell = options.normalize(cell);
            }
            Block::Table(t)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Image;

    fn extract(json: &str) -> Result<Vec<Block>> {
        JsonBlockExtractor::new().extract_bytes(
            json.as_bytes(),
            Path::new("blocks.json"),
            &ExtractOptions::default(),
        )
    }

    #[test]
    fn test_interchange_form() {
        let blocks = extract(
            r#"[
                {"type": "paragraph", "text": "Hello", "bold": true},
                {"type": "table", "table": [["A", "B"], ["C"]], "sheet": "Sheet1"},
                {"type": "image", "sha1": "abc", "rel_id": "rId4", "size": 2048},
                {"type": "chart"}
            ]"#,
        )
        .unwrap();

        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].plain_text(), "Hello");
        match &blocks[1] {
            Block::Table(t) => assert_eq!(t.sheet.as_deref(), Some("Sheet1")),
            other => panic!("expected table, got {:?}", other),
        }
        assert_eq!(
            blocks[2],
            Block::Image(Image {
                hash: Some("abc".into()),
                rel_id: Some("rId4".into()),
                size: Some(2048),
                filename: None,
            })
        );
        assert_eq!(blocks[3], Block::unknown("chart"));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = extract(r#"{"type": "paragraph"}"#).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().starts_with("Parse error in blocks.json"));

        assert!(matches!(extract("[{"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_text_is_normalized() {
        let blocks = extract(r#"[{"type": "paragraph", "text": "Cafe\u0301"}]"#).unwrap();
        assert_eq!(blocks[0].plain_text(), "Caf\u{e9}");
    }
}
