//! Alignment keys.
//!
//! A key decides whether two blocks align as equal. It is never used to
//! decide what gets rendered.

use crate::model::{Block, Table};
use std::fmt::Write;

/// Comparison key of a block.
///
/// The variant is the type tag, so keys of different block types never
/// compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BlockKey {
    /// Exact paragraph text (style ignored)
    Paragraph(String),
    /// Length-prefixed encoding of sheet name and cells
    Table(String),
    /// Content hash, or relationship ID when no hash is known
    Image(String),
    /// Type tag of an unrecognized block
    Unknown(String),
}

/// Compute the alignment key of a block.
pub fn block_key(block: &Block) -> BlockKey {
    match block {
        Block::Paragraph(p) => BlockKey::Paragraph(p.text.clone()),
        Block::Table(t) => BlockKey::Table(encode_table(t)),
        Block::Image(i) => BlockKey::Image(i.identifier().to_string()),
        Block::Unknown { tag } => BlockKey::Unknown(tag.clone()),
    }
}

/// Encode a table so that distinct row/cell structures never share an
/// encoding, whatever the cell text contains.
///
/// Every string is written as `<byte length>:<bytes>`, every row as
/// `<cell count>[<cells>]`.
fn encode_table(table: &Table) -> String {
    let mut key = String::new();
    match &table.sheet {
        Some(sheet) => push_field(&mut key, sheet),
        None => key.push('-'),
    }
    let _ = write!(key, "|{}|", table.rows.len());
    for row in &table.rows {
        let _ = write!(key, "{}[", row.len());
        for cell in row {
            push_field(&mut key, cell);
        }
        key.push(']');
    }
    key
}

fn push_field(key: &mut String, value: &str) {
    let _ = write!(key, "{}:{}", value.len(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Image, Paragraph, TextStyle};

    #[test]
    fn test_paragraph_key_ignores_style() {
        let plain = Block::paragraph("Hello");
        let bold = Block::Paragraph(Paragraph::with_text("Hello").styled(TextStyle::bold()));
        assert_eq!(block_key(&plain), block_key(&bold));
        assert_ne!(block_key(&plain), block_key(&Block::paragraph("Hello!")));
    }

    #[test]
    fn test_table_key_respects_cell_boundaries() {
        // Same concatenated text, different structure.
        let a = Block::table(vec![vec!["a,b", "c"]]);
        let b = Block::table(vec![vec!["a", "b,c"]]);
        let c = Block::table(vec![vec!["a|b"], vec!["c"]]);
        let d = Block::table(vec![vec!["a"], vec!["b", "c"]]);
        assert_ne!(block_key(&a), block_key(&b));
        assert_ne!(block_key(&c), block_key(&d));
        assert_ne!(block_key(&a), block_key(&c));
    }

    #[test]
    fn test_table_key_includes_sheet() {
        let t = Table::from_rows(vec![vec!["1"]]);
        let s1 = Block::Table(t.clone().with_sheet("Q1"));
        let s2 = Block::Table(t.clone().with_sheet("Q2"));
        assert_ne!(block_key(&s1), block_key(&s2));
        assert_ne!(block_key(&s1), block_key(&Block::Table(t)));
    }

    #[test]
    fn test_image_key_falls_back_to_rel_id() {
        let a = Block::Image(Image::with_rel_id("rId3").with_size(10));
        let b = Block::Image(Image::with_rel_id("rId3").with_size(99));
        assert_eq!(block_key(&a), block_key(&b));
        assert_ne!(block_key(&Block::image("abc")), block_key(&Block::image("def")));
    }

    #[test]
    fn test_unknown_blocks_compare_by_tag() {
        assert_eq!(
            block_key(&Block::unknown("weird")),
            block_key(&Block::unknown("weird"))
        );
        assert_ne!(
            block_key(&Block::unknown("weird")),
            block_key(&Block::unknown("chart"))
        );
    }

    #[test]
    fn test_keys_never_cross_types() {
        assert_ne!(
            block_key(&Block::paragraph("abc")),
            block_key(&Block::image("abc"))
        );
    }
}
