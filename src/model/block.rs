//! Content blocks.

use super::{Image, Paragraph, Table, TextStyle};
use serde::{Deserialize, Serialize};

/// Type tag of paragraph blocks.
pub const PARAGRAPH_TAG: &str = "paragraph";
/// Type tag of table blocks.
pub const TABLE_TAG: &str = "table";
/// Type tag of image blocks.
pub const IMAGE_TAG: &str = "image";

/// One unit of document content, in document order.
///
/// Serialized in the flat interchange form used by extractors:
/// `{"type": "paragraph", "text": "..."}`, `{"type": "table", "table": [[...]]}`,
/// `{"type": "image", "sha1": "..."}`. Any other `type` becomes [`Block::Unknown`].
/// An unknown block whose tag collides with a known type is written with
/// `"unknown": true` so it reads back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BlockRepr", into = "BlockRepr")]
pub enum Block {
    /// A paragraph of text
    Paragraph(Paragraph),

    /// A table
    Table(Table),

    /// An image reference
    Image(Image),

    /// A block type this crate does not interpret
    Unknown {
        /// Type tag from the producer
        tag: String,
    },
}

impl Block {
    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Block::Paragraph(Paragraph::with_text(text))
    }

    /// Create a table block from rows of values.
    pub fn table<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Block::Table(Table::from_rows(rows))
    }

    /// Create an image block identified by content hash.
    pub fn image(hash: impl Into<String>) -> Self {
        Block::Image(Image::with_hash(hash))
    }

    /// Create a block of an unrecognized type.
    pub fn unknown(tag: impl Into<String>) -> Self {
        Block::Unknown { tag: tag.into() }
    }

    /// Get the type tag ("paragraph", "table", "image", or the unknown tag).
    pub fn type_tag(&self) -> &str {
        match self {
            Block::Paragraph(_) => PARAGRAPH_TAG,
            Block::Table(_) => TABLE_TAG,
            Block::Image(_) => IMAGE_TAG,
            Block::Unknown { tag } => tag,
        }
    }

    /// Text used for similarity scoring and annotation.
    ///
    /// Images and unknown blocks have no text.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph(p) => p.text.clone(),
            Block::Table(t) => t.plain_text(),
            Block::Image(_) | Block::Unknown { .. } => String::new(),
        }
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Block::Paragraph(_))
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, Block::Table(_))
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image(_))
    }

    /// Check if a tag names a type this crate interprets.
    pub fn is_known_tag(tag: &str) -> bool {
        matches!(tag, PARAGRAPH_TAG | TABLE_TAG | IMAGE_TAG)
    }

    /// Check if this block has an unrecognized type.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Block::Unknown { .. })
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}

impl From<Image> for Block {
    fn from(i: Image) -> Self {
        Block::Image(i)
    }
}

/// Flat interchange form of a block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BlockRepr {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default, skip_serializing_if = "is_false")]
    unknown: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(flatten)]
    style: TextStyle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    table: Option<Vec<Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    sheet: Option<String>,

    #[serde(alias = "hash", default, skip_serializing_if = "Option::is_none")]
    sha1: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    rel_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    filename: Option<String>,
}

impl From<BlockRepr> for Block {
    fn from(repr: BlockRepr) -> Self {
        if repr.unknown {
            return Block::Unknown { tag: repr.kind };
        }
        match repr.kind.as_str() {
            PARAGRAPH_TAG => Block::Paragraph(Paragraph {
                text: repr.text.unwrap_or_default(),
                style: repr.style,
            }),
            TABLE_TAG => Block::Table(Table {
                rows: repr.table.unwrap_or_default(),
                sheet: repr.sheet,
            }),
            IMAGE_TAG => Block::Image(Image {
                hash: repr.sha1,
                rel_id: repr.rel_id,
                size: repr.size,
                filename: repr.filename,
            }),
            _ => Block::Unknown { tag: repr.kind },
        }
    }
}

impl From<Block> for BlockRepr {
    fn from(block: Block) -> Self {
        match block {
            Block::Paragraph(p) => BlockRepr {
                kind: PARAGRAPH_TAG.to_string(),
                text: Some(p.text),
                style: p.style,
                ..Default::default()
            },
            Block::Table(t) => BlockRepr {
                kind: TABLE_TAG.to_string(),
                table: Some(t.rows),
                sheet: t.sheet,
                ..Default::default()
            },
            Block::Image(i) => BlockRepr {
                kind: IMAGE_TAG.to_string(),
                sha1: i.hash,
                rel_id: i.rel_id,
                size: i.size,
                filename: i.filename,
                ..Default::default()
            },
            Block::Unknown { tag } => BlockRepr {
                unknown: Block::is_known_tag(&tag),
                kind: tag,
                ..Default::default()
            },
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
