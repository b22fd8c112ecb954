//! Document model types shared by extractors, the diff engine and renderers.
//!
//! A document is an ordered `Vec<Block>`. The diff engine turns two such
//! sequences into [`ChangeRecord`]s.

mod block;
mod change;
mod image;
mod paragraph;
mod table;

pub use block::{Block, IMAGE_TAG, PARAGRAPH_TAG, TABLE_TAG};
pub use change::{
    CellDiff, ChangeKind, ChangeRecord, InlineDiff, InlineSpan, SpanTag, SubDiff, TableDiff,
};
pub use image::Image;
pub use paragraph::{Paragraph, TextStyle};
pub use table::Table;
