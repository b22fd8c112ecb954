//! Rendering of comparison reports to HTML and JSON.

mod html;
mod json;
pub mod markup;
mod options;

pub use html::{to_html, write_html};
pub use json::{from_json, to_json, write_json, JsonFormat};
pub use options::{HtmlOptions, Theme, DEFAULT_IMAGE_ID_LEN, DEFAULT_TOC_LIMIT};
