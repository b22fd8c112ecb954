//! Paragraph types.

use serde::{Deserialize, Serialize};

/// A paragraph of text with optional style attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph text
    pub text: String,

    /// Style attributes carried over from the source document
    pub style: TextStyle,
}

impl Paragraph {
    /// Create a paragraph with plain text.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: TextStyle::default(),
        }
    }

    /// Set style and return self.
    pub fn styled(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Check if the paragraph has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Text style attributes.
///
/// These are opaque to the diff engine: two paragraphs with the same text and
/// different styles align as unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Named paragraph style (e.g., "Heading 1")
    #[serde(rename = "style", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Bold
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,

    /// Italic
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,

    /// Underline
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,

    /// Text color as hex string (e.g., "#ff0000")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextStyle {
    /// Create a bold style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Set the named style.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Check if no attribute is set.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
