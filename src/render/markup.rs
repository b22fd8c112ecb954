//! Escaping HTML builder.
//!
//! Text and attribute values are always escaped. Tag and attribute names, and
//! raw fragments, must be `&'static str`, so only compile-time constants can
//! reach the output unescaped.

use crate::model::{InlineDiff, SpanTag};

/// Escape text for HTML element content or a quoted attribute value.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text);
    out
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

/// HTML writer that escapes by default.
#[derive(Debug, Default)]
pub struct HtmlWriter {
    buf: String,
}

impl HtmlWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an opening tag.
    pub fn open(&mut self, tag: &'static str, attrs: &[(&'static str, &str)]) -> &mut Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attrs {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            escape_into(&mut self.buf, value);
            self.buf.push('"');
        }
        self.buf.push('>');
        self
    }

    /// Write a closing tag.
    pub fn close(&mut self, tag: &'static str) -> &mut Self {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
        self
    }

    /// Write an element without content or closing tag (e.g., `meta`).
    pub fn void(&mut self, tag: &'static str, attrs: &[(&'static str, &str)]) -> &mut Self {
        self.open(tag, attrs)
    }

    /// Write escaped text.
    pub fn text(&mut self, text: &str) -> &mut Self {
        escape_into(&mut self.buf, text);
        self
    }

    /// Write an element containing escaped text.
    pub fn element(
        &mut self,
        tag: &'static str,
        attrs: &[(&'static str, &str)],
        text: &str,
    ) -> &mut Self {
        self.open(tag, attrs).text(text).close(tag)
    }

    /// Write a compile-time constant fragment (stylesheet, script, doctype).
    pub fn raw(&mut self, fragment: &'static str) -> &mut Self {
        self.buf.push_str(fragment);
        self
    }

    /// Write an inline diff: equal runs as text, deletions in `<del>`,
    /// insertions in `<ins>`.
    pub fn inline_diff(&mut self, diff: &InlineDiff) -> &mut Self {
        for span in &diff.spans {
            match span.tag {
                SpanTag::Equal => self.text(&span.text),
                SpanTag::Deleted => self.element("del", &[], &span.text),
                SpanTag::Inserted => self.element("ins", &[], &span.text),
            };
        }
        self
    }

    /// Length of the output so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the HTML.
    pub fn finish(self) -> String {
        self.buf
    }
}
