//! Word-processor (.docx) extractor.

use super::package::{attr, xml_error, Package, Relationship};
use super::{ExtractOptions, Extractor};
use crate::error::Result;
use crate::model::{Block, Image, Paragraph, Table, TextStyle};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_TYPE: &str = "/styles";
const DEFAULT_STYLE: &str = "Normal";
const DEFAULT_COLOR: &str = "#000000";

/// Subtrees outside the body text flow: text boxes and the legacy
/// fallback copies of drawings.
const SKIPPED: [&[u8]; 2] = [b"txbxContent", b"Fallback"];

/// Extracts body paragraphs, tables and embedded images from `.docx` files.
///
/// Paragraphs keep the named style and the formatting of their first run.
/// Images are identified by the SHA-1 of their data. Empty paragraphs are
/// dropped; cell text joins the cell's paragraphs with newlines.
#[derive(Debug, Clone, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for DocxExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn extract_bytes(
        &self,
        bytes: &[u8],
        source: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<Block>> {
        let mut package = Package::open(bytes, source)?;
        let document = package.main_part(DOCUMENT_PART)?;
        let rels = package.relationships(&document)?;

        let styles_part = rels
            .values()
            .find(|rel| rel.rel_type.ends_with(STYLES_TYPE))
            .map(|rel| rel.target.clone());
        let styles = match styles_part {
            Some(part) => match package.read_part(&part)? {
                Some(xml) => parse_styles(&xml, source)?,
                None => StyleNames::default(),
            },
            None => StyleNames::default(),
        };

        let xml = package.require_part(&document)?;
        let items = parse_body(&xml, &styles, source, options)?;

        let mut blocks = Vec::with_capacity(items.len());
        for item in items {
            match item {
                BodyItem::Block(block) => blocks.push(block),
                BodyItem::Image(rel_id) => {
                    if let Some(image) = load_image(&mut package, &rels, &rel_id) {
                        blocks.push(Block::Image(image));
                    }
                }
            }
        }
        Ok(blocks)
    }
}

fn load_image(
    package: &mut Package<'_>,
    rels: &HashMap<String, Relationship>,
    rel_id: &str,
) -> Option<Image> {
    let source = package.source();
    let Some(rel) = rels.get(rel_id) else {
        log::debug!("Image {} has no relationship in {}", rel_id, source.display());
        return None;
    };
    let data = match package.read_part(&rel.target) {
        Ok(Some(data)) => data,
        Ok(None) => {
            log::debug!("Image part {} missing in {}", rel.target, source.display());
            return None;
        }
        Err(e) => {
            log::debug!("Cannot read image {}: {}", rel.target, e);
            return None;
        }
    };

    let hash: String = Sha1::digest(&data)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    let image = Image::with_hash(hash)
        .with_size(data.len() as u64)
        .with_filename(format!("/{}", rel.target));
    Some(Image {
        rel_id: Some(rel_id.to_string()),
        ..image
    })
}

/// Style ID to display name.
#[derive(Debug, Default)]
struct StyleNames {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleNames {
    fn resolve(&self, id: Option<&str>) -> String {
        id.and_then(|id| self.names.get(id))
            .or(self.default_paragraph.as_ref())
            .cloned()
            .unwrap_or_else(|| DEFAULT_STYLE.to_string())
    }
}

fn parse_styles(xml: &[u8], source: &Path) -> Result<StyleNames> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut styles = StyleNames::default();
    // (style ID, is the default paragraph style)
    let mut current: Option<(String, bool)> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"style" => {
                let paragraph = attr(&e, b"type", source)?.as_deref() == Some("paragraph");
                let default = attr(&e, b"default", source)?;
                let default = matches!(default.as_deref(), Some("1" | "true"));
                current = attr(&e, b"styleId", source)?.map(|id| (id, paragraph && default));
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"name" => {
                let name = attr(&e, b"val", source)?;
                if let (Some((id, is_default)), Some(name)) = (&current, name) {
                    let name = display_style_name(&name);
                    if *is_default {
                        styles.default_paragraph = Some(name.clone());
                    }
                    styles.names.insert(id.clone(), name);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"style" => current = None,
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(source, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(styles)
}

/// Built-in styles are stored under lowercase names ("heading 1") and shown
/// capitalized ("Heading 1").
fn display_style_name(name: &str) -> String {
    if name.chars().any(char::is_uppercase) {
        return name.to_string();
    }
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Body content in document order. Images are resolved after parsing.
#[derive(Debug)]
enum BodyItem {
    Block(Block),
    Image(String),
}

#[derive(Debug, Default)]
struct RunStyle {
    bold: bool,
    italic: bool,
    underline: bool,
    color: Option<String>,
}

#[derive(Debug, Default)]
struct ParagraphState {
    text: String,
    style_id: Option<String>,
    first_run: RunStyle,
    runs: usize,
    images: Vec<String>,
}

#[derive(Debug)]
struct CellState {
    text: String,
    paragraphs: usize,
    span: usize,
}

impl CellState {
    fn new() -> Self {
        Self {
            text: String::new(),
            paragraphs: 0,
            span: 1,
        }
    }
}

struct BodyParser<'a> {
    styles: &'a StyleNames,
    source: &'a Path,
    options: &'a ExtractOptions,
    items: Vec<BodyItem>,
    skip_depth: usize,
    table_depth: usize,
    table: Table,
    cell: Option<CellState>,
    paragraph: Option<ParagraphState>,
    in_ppr: bool,
    in_rpr: bool,
    in_run: bool,
    in_text: bool,
}

fn parse_body(
    xml: &[u8],
    styles: &StyleNames,
    source: &Path,
    options: &ExtractOptions,
) -> Result<Vec<BodyItem>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut parser = BodyParser {
        styles,
        source,
        options,
        items: Vec::new(),
        skip_depth: 0,
        table_depth: 0,
        table: Table::default(),
        cell: None,
        paragraph: None,
        in_ppr: false,
        in_rpr: false,
        in_run: false,
        in_text: false,
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.start(&e, false)?,
            Ok(Event::Empty(e)) => parser.start(&e, true)?,
            Ok(Event::End(e)) => parser.end(e.local_name().as_ref()),
            Ok(Event::Text(t)) if parser.wants_text() => {
                let text = t.unescape().map_err(|e| xml_error(source, e))?;
                parser.push_text(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(source, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.items)
}

impl BodyParser<'_> {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let local = e.local_name();
        let name = local.as_ref();
        if SKIPPED.contains(&name) {
            if !empty {
                self.skip_depth += 1;
            }
            return Ok(());
        }
        if self.skip_depth > 0 {
            return Ok(());
        }

        match name {
            b"tbl" if !empty => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Table::default();
                }
            }
            b"tr" if self.table_depth == 1 => self.table.add_row(Vec::new()),
            b"tc" if self.table_depth == 1 => {
                self.cell = Some(CellState::new());
                if empty {
                    self.end_cell();
                }
            }
            b"gridSpan" if self.table_depth == 1 => {
                let span = attr(e, b"val", self.source)?.and_then(|v| v.parse::<usize>().ok());
                if let Some(cell) = self.cell.as_mut() {
                    cell.span = span.unwrap_or(1).max(1);
                }
            }
            b"p" => {
                self.start_paragraph();
                if empty {
                    self.end_paragraph();
                }
            }
            b"pPr" if !empty => self.in_ppr = true,
            b"pStyle" if self.in_ppr => {
                let style = attr(e, b"val", self.source)?;
                if let Some(p) = self.body_paragraph() {
                    p.style_id = style;
                }
            }
            b"r" => {
                if let Some(p) = self.body_paragraph() {
                    p.runs += 1;
                }
                self.in_run = !empty;
            }
            b"rPr" if !empty && !self.in_ppr && self.in_run => {
                self.in_rpr = self.body_paragraph().is_some_and(|p| p.runs == 1);
            }
            b"b" | b"i" | b"u" | b"color" if self.in_rpr => self.run_property(name, e)?,
            b"t" if self.in_run && !empty => self.in_text = true,
            b"tab" if self.in_run => self.push_text("\t"),
            b"br" | b"cr" if self.in_run => self.push_text("\n"),
            b"blip" => {
                if let Some(rel_id) = attr(e, b"embed", self.source)? {
                    if let Some(p) = self.body_paragraph() {
                        p.images.push(rel_id);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) {
        if SKIPPED.contains(&name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"tbl" => {
                if self.table_depth == 1 {
                    let table = std::mem::take(&mut self.table);
                    self.items.push(BodyItem::Block(Block::Table(table)));
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            b"tc" if self.table_depth == 1 => self.end_cell(),
            b"p" => self.end_paragraph(),
            b"pPr" => self.in_ppr = false,
            b"rPr" => self.in_rpr = false,
            b"r" => {
                self.in_run = false;
                self.in_rpr = false;
            }
            b"t" => self.in_text = false,
            _ => {}
        }
    }

    fn wants_text(&self) -> bool {
        self.skip_depth == 0 && self.in_text
    }

    fn push_text(&mut self, text: &str) {
        match self.table_depth {
            0 => {
                if let Some(p) = self.paragraph.as_mut() {
                    p.text.push_str(text);
                }
            }
            1 => {
                if let Some(cell) = self.cell.as_mut() {
                    cell.text.push_str(text);
                }
            }
            _ => {}
        }
    }

    /// The open paragraph, when it is directly in the body.
    fn body_paragraph(&mut self) -> Option<&mut ParagraphState> {
        if self.table_depth == 0 {
            self.paragraph.as_mut()
        } else {
            None
        }
    }

    fn run_property(&mut self, name: &[u8], e: &BytesStart<'_>) -> Result<()> {
        let val = attr(e, b"val", self.source)?;
        let Some(p) = self.body_paragraph() else {
            return Ok(());
        };
        let style = &mut p.first_run;
        match name {
            b"b" => style.bold = is_on(val.as_deref()),
            b"i" => style.italic = is_on(val.as_deref()),
            b"u" => style.underline = val.as_deref() != Some("none"),
            b"color" => {
                style.color = val
                    .filter(|v| v != "auto")
                    .map(|v| format!("#{}", v.to_lowercase()));
            }
            _ => {}
        }
        Ok(())
    }

    fn start_paragraph(&mut self) {
        match self.table_depth {
            0 => self.paragraph = Some(ParagraphState::default()),
            1 => {
                if let Some(cell) = self.cell.as_mut() {
                    if cell.paragraphs > 0 {
                        cell.text.push('\n');
                    }
                    cell.paragraphs += 1;
                }
            }
            _ => {}
        }
    }

    fn end_paragraph(&mut self) {
        if self.table_depth != 0 {
            return;
        }
        let Some(state) = self.paragraph.take() else {
            return;
        };

        let text = self.options.normalize(state.text.trim());
        if !text.is_empty() {
            let style = TextStyle {
                name: Some(self.styles.resolve(state.style_id.as_deref())),
                bold: state.first_run.bold,
                italic: state.first_run.italic,
                underline: state.first_run.underline,
                color: Some(
                    state
                        .first_run
                        .color
                        .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                ),
            };
            let paragraph = Paragraph::with_text(text).styled(style);
            self.items.push(BodyItem::Block(paragraph.into()));
        }
        self.items
            .extend(state.images.into_iter().map(BodyItem::Image));
    }

    fn end_cell(&mut self) {
        let Some(cell) = self.cell.take() else {
            return;
        };
        let text = self.options.normalize(cell.text.trim());
        if self.table.rows.is_empty() {
            self.table.add_row(Vec::new());
        }
        if let Some(row) = self.table.rows.last_mut() {
            row.extend(std::iter::repeat(text).take(cell.span));
        }
    }
}

fn is_on(val: Option<&str>) -> bool {
    !matches!(val, Some("0" | "false" | "off"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extract::package::tests::zip_parts;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0"?><Types/>"#;

    const ROOT_RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

    const DOCUMENT_RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/>
  <Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

    const STYLES: &str = r#"<?xml version="1.0"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style>
</w:styles>"#;

    const DOCUMENT: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"
    xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"
    xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
    xmlns:v="urn:schemas-microsoft-com:vml">
<w:body>
  <w:p>
    <w:pPr><w:pStyle w:val="Heading1"/><w:rPr><w:i/></w:rPr></w:pPr>
    <w:r><w:rPr><w:b/><w:color w:val="FF0000"/></w:rPr><w:t>Terms</w:t></w:r>
    <w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve"> of sale &amp; delivery </w:t></w:r>
  </w:p>
  <w:p><w:r><w:t>Price:</w:t><w:tab/><w:t>100 EUR</w:t></w:r></w:p>
  <w:p/>
  <w:p><w:r><w:t xml:space="preserve">   </w:t></w:r></w:p>
  <w:tbl>
    <w:tr>
      <w:tc><w:p><w:r><w:t>Item</w:t></w:r></w:p></w:tc>
      <w:tc><w:p><w:r><w:t>a</w:t></w:r></w:p><w:p><w:r><w:t>b</w:t></w:r></w:p></w:tc>
    </w:tr>
    <w:tr>
      <w:tc><w:tcPr><w:gridSpan w:val="2"/></w:tcPr><w:p><w:r><w:t>Total</w:t></w:r></w:p></w:tc>
    </w:tr>
  </w:tbl>
  <w:p><w:r><w:drawing><a:blip r:embed="rId5"/></w:drawing></w:r></w:p>
  <w:p>
    <w:r><w:t>Visible</w:t></w:r>
    <w:r><w:pict><v:textbox><w:txbxContent><w:p><w:r><w:t>Hidden</w:t></w:r></w:p></w:txbxContent></v:textbox></w:pict></w:r>
  </w:p>
  <w:sectPr/>
</w:body>
</w:document>"#;

    fn docx(document: &str) -> Vec<u8> {
        zip_parts(&[
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes()),
            ("word/styles.xml", STYLES.as_bytes()),
            ("word/document.xml", document.as_bytes()),
            ("word/media/image1.png", "abc".as_bytes()),
        ])
    }

    fn extract(bytes: &[u8]) -> Result<Vec<Block>> {
        let options = ExtractOptions::default();
        DocxExtractor::new().extract_bytes(bytes, Path::new("contract.docx"), &options)
    }

    #[test]
    fn test_paragraph_styles_from_first_run() {
        let blocks = extract(&docx(DOCUMENT)).unwrap();
        match &blocks[0] {
            Block::Paragraph(p) => {
                assert_eq!(p.text, "Terms of sale & delivery");
                assert_eq!(p.style.name.as_deref(), Some("Heading 1"));
                assert!(p.style.bold);
                assert!(!p.style.italic);
                assert_eq!(p.style.color.as_deref(), Some("#ff0000"));
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
        match &blocks[1] {
            Block::Paragraph(p) => {
                assert_eq!(p.text, "Price:\t100 EUR");
                assert_eq!(p.style.name.as_deref(), Some("Normal"));
                assert!(!p.style.bold);
                assert_eq!(p.style.color.as_deref(), Some("#000000"));
            }
            other => panic!("expected paragraph, got {:?}", other),
        }
    }

    #[test]
    fn test_body_order_and_content() {
        let blocks = extract(&docx(DOCUMENT)).unwrap();
        let tags: Vec<&str> = blocks.iter().map(Block::type_tag).collect();
        assert_eq!(tags, ["paragraph", "paragraph", "table", "image", "paragraph"]);

        match &blocks[2] {
            Block::Table(t) => assert_eq!(
                t.rows,
                vec![vec!["Item", "a\nb"], vec!["Total", "Total"]]
            ),
            other => panic!("expected table, got {:?}", other),
        }
        assert_eq!(blocks[4].plain_text(), "Visible");
    }

    #[test]
    fn test_image_identity() {
        let blocks = extract(&docx(DOCUMENT)).unwrap();
        match &blocks[3] {
            Block::Image(img) => {
                assert_eq!(img.identifier(), "a9993e364706816aba3e25717850c26c9cd0d89d");
                assert_eq!(img.rel_id.as_deref(), Some("rId5"));
                assert_eq!(img.size, Some(3));
                assert_eq!(img.filename.as_deref(), Some("/word/media/image1.png"));
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_image_is_dropped() {
        let document = DOCUMENT.replace("rId5", "rId404");
        let blocks = extract(&docx(&document)).unwrap();
        assert!(!blocks.iter().any(Block::is_image));
    }

    #[test]
    fn test_malformed_document() {
        let err = extract(&docx("<w:document><w:body><w:p></w:body>")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(matches!(extract(b"not a zip"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_style_names() {
        assert_eq!(display_style_name("heading 1"), "Heading 1");
        assert_eq!(display_style_name("My Custom style"), "My Custom style");
        assert!(is_on(None));
        assert!(!is_on(Some("0")));
    }
}
