//! Integration tests for extraction and the end-to-end pipeline.

use docdelta::error::{Error, Result};
use docdelta::extract::{ExtractOptions, Extractor, ExtractorRegistry};
use docdelta::model::{Block, ChangeKind};
use docdelta::DocDelta;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Mock extractor for testing.
struct MockExtractor {
    extensions: Vec<&'static str>,
    name: &'static str,
}

impl Extractor for MockExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &self.extensions
    }

    fn name(&self) -> &str {
        self.name
    }

    fn extract_bytes(
        &self,
        bytes: &[u8],
        _source: &Path,
        _options: &ExtractOptions,
    ) -> Result<Vec<Block>> {
        Ok(vec![Block::paragraph(format!("{} bytes", bytes.len()))])
    }
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_registry_new_is_empty() {
    let registry = ExtractorRegistry::new();
    assert!(registry.supported_extensions().is_empty());
    assert!(!registry.supports("txt"));
}

#[test]
fn test_register_custom_extractor() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "slides.PPTX", "12345");

    let mut registry = ExtractorRegistry::with_defaults();
    registry.register(Arc::new(MockExtractor {
        extensions: vec!["pptx", "ppt"],
        name: "Slides",
    }));

    assert!(registry.supports("ppt"));
    assert!(registry.get_by_name("slides").is_some());
    let blocks = registry.extract(&path, &ExtractOptions::default()).unwrap();
    assert_eq!(blocks, vec![Block::paragraph("5 bytes")]);
}

#[test]
fn test_later_registration_wins() {
    let mut registry = ExtractorRegistry::with_defaults();
    registry.register(Arc::new(MockExtractor {
        extensions: vec!["txt"],
        name: "override",
    }));
    assert_eq!(registry.get_by_extension("txt").unwrap().name(), "override");
}

#[test]
fn test_text_files_end_to_end() {
    let dir = TempDir::new().unwrap();
    let old = write(&dir, "v1.txt", "Title\nPayment within 14 days.\nSignatures\n");
    let new = write(
        &dir,
        "v2.txt",
        "Title\nPayment within 30 days.\nSignatures\nAnnex A\n",
    );

    let report = DocDelta::new().compare_files(&old, &new).unwrap();
    assert_eq!(report.metadata.old_source, "v1.txt");
    assert_eq!(report.metadata.new_source, "v2.txt");
    assert_eq!(report.stats.totals.changed, 1);
    assert_eq!(report.stats.totals.added, 1);
    assert_eq!(report.stats.totals.unchanged, 2);
    assert_eq!(report.entries[1].kind(), ChangeKind::Changed);
    assert!(report.entries[1].annotation.is_some());
}

#[test]
fn test_json_and_tsv_inputs() {
    let dir = TempDir::new().unwrap();
    let old = write(
        &dir,
        "old.json",
        r#"[{"type": "table", "table": [["a", "1"], ["b", "2"]], "sheet": "rates"}]"#,
    );
    let new = write(&dir, "rates.tsv", "a\t1\nb\t3\n");

    let report = DocDelta::new()
        .without_annotator()
        .compare_files(&old, &new)
        .unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].kind(), ChangeKind::Changed);
    assert_eq!(report.entries[0].block_type(), "table");
    assert!(report.entries[0].annotation.is_none());
}

#[test]
fn test_missing_and_malformed_inputs() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.txt", "text");
    let bad = write(&dir, "bad.json", "[{\"type\": ");
    let missing = dir.path().join("missing.txt");
    let odd = write(&dir, "notes.xyz", "text");

    let delta = DocDelta::new();
    match delta.compare_files(&missing, &good) {
        Err(Error::NotFound(path)) => assert_eq!(path, missing),
        other => panic!("expected NotFound, got {:?}", other.map(|r| r.entries.len())),
    }
    match delta.compare_files(&good, &bad) {
        Err(e @ Error::Parse { .. }) => assert!(e.is_input_error()),
        other => panic!("expected Parse, got {:?}", other.map(|r| r.entries.len())),
    }
    assert!(matches!(
        delta.compare_files(&good, &odd),
        Err(Error::UnsupportedFormat(_))
    ));
}

#[test]
fn test_blank_lines_option() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "doc.txt", "a\n\nb\n");
    let registry = ExtractorRegistry::with_defaults();

    let dense = registry.extract(&path, &ExtractOptions::default()).unwrap();
    let sparse = registry
        .extract(&path, &ExtractOptions::new().with_blank_lines(true))
        .unwrap();
    assert_eq!(dense.len(), 2);
    assert_eq!(sparse.len(), 3);
}

const PACKAGE_RELS: &str = r#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="MAIN"/>
</Relationships>"#;

/// Write an Office Open XML package whose main part is `main`.
fn write_package(dir: &TempDir, name: &str, main: &str, parts: &[(&str, &str)]) -> PathBuf {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let path = dir.path().join(name);
    let mut writer = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let rels = PACKAGE_RELS.replace("MAIN", main);
    let mut all = vec![("[Content_Types].xml", "<Types/>"), ("_rels/.rels", rels.as_str())];
    all.extend_from_slice(parts);
    for (part, content) in all {
        writer.start_file(part, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

fn docx_body(paragraphs: &[&str]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    )
}

#[test]
fn test_docx_files_end_to_end() {
    let dir = TempDir::new().unwrap();
    let v1 = docx_body(&["Offer", "Delivery within 14 days.", "Signatures"]);
    let v2 = docx_body(&["Offer", "Delivery within 30 days.", "Signatures"]);
    let main = "word/document.xml";
    let old = write_package(&dir, "v1.docx", main, &[(main, v1.as_str())]);
    let new = write_package(&dir, "v2.DOCX", main, &[(main, v2.as_str())]);

    let report = DocDelta::new().compare_files(&old, &new).unwrap();
    assert_eq!(report.stats.totals.changed, 1);
    assert_eq!(report.stats.totals.unchanged, 2);
    assert_eq!(report.entries[1].block_type(), "paragraph");
    assert_eq!(report.toc, vec![1]);
}

#[test]
fn test_xlsx_files_end_to_end() {
    let dir = TempDir::new().unwrap();
    let workbook = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Rates" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
    let rels = r#"<Relationships><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;
    let sheet = |price: &str| {
        format!(
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>steel</t></is></c><c r="B1"><v>{}</v></c></row></sheetData></worksheet>"#,
            price
        )
    };
    let write_xlsx = |name: &str, sheet_xml: &str| {
        let parts = [
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/worksheets/sheet1.xml", sheet_xml),
        ];
        write_package(&dir, name, "xl/workbook.xml", &parts)
    };
    let old = write_xlsx("q1.xlsx", &sheet("100"));
    let new = write_xlsx("q2.xlsx", &sheet("120"));

    let report = DocDelta::new()
        .without_annotator()
        .compare_files(&old, &new)
        .unwrap();
    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].kind(), ChangeKind::Changed);
    match report.entries[0].change.new_block() {
        Some(Block::Table(table)) => {
            assert_eq!(table.sheet.as_deref(), Some("Rates"));
            assert_eq!(table.cell(0, 1), Some("120"));
        }
        other => panic!("expected table, got {:?}", other),
    }
}

#[test]
fn test_corrupt_package_is_input_error() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.txt", "text");
    let corrupt = write(&dir, "broken.xlsx", "this is not a zip archive");
    match DocDelta::new().compare_files(&good, &corrupt) {
        Err(e @ Error::Parse { .. }) => assert!(e.is_input_error()),
        other => panic!("expected Parse, got {:?}", other.map(|r| r.entries.len())),
    }
}
