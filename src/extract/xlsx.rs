//! Spreadsheet (.xlsx, .xlsm) extractor.

use super::package::{attr, xml_error, Package};
use super::{ExtractOptions, Extractor};
use crate::error::{Error, Result};
use crate::model::{Block, Table};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::path::Path;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const SHARED_STRINGS_TYPE: &str = "/sharedStrings";

/// Largest sheet grid (rows x columns) that is materialized.
const MAX_GRID_CELLS: usize = 10_000_000;

/// Extracts one table per non-empty worksheet, in workbook order.
///
/// Each table is the dense grid from `A1` to the last non-empty cell, with
/// missing cells as empty strings, named after its sheet. Cells carry their
/// stored value: shared and inline strings resolved, booleans as
/// `True`/`False`, numbers as written in the file.
#[derive(Debug, Clone, Default)]
pub struct XlsxExtractor;

impl XlsxExtractor {
    /// Create a new XLSX extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for XlsxExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["xlsx", "xlsm"]
    }

    fn name(&self) -> &str {
        "xlsx"
    }

    fn extract_bytes(
        &self,
        bytes: &[u8],
        source: &Path,
        options: &ExtractOptions,
    ) -> Result<Vec<Block>> {
        let mut package = Package::open(bytes, source)?;
        let workbook = package.main_part(WORKBOOK_PART)?;
        let rels = package.relationships(&workbook)?;

        let shared_part = rels
            .values()
            .find(|rel| rel.rel_type.ends_with(SHARED_STRINGS_TYPE))
            .map(|rel| rel.target.clone());
        let shared = match shared_part {
            Some(part) => match package.read_part(&part)? {
                Some(xml) => parse_shared_strings(&xml, source)?,
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        let sheets = parse_workbook(&package.require_part(&workbook)?, source)?;
        let mut blocks = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let Some(part) = sheet.rel_id.as_ref().and_then(|id| rels.get(id)) else {
                log::warn!("Sheet '{}' has no part in {}", sheet.name, source.display());
                continue;
            };
            let xml = package.require_part(&part.target)?;
            let table = parse_sheet(&xml, &shared, source, options)?;
            if table.is_empty() {
                log::debug!("Skipping empty sheet '{}'", sheet.name);
                continue;
            }
            blocks.push(Block::Table(table.with_sheet(sheet.name)));
        }
        Ok(blocks)
    }
}

#[derive(Debug)]
struct SheetRef {
    name: String,
    rel_id: Option<String>,
}

fn parse_workbook(xml: &[u8], source: &Path) -> Result<Vec<SheetRef>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                let name = attr(&e, b"name", source)?.unwrap_or_default();
                let rel_id = attr(&e, b"id", source)?;
                sheets.push(SheetRef { name, rel_id });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(source, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Shared string table. Phonetic runs (`rPh`) are not part of the value.
fn parse_shared_strings(xml: &[u8], source: &Path) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_phonetic = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"rPh" => in_phonetic = true,
                b"t" => in_text = !in_phonetic,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::Text(t)) if in_text => {
                current.push_str(&t.unescape().map_err(|e| xml_error(source, e))?);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(source, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

#[derive(Debug, Default)]
struct CellState {
    row: usize,
    col: usize,
    kind: Option<String>,
    raw: String,
}

fn parse_sheet(
    xml: &[u8],
    shared: &[String],
    source: &Path,
    options: &ExtractOptions,
) -> Result<Table> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut cells: Vec<(usize, usize, String)> = Vec::new();
    let mut row: usize = 0;
    let mut col: usize = 0;
    let mut cell: Option<CellState> = None;
    let mut in_value = false;
    let mut in_inline = false;
    let mut in_phonetic = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"row" => {
                row = attr(&e, b"r", source)?
                    .and_then(|r| r.parse::<usize>().ok())
                    .filter(|&r| r > 0)
                    .unwrap_or(row + 1);
                col = 0;
            }
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"c" => {
                let address = attr(&e, b"r", source)?.as_deref().and_then(parse_address);
                let (r, c) = address.unwrap_or((row.max(1), col + 1));
                col = c;
                let kind = attr(&e, b"t", source)?;
                cell = Some(CellState {
                    row: r,
                    col: c,
                    kind,
                    raw: String::new(),
                });
            }
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                let address = attr(&e, b"r", source)?.as_deref().and_then(parse_address);
                col = address.map_or(col + 1, |(_, c)| c);
            }
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"v" => in_value = cell.is_some(),
                b"is" => in_inline = cell.is_some(),
                b"rPh" => in_phonetic = true,
                b"t" => in_text = in_inline && !in_phonetic,
                _ => {}
            },
            Ok(Event::Text(t)) if in_value || in_text => {
                let text = t.unescape().map_err(|e| xml_error(source, e))?;
                if let Some(cell) = cell.as_mut() {
                    cell.raw.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"is" => in_inline = false,
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                b"c" => {
                    if let Some(done) = cell.take() {
                        let value = cell_value(done.kind.as_deref(), done.raw, shared, source)?;
                        if !value.is_empty() {
                            cells.push((done.row, done.col, value));
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(source, e)),
            _ => {}
        }
        buf.clear();
    }

    let rows = cells.iter().map(|c| c.0).max().unwrap_or(0);
    let cols = cells.iter().map(|c| c.1).max().unwrap_or(0);
    if rows.checked_mul(cols).map_or(true, |n| n > MAX_GRID_CELLS) {
        return Err(Error::parse(
            source,
            format!("sheet grid {}x{} is too large", rows, cols),
        ));
    }

    let mut table = Table::default();
    for _ in 0..rows {
        table.add_row(vec![String::new(); cols]);
    }
    for (r, c, value) in cells {
        if let Some(slot) = table.rows.get_mut(r - 1).and_then(|row| row.get_mut(c - 1)) {
            *slot = options.normalize(&value);
        }
    }
    Ok(table)
}

/// Display value of a cell from its type attribute and stored text.
fn cell_value(
    kind: Option<&str>,
    raw: String,
    shared: &[String],
    source: &Path,
) -> Result<String> {
    if raw.is_empty() {
        return Ok(raw);
    }
    match kind {
        Some("s") => {
            let index: usize = raw.trim().parse().map_err(|_| {
                Error::parse(source, format!("invalid shared string index '{}'", raw))
            })?;
            shared.get(index).cloned().ok_or_else(|| {
                Error::parse(source, format!("shared string index {} out of range", index))
            })
        }
        Some("b") => Ok(if raw.trim() == "1" { "True" } else { "False" }.to_string()),
        _ => Ok(raw),
    }
}

/// Split an `A1`-style reference into 1-based (row, column).
fn parse_address(address: &str) -> Option<(usize, usize)> {
    let split = address.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = address.split_at(split);
    let valid = (1..=3).contains(&letters.len())
        && letters.chars().all(|c| c.is_ascii_alphabetic());
    if !valid {
        return None;
    }
    let col = letters
        .bytes()
        .fold(0, |acc, b| acc * 26 + usize::from(b.to_ascii_uppercase() - b'A') + 1);
    let row: usize = digits.parse().ok()?;
    (row > 0).then_some((row, col))
}
