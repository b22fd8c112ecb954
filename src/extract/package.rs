//! Office Open XML package access.
//!
//! Word-processor and spreadsheet files are ZIP archives of XML parts tied
//! together by relationship parts (`_rels/*.rels`).

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Cursor, Read};
use std::path::Path;
use zip::result::ZipError;
use zip::ZipArchive;

const CONTENT_TYPES: &str = "[Content_Types].xml";
const ROOT_RELS: &str = "_rels/.rels";
const OFFICE_DOCUMENT_TYPE: &str = "/officeDocument";

/// Largest uncompressed part that is read.
const MAX_PART_BYTES: u64 = 100 * 1024 * 1024;

/// Largest total of uncompressed parts read from one package.
const MAX_TOTAL_BYTES: u64 = 500 * 1024 * 1024;

/// One entry of a relationship part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    /// Relationship type URI
    pub rel_type: String,
    /// Part name inside the package, resolved against the source part
    pub target: String,
}

/// An opened package.
pub(crate) struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    source: &'a Path,
    total_read: u64,
}

impl<'a> Package<'a> {
    /// Open a package and check that it is an OPC container.
    pub fn open(bytes: &'a [u8], source: &'a Path) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| match e {
            ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => {
                Error::parse(source, "not a ZIP container")
            }
            other => Error::parse(source, other.to_string()),
        })?;

        if archive.by_name(CONTENT_TYPES).is_err() {
            return Err(Error::parse(
                source,
                "not an Office Open XML package (missing [Content_Types].xml)",
            ));
        }

        Ok(Self {
            archive,
            source,
            total_read: 0,
        })
    }

    /// Path of the file the package came from.
    pub fn source(&self) -> &'a Path {
        self.source
    }

    /// Read a part, or `None` when the package has no such part.
    pub fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let source = self.source;
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(Error::parse(source, format!("cannot read {}: {}", name, e))),
        };

        let size = file.size();
        if size > MAX_PART_BYTES {
            return Err(Error::parse(
                source,
                format!("part {} is too large: {} bytes", name, size),
            ));
        }
        self.total_read = self.total_read.saturating_add(size);
        if self.total_read > MAX_TOTAL_BYTES {
            return Err(Error::parse(
                source,
                format!("package exceeds {} uncompressed bytes", MAX_TOTAL_BYTES),
            ));
        }

        let mut buf = Vec::with_capacity(size as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| Error::parse(source, format!("cannot read {}: {}", name, e)))?;
        Ok(Some(buf))
    }

    /// Read a part that must exist.
    pub fn require_part(&mut self, name: &str) -> Result<Vec<u8>> {
        self.read_part(name)?
            .ok_or_else(|| Error::parse(self.source, format!("missing part {}", name)))
    }

    /// Relationships of a part, keyed by relationship ID. External targets
    /// are left out.
    pub fn relationships(&mut self, part: &str) -> Result<HashMap<String, Relationship>> {
        match self.read_part(&rels_path(part))? {
            Some(xml) => parse_relationships(&xml, part, self.source),
            None => Ok(HashMap::new()),
        }
    }

    /// Name of the main document part, from the package relationships.
    pub fn main_part(&mut self, fallback: &str) -> Result<String> {
        let rels = self.relationships("")?;
        let main = rels
            .into_values()
            .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_TYPE))
            .map(|rel| rel.target);
        Ok(main.unwrap_or_else(|| fallback.to_string()))
    }
}

/// Relationship part of a part: `word/document.xml` has
/// `word/_rels/document.xml.rels`; the package itself has `_rels/.rels`.
pub(crate) fn rels_path(part: &str) -> String {
    if part.is_empty() {
        return ROOT_RELS.to_string();
    }
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that declares it.
pub(crate) fn resolve_target(part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = match part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

fn parse_relationships(
    xml: &[u8],
    part: &str,
    source: &Path,
) -> Result<HashMap<String, Relationship>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut map = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let external = attr(&e, b"TargetMode", source)?.as_deref() == Some("External");
                let id = attr(&e, b"Id", source)?;
                let target = attr(&e, b"Target", source)?;
                if let (Some(id), Some(target), false) = (id, target, external) {
                    let rel_type = attr(&e, b"Type", source)?.unwrap_or_default();
                    let target = resolve_target(part, &target);
                    map.insert(id, Relationship { rel_type, target });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(source, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(map)
}

/// Value of the attribute with the given local name, unescaped.
pub(crate) fn attr(e: &BytesStart<'_>, local: &[u8], source: &Path) -> Result<Option<String>> {
    for attribute in e.attributes() {
        let attribute = attribute.map_err(|e| xml_error(source, e))?;
        if attribute.key.local_name().as_ref() == local {
            let value = attribute.unescape_value().map_err(|e| xml_error(source, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Parse error for malformed XML in a package.
pub(crate) fn xml_error(source: &Path, e: impl Display) -> Error {
    Error::parse(source, format!("XML error: {}", e))
}
