//! The xlsx container: an ordered set of zip parts.
//!
//! Parts that are never replaced are written back with their original bytes
//! and compression method, in their original order.

use super::xml::{Document, Element};
use crate::error::{FormatError, FormatResult};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const EMPTY_RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#;

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

#[derive(Debug, Clone)]
pub struct Package {
    parts: Vec<Part>,
}

/// One `<Relationship>` with its target resolved to a part name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

impl Relationship {
    /// Relationship types differ between transitional and strict packages;
    /// the last path segment (`worksheet`, `styles`) is common to both.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(kind)
    }
}

impl Package {
    pub fn from_bytes(bytes: &[u8]) -> FormatResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.push(Part {
                name: entry.name().to_string(),
                is_dir: entry.is_dir(),
                compression: entry.compression(),
                data,
            });
        }

        let package = Self { parts };
        if package.part(CONTENT_TYPES_PART).is_none() {
            return Err(FormatError::MissingPart(CONTENT_TYPES_PART.to_string()));
        }
        log::debug!("opened package with {} parts", package.parts.len());
        Ok(package)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter(|p| !p.is_dir).map(|p| p.name.as_str())
    }

    /// Part names are case-insensitive inside a package.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        let name = name.trim_start_matches('/');
        self.parts
            .iter()
            .find(|p| !p.is_dir && p.name.eq_ignore_ascii_case(name))
            .map(|p| p.data.as_slice())
    }

    pub fn require_part(&self, name: &str) -> FormatResult<&[u8]> {
        self.part(name)
            .ok_or_else(|| FormatError::MissingPart(name.to_string()))
    }

    /// Replace an existing part in place, or append a new one.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        let name = name.trim_start_matches('/');
        match self
            .parts
            .iter_mut()
            .find(|p| !p.is_dir && p.name.eq_ignore_ascii_case(name))
        {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
                compression: CompressionMethod::Deflated,
                is_dir: false,
            }),
        }
    }

    /// Relationships declared by `source` (`""` for the package itself).
    /// A part without a relationships part simply has none.
    pub fn relationships(&self, source: &str) -> FormatResult<Vec<Relationship>> {
        let rels_part = rels_path(source);
        let Some(bytes) = self.part(&rels_part) else {
            return Ok(Vec::new());
        };
        let doc = Document::parse(bytes, &rels_part)?;
        let Some(root) = doc.root() else {
            return Ok(Vec::new());
        };

        let rels = root
            .children_named("Relationship")
            .filter_map(|rel| {
                let id = rel.attr_value("Id")?;
                let target = rel.attr_value("Target")?;
                let external = rel.attr("TargetMode") == Some("External");
                Some(Relationship {
                    id,
                    rel_type: rel.attr_value("Type").unwrap_or_default(),
                    target: if external {
                        target
                    } else {
                        resolve_target(source, &target)
                    },
                    external,
                })
            })
            .collect();
        Ok(rels)
    }

    /// Declare a relationship from `source` to `target` (relative to the
    /// source's directory) and return its new id.
    pub fn add_relationship(&mut self, source: &str, rel_type: &str, target: &str) -> FormatResult<String> {
        let rels_part = rels_path(source);
        let mut doc = match self.part(&rels_part) {
            Some(bytes) => Document::parse(bytes, &rels_part)?,
            None => Document::parse(EMPTY_RELATIONSHIPS.as_bytes(), &rels_part)?,
        };
        let root = doc
            .root_mut()
            .ok_or_else(|| FormatError::invalid(&rels_part, "empty relationships part"))?;

        let next = root
            .children_named("Relationship")
            .filter_map(|rel| rel.attr("Id")?.strip_prefix("rId")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("rId{}", next);
        let rel = Element::new(root.sibling_name("Relationship"))
            .with_attr("Id", &id)
            .with_attr("Type", rel_type)
            .with_attr("Target", target);
        root.push(rel);

        self.set_part(&rels_part, doc.to_bytes());
        log::debug!("{}: added {} -> {}", rels_part, id, target);
        Ok(id)
    }

    /// Register the content type of a new part, unless it already has one.
    pub fn add_content_override(&mut self, part: &str, content_type: &str) -> FormatResult<()> {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        let mut doc = Document::parse(self.require_part(CONTENT_TYPES_PART)?, CONTENT_TYPES_PART)?;
        let root = doc
            .root_mut()
            .ok_or_else(|| FormatError::invalid(CONTENT_TYPES_PART, "empty content types"))?;

        let registered = root.children_named("Override").any(|o| {
            o.attr_value("PartName")
                .is_some_and(|name| name.eq_ignore_ascii_case(&part_name))
        });
        if registered {
            return Ok(());
        }
        let entry = Element::new(root.sibling_name("Override"))
            .with_attr("PartName", &part_name)
            .with_attr("ContentType", content_type);
        root.push(entry);

        self.set_part(CONTENT_TYPES_PART, doc.to_bytes());
        Ok(())
    }

    pub fn to_bytes(&self) -> FormatResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for part in &self.parts {
            let method = match part.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if part.is_dir {
                writer.add_directory(part.name.as_str(), options)?;
            } else {
                writer.start_file(part.name.as_str(), options)?;
                writer.write_all(&part.data)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// `xl/workbook.xml` → `xl/_rels/workbook.xml.rels`.
pub fn rels_path(source: &str) -> String {
    let source = source.trim_start_matches('/');
    if source.is_empty() {
        return "_rels/.rels".to_string();
    }
    match source.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", source),
    }
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(source: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let base = source
        .trim_start_matches('/')
        .rsplit_once('/')
        .map_or("", |(dir, _)| dir);

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
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

#[cfg(test)]
mod tests {
    use super::*;

    fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_rels_path() {
        assert_eq!(rels_path(""), "_rels/.rels");
        assert_eq!(rels_path("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(rels_path("/xl/worksheets/sheet1.xml"), "xl/worksheets/_rels/sheet1.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("", "xl/workbook.xml"), "xl/workbook.xml");
        assert_eq!(resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("xl/workbook.xml", "/xl/styles.xml"), "xl/styles.xml");
        assert_eq!(resolve_target("xl/worksheets/sheet1.xml", "../drawings/drawing1.xml"), "xl/drawings/drawing1.xml");
        assert_eq!(resolve_target("xl/workbook.xml", "./theme/theme1.xml"), "xl/theme/theme1.xml");
    }

    #[test]
    fn test_roundtrip_keeps_parts_and_order() {
        let bytes = zip_of(&[
            (CONTENT_TYPES_PART, "<Types/>"),
            ("xl/workbook.xml", "<workbook/>"),
            ("docProps/app.xml", "<Properties/>"),
        ]);
        let mut package = Package::from_bytes(&bytes).unwrap();
        package.set_part("xl/workbook.xml", b"<workbook changed=\"1\"/>".to_vec());

        let reopened = Package::from_bytes(&package.to_bytes().unwrap()).unwrap();
        let names: Vec<&str> = reopened.part_names().collect();
        assert_eq!(names, vec![CONTENT_TYPES_PART, "xl/workbook.xml", "docProps/app.xml"]);
        assert_eq!(reopened.part("docProps/app.xml").unwrap(), b"<Properties/>");
        assert_eq!(reopened.part("XL/Workbook.xml").unwrap(), b"<workbook changed=\"1\"/>");
    }

    #[test]
    fn test_relationships() {
        let bytes = zip_of(&[
            (CONTENT_TYPES_PART, "<Types/>"),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId9" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a&amp;b" TargetMode="External"/></Relationships>"#,
            ),
        ]);
        let package = Package::from_bytes(&bytes).unwrap();
        let rels = package.relationships("xl/workbook.xml").unwrap();
        assert_eq!(rels.len(), 2);
        assert!(rels[0].is_kind("worksheet"));
        assert_eq!(rels[0].target, "xl/worksheets/sheet1.xml");
        assert!(rels[1].external);
        assert_eq!(rels[1].target, "https://example.com/a&b");

        assert!(package.relationships("xl/styles.xml").unwrap().is_empty());
    }

    #[test]
    fn test_add_relationship_and_content_type() {
        let bytes = zip_of(&[
            (CONTENT_TYPES_PART, r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/xl/workbook.xml" ContentType="wb"/></Types>"#),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/></Relationships>"#,
            ),
        ]);
        let mut package = Package::from_bytes(&bytes).unwrap();

        let id = package
            .add_relationship("xl/workbook.xml", "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles", "styles.xml")
            .unwrap();
        assert_eq!(id, "rId4");
        let rels = package.relationships("xl/workbook.xml").unwrap();
        assert_eq!(rels.len(), 3);
        assert!(rels[2].is_kind("styles"));
        assert_eq!(rels[2].target, "xl/styles.xml");

        package.add_content_override("xl/styles.xml", "st").unwrap();
        package.add_content_override("xl/styles.xml", "st").unwrap();
        let types = String::from_utf8(package.part(CONTENT_TYPES_PART).unwrap().to_vec()).unwrap();
        assert_eq!(types.matches(r#"PartName="/xl/styles.xml""#).count(), 1);

        // a source without relationships gets a new part
        let id = package.add_relationship("xl/worksheets/sheet1.xml", "urn:drawing", "../drawings/d1.xml").unwrap();
        assert_eq!(id, "rId1");
        assert_eq!(package.relationships("xl/worksheets/sheet1.xml").unwrap()[0].target, "xl/drawings/d1.xml");
    }

    #[test]
    fn test_not_a_package() {
        assert!(matches!(Package::from_bytes(b"definitely not a zip"), Err(FormatError::Zip(_))));

        let bytes = zip_of(&[("readme.txt", "hello")]);
        assert!(matches!(Package::from_bytes(&bytes), Err(FormatError::MissingPart(_))));
    }
}
