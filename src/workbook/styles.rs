//! Stylesheet edits: one solid highlight fill plus derived cell formats.
//!
//! Existing `fill` and `xf` entries are never modified. A highlighted cell
//! gets a copy of its own format with only the fill swapped, so its font,
//! border, alignment and number format carry over. Workbooks saved without
//! a stylesheet, or with one lacking `fills` / `cellXfs`, get the missing
//! pieces with their default entries.

use super::xml::{Document, Element};
use crate::error::{FormatError, FormatResult};
use std::collections::HashMap;

pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
pub const RELATIONSHIP_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const MINIMAL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Child order of `<styleSheet>` required by the schema.
const SECTION_ORDER: [&str; 11] = [
    "numFmts", "fonts", "fills", "borders", "cellStyleXfs", "cellXfs", "cellStyles", "dxfs",
    "tableStyles", "colors", "extLst",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFormat {
    pub num_fmt_id: u32,
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
}

#[derive(Debug, Clone)]
pub struct Stylesheet {
    part: String,
    doc: Document,
    highlight_fill: Option<u32>,
    /// Base format index → highlighted copy.
    derived: HashMap<u32, u32>,
}

impl Stylesheet {
    pub fn parse(bytes: &[u8], part: &str) -> FormatResult<Self> {
        let doc = Document::parse(bytes, part)?;
        match doc.root() {
            Some(root) if root.local_name() == "styleSheet" => {}
            _ => return Err(FormatError::invalid(part, "expected <styleSheet>")),
        }
        Ok(Self {
            part: part.to_string(),
            doc,
            highlight_fill: None,
            derived: HashMap::new(),
        })
    }

    /// Default stylesheet for a workbook saved without one.
    pub fn minimal(part: &str) -> FormatResult<Self> {
        Self::parse(MINIMAL.as_bytes(), part)
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    pub fn is_modified(&self) -> bool {
        self.highlight_fill.is_some()
    }

    pub fn fill_count(&self) -> usize {
        self.section("fills").map_or(0, |f| f.children_named("fill").count())
    }

    pub fn cell_format_count(&self) -> usize {
        self.section("cellXfs").map_or(0, |x| x.children_named("xf").count())
    }

    pub fn cell_format(&self, index: u32) -> Option<CellFormat> {
        let xf = self
            .section("cellXfs")?
            .children_named("xf")
            .nth(index as usize)?;
        let id = |key: &str| xf.attr(key).and_then(|v| v.parse().ok()).unwrap_or(0);
        Some(CellFormat {
            num_fmt_id: id("numFmtId"),
            font_id: id("fontId"),
            fill_id: id("fillId"),
            border_id: id("borderId"),
        })
    }

    /// ARGB of a solid fill's foreground, if the fill has one.
    pub fn fill_rgb(&self, fill_id: u32) -> Option<String> {
        self.section("fills")?
            .children_named("fill")
            .nth(fill_id as usize)?
            .child("patternFill")?
            .child("fgColor")?
            .attr_value("rgb")
    }

    /// Index of a format equal to `base` but filled solid with `argb`.
    /// Repeated calls for the same base return the same index.
    pub fn highlighted(&mut self, base: u32, argb: &str) -> FormatResult<u32> {
        if let Some(&index) = self.derived.get(&base) {
            return Ok(index);
        }
        let fill_id = match self.highlight_fill {
            Some(id) => id,
            None => {
                let id = self.append_fill(argb)?;
                self.highlight_fill = Some(id);
                id
            }
        };

        let cell_xfs = self.ensure_section("cellXfs")?;

        let mut xf = match cell_xfs.children_named("xf").nth(base as usize) {
            Some(existing) => existing.clone(),
            None => {
                log::warn!("cell format {} does not exist, highlighting from default", base);
                Element::new(cell_xfs.sibling_name("xf"))
                    .with_attr("numFmtId", "0")
                    .with_attr("fontId", "0")
                    .with_attr("borderId", "0")
                    .with_attr("xfId", "0")
            }
        };
        xf.set_attr("fillId", &fill_id.to_string());
        xf.set_attr("applyFill", "1");
        cell_xfs.push(xf);
        let index = recount(cell_xfs, "xf") - 1;

        self.derived.insert(base, index);
        Ok(index)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.doc.to_bytes()
    }

    fn append_fill(&mut self, argb: &str) -> FormatResult<u32> {
        let fills = self.ensure_section("fills")?;

        let color = |local: &str| Element::new(fills.sibling_name(local)).with_attr("rgb", argb);
        let pattern = Element::new(fills.sibling_name("patternFill"))
            .with_attr("patternType", "solid")
            .with_child(color("fgColor"))
            .with_child(color("bgColor"));
        let fill = Element::new(fills.sibling_name("fill")).with_child(pattern);

        fills.push(fill);
        Ok(recount(fills, "fill") - 1)
    }

    fn section(&self, local: &str) -> Option<&Element> {
        self.doc.root()?.child(local)
    }

    /// The `local` section, created with its default entries when absent.
    fn ensure_section(&mut self, local: &str) -> FormatResult<&mut Element> {
        let part = self.part.clone();
        let root = self
            .doc
            .root_mut()
            .ok_or_else(|| FormatError::invalid(&part, "empty stylesheet"))?;

        if root.child(local).is_none() {
            let section = default_section(root, local);
            let later: &[&str] = match SECTION_ORDER.iter().position(|s| *s == local) {
                Some(i) => &SECTION_ORDER[i + 1..],
                None => &[],
            };
            root.insert_before(section, later);
            log::debug!("{} has no <{}>, added the default one", part, local);
        }
        root.child_mut(local)
            .ok_or_else(|| FormatError::invalid(&part, format!("no <{}>", local)))
    }
}

fn default_section(root: &Element, local: &str) -> Element {
    let name = |n: &str| root.sibling_name(n);
    let section = Element::new(name(local));
    match local {
        "fills" => section
            .with_attr("count", "2")
            .with_child(
                Element::new(name("fill"))
                    .with_child(Element::new(name("patternFill")).with_attr("patternType", "none")),
            )
            .with_child(
                Element::new(name("fill"))
                    .with_child(Element::new(name("patternFill")).with_attr("patternType", "gray125")),
            ),
        "cellXfs" => section.with_attr("count", "1").with_child(
            Element::new(name("xf"))
                .with_attr("numFmtId", "0")
                .with_attr("fontId", "0")
                .with_attr("fillId", "0")
                .with_attr("borderId", "0")
                .with_attr("xfId", "0"),
        ),
        _ => section.with_attr("count", "0"),
    }
}

/// Refresh a collection's `count` attribute; returns the new count.
fn recount(list: &mut Element, item: &str) -> u32 {
    let count = list.children_named(item).count() as u32;
    list.set_attr("count", &count.to_string());
    count
}
