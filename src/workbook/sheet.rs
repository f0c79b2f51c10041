//! Worksheet part as an editable grid.
//!
//! `sheetData` is lifted into a row/column map on load and put back on
//! serialisation. Rows and cells the caller never touches keep their
//! elements (attributes, formulas, values) exactly as read.

use super::cell_ref::{cell_name, parse_cell, parse_range, CellRange};
use super::xml::{Document, Element, Node};
use crate::error::{FormatError, FormatResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct SheetRow {
    /// The `<row>` element with its cells removed.
    element: Element,
    cells: BTreeMap<u32, Element>,
    /// Non-cell children (`extLst`), written after the cells.
    extra: Vec<Node>,
}

#[derive(Debug, Clone)]
pub struct Worksheet {
    part: String,
    doc: Document,
    rows: BTreeMap<u32, SheetRow>,
    merges: Vec<CellRange>,
}

impl Worksheet {
    pub fn parse(bytes: &[u8], part: &str) -> FormatResult<Self> {
        let mut doc = Document::parse(bytes, part)?;
        let root = doc
            .root_mut()
            .ok_or_else(|| FormatError::invalid(part, "empty worksheet"))?;
        if root.local_name() != "worksheet" {
            return Err(FormatError::invalid(
                part,
                format!("expected <worksheet>, found <{}>", root.name),
            ));
        }

        let merges = root
            .child("mergeCells")
            .map(|list| {
                list.children_named("mergeCell")
                    .filter_map(|m| m.attr("ref").and_then(parse_range))
                    .collect()
            })
            .unwrap_or_default();

        let sheet_data = root
            .child_mut("sheetData")
            .ok_or_else(|| FormatError::invalid(part, "no <sheetData>"))?;

        let mut rows = BTreeMap::new();
        let mut last_row = 0;
        for node in std::mem::take(&mut sheet_data.children) {
            let Node::Element(mut row) = node else { continue };
            if row.local_name() != "row" {
                continue;
            }
            let index = match row.attr("r") {
                Some(r) => r.parse::<u32>().map_err(|_| FormatError::InvalidCellReference {
                    part: part.to_string(),
                    reference: r.to_string(),
                })?,
                None => {
                    let index = last_row + 1;
                    row.set_attr("r", &index.to_string());
                    index
                }
            };
            last_row = index;

            let mut cells = BTreeMap::new();
            let mut extra = Vec::new();
            let mut last_col = 0;
            for child in std::mem::take(&mut row.children) {
                match child {
                    Node::Element(mut cell) if cell.local_name() == "c" => {
                        let col = match cell.attr("r") {
                            Some(reference) => parse_cell(reference).map(|(_, c)| c).ok_or_else(|| {
                                FormatError::InvalidCellReference {
                                    part: part.to_string(),
                                    reference: reference.to_string(),
                                }
                            })?,
                            None => {
                                let col = last_col + 1;
                                cell.set_attr("r", &cell_name(index, col));
                                col
                            }
                        };
                        last_col = col;
                        cells.insert(col, cell);
                    }
                    Node::Element(other) => extra.push(Node::Element(other)),
                    Node::Raw(_) => {}
                }
            }

            rows.insert(
                index,
                SheetRow {
                    element: row,
                    cells,
                    extra,
                },
            );
        }

        Ok(Self {
            part: part.to_string(),
            doc,
            rows,
            merges,
        })
    }

    pub fn part(&self) -> &str {
        &self.part
    }

    /// Highest column holding a cell or covered by a merged range (0 when empty).
    pub fn max_column(&self) -> u32 {
        let from_cells = self
            .rows
            .values()
            .filter_map(|r| r.cells.keys().next_back().copied())
            .max()
            .unwrap_or(0);
        let from_merges = self.merges.iter().map(|m| m.last_col).max().unwrap_or(0);
        from_cells.max(from_merges)
    }

    /// Highest row holding a cell or covered by a merged range (0 when empty).
    pub fn max_row(&self) -> u32 {
        let from_cells = self
            .rows
            .iter()
            .rev()
            .find(|(_, r)| !r.cells.is_empty())
            .map(|(i, _)| *i)
            .unwrap_or(0);
        let from_merges = self.merges.iter().map(|m| m.last_row).max().unwrap_or(0);
        from_cells.max(from_merges)
    }

    pub fn merged_ranges(&self) -> &[CellRange] {
        &self.merges
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Element> {
        self.rows.get(&row).and_then(|r| r.cells.get(&col))
    }

    /// Cell format index (`s`), 0 when absent.
    pub fn cell_style(&self, row: u32, col: u32) -> u32 {
        self.cell(row, col)
            .and_then(|c| c.attr("s"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// Cell text: inline strings and literal values. Shared-string cells
    /// return the index, not the string.
    pub fn cell_text(&self, row: u32, col: u32) -> Option<String> {
        let cell = self.cell(row, col)?;
        if let Some(inline) = cell.child("is") {
            return Some(inline.children_named("t").map(|t| t.text()).collect());
        }
        cell.child("v").map(|v| v.text())
    }

    pub fn set_inline_string(&mut self, row: u32, col: u32, text: &str) {
        let cell = self.cell_mut(row, col);
        let mut t = Element::new(cell.sibling_name("t"));
        if text.trim() != text {
            t.set_attr("xml:space", "preserve");
        }
        let inline = Element::new(cell.sibling_name("is")).with_child(t.with_text(text));

        clear_value(cell);
        cell.set_attr("t", "inlineStr");
        cell.push(inline);
    }

    pub fn set_number(&mut self, row: u32, col: u32, value: f64) {
        let cell = self.cell_mut(row, col);
        let v = Element::new(cell.sibling_name("v")).with_text(&value.to_string());

        clear_value(cell);
        cell.push(v);
    }

    /// Point the cell at format `style`, creating an empty cell if needed.
    pub fn set_style(&mut self, row: u32, col: u32, style: u32) {
        let cell = self.cell_mut(row, col);
        cell.set_attr("s", &style.to_string());
    }

    /// Grow the `<dimension>` reference to include `last_row`/`last_col`.
    pub fn widen_dimension(&mut self, last_row: u32, last_col: u32) {
        let Some(root) = self.doc.root_mut() else { return };
        let Some(dimension) = root.child_mut("dimension") else { return };
        let wanted = CellRange {
            first_row: 1,
            first_col: 1,
            last_row: last_row.max(1),
            last_col: last_col.max(1),
        };
        let widened = match dimension.attr("ref").and_then(parse_range) {
            Some(existing) => CellRange {
                first_row: existing.first_row,
                first_col: existing.first_col,
                last_row: existing.last_row.max(wanted.last_row),
                last_col: existing.last_col.max(wanted.last_col),
            },
            None => wanted,
        };
        dimension.set_attr("ref", &widened.to_reference());
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        let rows = std::mem::take(&mut self.rows);
        if let Some(sheet_data) = self.doc.root_mut().and_then(|r| r.child_mut("sheetData")) {
            sheet_data.children = rows
                .into_values()
                .map(|row| {
                    let mut element = row.element;
                    element.children = row
                        .cells
                        .into_values()
                        .map(Node::Element)
                        .chain(row.extra)
                        .collect();
                    Node::Element(element)
                })
                .collect();
        }
        self.doc.to_bytes()
    }

    fn cell_mut(&mut self, row: u32, col: u32) -> &mut Element {
        let row_name = self.qualified("row");
        let cell_name_tag = self.qualified("c");

        let sheet_row = self.rows.entry(row).or_insert_with(|| SheetRow {
            element: Element::new(row_name).with_attr("r", &row.to_string()),
            cells: BTreeMap::new(),
            extra: Vec::new(),
        });
        if !sheet_row.cells.contains_key(&col) {
            widen_spans(&mut sheet_row.element, col);
        }
        sheet_row
            .cells
            .entry(col)
            .or_insert_with(|| Element::new(cell_name_tag).with_attr("r", &cell_name(row, col)))
    }

    fn qualified(&self, local: &str) -> String {
        self.doc
            .root()
            .map(|r| r.sibling_name(local))
            .unwrap_or_else(|| local.to_string())
    }
}

fn clear_value(cell: &mut Element) {
    cell.remove_attr("t");
    cell.children.clear();
}

/// Rows written with a `spans` hint must cover every cell they hold.
fn widen_spans(row: &mut Element, col: u32) {
    let Some(spans) = row.attr("spans") else { return };
    let Some((first, last)) = spans.split_once(':') else { return };
    let (Ok(first), Ok(last)) = (first.parse::<u32>(), last.parse::<u32>()) else {
        return;
    };
    if col < first || col > last {
        let widened = format!("{}:{}", first.min(col), last.max(col));
        row.set_attr("spans", &widened);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><dimension ref="A1:B3"/><sheetData><row r="1" spans="1:2"><c r="A1" t="s" s="1"><v>0</v></c><c r="B1" t="s" s="1"><v>1</v></c></row><row r="2" spans="1:2"><c r="A2" t="s"><v>2</v></c><c r="B2" s="2"><v>19.5</v></c></row><row r="3" spans="1:2"><c r="A3" t="s"><v>3</v></c></row></sheetData><mergeCells count="1"><mergeCell ref="B3:C3"/></mergeCells></worksheet>"#;

    fn sheet() -> Worksheet {
        Worksheet::parse(SHEET.as_bytes(), "xl/worksheets/sheet1.xml").unwrap()
    }

    #[test]
    fn test_unchanged_roundtrip() {
        let bytes = sheet().into_bytes();
        assert_eq!(String::from_utf8(bytes).unwrap(), SHEET);
    }

    #[test]
    fn test_extent_includes_merges() {
        let sheet = sheet();
        assert_eq!(sheet.max_row(), 3);
        // C3 is only covered by the merge
        assert_eq!(sheet.max_column(), 3);
        assert_eq!(sheet.merged_ranges().len(), 1);
    }

    #[test]
    fn test_cell_access() {
        let sheet = sheet();
        assert_eq!(sheet.cell_style(1, 1), 1);
        assert_eq!(sheet.cell_style(2, 1), 0);
        assert_eq!(sheet.cell_style(9, 9), 0);
        assert_eq!(sheet.cell_text(2, 2).as_deref(), Some("19.5"));
        assert!(sheet.cell(3, 2).is_none());
    }

    #[test]
    fn test_write_new_cells() {
        let mut sheet = sheet();
        sheet.set_inline_string(1, 4, "Category");
        sheet.set_number(2, 5, 0.5);
        sheet.set_style(3, 5, 7);
        sheet.widen_dimension(3, 5);

        assert_eq!(sheet.cell_text(1, 4).as_deref(), Some("Category"));
        assert_eq!(sheet.cell_text(2, 5).as_deref(), Some("0.5"));
        assert_eq!(sheet.cell_style(3, 5), 7);

        let xml = String::from_utf8(sheet.into_bytes()).unwrap();
        assert!(xml.contains(r#"<dimension ref="A1:E3"/>"#));
        assert!(xml.contains(r#"<row r="1" spans="1:4">"#));
        assert!(xml.contains(r#"<c r="D1" t="inlineStr"><is><t>Category</t></is></c>"#));
        assert!(xml.contains(r#"<c r="E2"><v>0.5</v></c>"#));
        assert!(xml.contains(r#"<c r="E3" s="7"/>"#));
        // untouched cells are unchanged
        assert!(xml.contains(r#"<c r="B2" s="2"><v>19.5</v></c>"#));
    }

    #[test]
    fn test_missing_rows_are_created_in_order() {
        let mut sheet = sheet();
        sheet.set_style(5, 1, 3);
        sheet.set_style(4, 2, 3);

        let xml = String::from_utf8(sheet.into_bytes()).unwrap();
        let r4 = xml.find(r#"<row r="4">"#).unwrap();
        let r5 = xml.find(r#"<row r="5">"#).unwrap();
        let r3 = xml.find(r#"<row r="3""#).unwrap();
        assert!(r3 < r4 && r4 < r5);
    }

    #[test]
    fn test_cells_without_references() {
        let xml = r#"<worksheet><sheetData><row><c t="inlineStr"><is><t>a</t></is></c><c><v>2</v></c></row><row><c><v>3</v></c></row></sheetData></worksheet>"#;
        let sheet = Worksheet::parse(xml.as_bytes(), "s").unwrap();
        assert_eq!(sheet.cell_text(1, 1).as_deref(), Some("a"));
        assert_eq!(sheet.cell_text(1, 2).as_deref(), Some("2"));
        assert_eq!(sheet.cell_text(2, 1).as_deref(), Some("3"));
        assert_eq!(sheet.max_column(), 2);
        assert_eq!(sheet.max_row(), 2);
    }

    #[test]
    fn test_invalid_inputs() {
        let bad_ref = r#"<worksheet><sheetData><row r="1"><c r="1A"/></row></sheetData></worksheet>"#;
        assert!(matches!(
            Worksheet::parse(bad_ref.as_bytes(), "s"),
            Err(FormatError::InvalidCellReference { .. })
        ));

        let no_data = r#"<worksheet><dimension ref="A1"/></worksheet>"#;
        assert!(matches!(
            Worksheet::parse(no_data.as_bytes(), "s"),
            Err(FormatError::Invalid { .. })
        ));
    }

    #[test]
    fn test_empty_sheet() {
        let xml = r#"<worksheet><sheetData/></worksheet>"#;
        let sheet = Worksheet::parse(xml.as_bytes(), "s").unwrap();
        assert_eq!(sheet.max_row(), 0);
        assert_eq!(sheet.max_column(), 0);
    }
}
