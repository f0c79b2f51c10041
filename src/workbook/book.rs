//! Workbook-level lookup: which worksheet is active and where the styles live.

use super::package::Package;
use super::xml::Document;
use crate::error::{FormatError, FormatResult};

const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    /// Resolved part name, e.g. `xl/worksheets/sheet1.xml`.
    pub part: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookLayout {
    pub workbook_part: String,
    pub sheets: Vec<SheetEntry>,
    /// Index into `sheets` of the sheet selected when the file was saved,
    /// or of the first worksheet when that tab holds no cell grid.
    pub active: usize,
    pub styles_part: Option<String>,
}

impl WorkbookLayout {
    pub fn locate(package: &Package) -> FormatResult<Self> {
        let workbook_part = package
            .relationships("")?
            .into_iter()
            .find(|r| !r.external && r.is_kind("officeDocument"))
            .map(|r| r.target)
            .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string());

        let doc = Document::parse(package.require_part(&workbook_part)?, &workbook_part)?;
        let root = doc
            .root()
            .ok_or_else(|| FormatError::invalid(&workbook_part, "empty workbook"))?;
        let rels = package.relationships(&workbook_part)?;

        let mut sheets = Vec::new();
        // `activeTab` counts every sheet; each tab maps to its worksheet, if any
        let mut tabs: Vec<Option<usize>> = Vec::new();
        if let Some(list) = root.child("sheets") {
            for sheet in list.children_named("sheet") {
                let name = sheet.attr_value("name").unwrap_or_default();
                let entry = match sheet.attr_local("id") {
                    None => {
                        log::warn!("sheet '{}' has no relationship id, skipped", name);
                        None
                    }
                    Some(rel_id) => match rels.iter().find(|r| r.id == rel_id) {
                        Some(rel) if rel.is_kind("worksheet") => Some(SheetEntry {
                            name,
                            part: rel.target.clone(),
                        }),
                        // chartsheets and dialog sheets have no cell grid
                        Some(rel) => {
                            log::debug!("sheet '{}' is a {}, skipped", name, rel.rel_type);
                            None
                        }
                        None => {
                            log::warn!("sheet '{}' points at missing relationship {}", name, rel_id);
                            None
                        }
                    },
                };
                tabs.push(entry.map(|entry| {
                    sheets.push(entry);
                    sheets.len() - 1
                }));
            }
        }
        if sheets.is_empty() {
            return Err(FormatError::invalid(&workbook_part, "no worksheets"));
        }

        let active_tab = root
            .child("bookViews")
            .and_then(|views| views.child("workbookView"))
            .and_then(|view| view.attr("activeTab"))
            .and_then(|tab| tab.parse::<usize>().ok())
            .unwrap_or(0);
        let active = match tabs.get(active_tab) {
            Some(Some(index)) => *index,
            Some(None) => {
                log::warn!("active tab {} is not a worksheet, using the first worksheet", active_tab);
                0
            }
            None => 0,
        };

        let styles_part = rels
            .iter()
            .find(|r| !r.external && r.is_kind("styles"))
            .map(|r| r.target.clone());

        Ok(Self {
            workbook_part,
            sheets,
            active,
            styles_part,
        })
    }

    pub fn active_sheet(&self) -> &SheetEntry {
        &self.sheets[self.active]
    }
}
