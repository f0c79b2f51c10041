//! Demo workbook generation.
//!
//! A small product list with the kind of formatting real inventories carry
//! (header fill, borders, currency format, a merged note) so the
//! categorizer can be tried without hunting for a file.

use crate::error::{CategorizerError, Result};
use rust_xlsxwriter::*;
use std::path::Path;

pub const SAMPLE_SHEET: &str = "Inventory";
pub const SAMPLE_COLUMN: &str = "Product Name";

/// SKU, product name, price. The names cover every reference category plus
/// items that match nothing.
const SAMPLE_ROWS: &[(&str, &str, f64)] = &[
    ("FUR-001", "Modern Outdoor Patio Chair", 189.0),
    ("FUR-002", "Velvet Sectional Sofa", 1249.99),
    ("FUR-003", "Hand-Knotted Persian Area Rug", 799.5),
    ("FUR-004", "Brass Floor Lamp", 149.0),
    ("FUR-005", "Linen Blackout Curtain Panel", 59.95),
    ("FUR-006", "Abstract Canvas Wall Art", 220.0),
    ("FUR-007", "Widget X-200", 12.0),
    ("FUR-008", "Teak Garden Bench", 329.0),
    ("FUR-009", "Gift Card", 50.0),
    ("FUR-010", "Walnut Bookshelf", 410.0),
];

pub fn sample_workbook() -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x305496))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);

    let text_format = Format::new().set_border(FormatBorder::Thin);

    let price_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format("$#,##0.00");

    let note_format = Format::new()
        .set_italic()
        .set_font_color(Color::RGB(0x7F7F7F))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SAMPLE_SHEET)
        .map_err(|e| excel_error("sheet name", e))?;

    for (col, (title, width)) in [("SKU", 12.0), (SAMPLE_COLUMN, 36.0), ("Price", 12.0), ("Notes", 24.0)]
        .iter()
        .enumerate()
    {
        worksheet
            .write_string_with_format(0, col as u16, *title, &header_format)
            .map_err(|e| excel_error("header", e))?;
        worksheet
            .set_column_width(col as u16, *width)
            .map_err(|e| excel_error("column width", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| excel_error("freeze panes", e))?;

    for (i, (sku, name, price)) in SAMPLE_ROWS.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet
            .write_string_with_format(row, 0, *sku, &text_format)
            .map_err(|e| excel_error("sku", e))?;
        worksheet
            .write_string_with_format(row, 1, *name, &text_format)
            .map_err(|e| excel_error("product name", e))?;
        worksheet
            .write_number_with_format(row, 2, *price, &price_format)
            .map_err(|e| excel_error("price", e))?;
    }

    // one note spanning rows 3-4, the rest of the column stays blank
    worksheet
        .merge_range(3, 3, 4, 3, "Ships in two boxes", &note_format)
        .map_err(|e| excel_error("merged note", e))?;

    workbook
        .save_to_buffer()
        .map_err(|e| excel_error("save", e))
}

pub fn write_sample(path: &Path) -> Result<usize> {
    let bytes = sample_workbook()?;
    std::fs::write(path, bytes)?;
    Ok(SAMPLE_ROWS.len())
}

fn excel_error(what: &str, e: XlsxError) -> CategorizerError {
    CategorizerError::ExcelGeneration(format!("{}: {}", what, e))
}
