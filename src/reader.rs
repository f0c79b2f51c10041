//! Read the active worksheet into a [`Table`].
//!
//! Values come from calamine; the sheet choice comes from the package so the
//! reader and the writer always agree on which sheet is "active".

use crate::error::{FormatError, Result};
use crate::workbook::book::WorkbookLayout;
use crate::workbook::package::Package;
use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use furniture_categorizer_common::{CellValue, Row, Table};
use std::io::Cursor;
use std::path::Path;

/// Read a workbook file from disk.
pub fn read_file(path: &Path) -> Result<(Vec<u8>, Table)> {
    let bytes = std::fs::read(path)?;
    let table = read_table(&bytes)?;
    Ok((bytes, table))
}

/// Row 1 of the active sheet is the header row; every following row up to
/// the last used one is a data row, blank rows included.
pub fn read_table(bytes: &[u8]) -> Result<Table> {
    let package = Package::from_bytes(bytes)?;
    let layout = WorkbookLayout::locate(&package)?;
    read_sheet(bytes, &layout.active_sheet().name)
}

pub fn read_sheet(bytes: &[u8], sheet_name: &str) -> Result<Table> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| FormatError::Read(e.to_string()))?;
    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| FormatError::Read(format!("{}: {}", sheet_name, e)))?;

    let table = table_from_range(&range);
    log::debug!(
        "read {} rows x {} columns from '{}'",
        table.len(),
        table.headers.len(),
        sheet_name
    );
    Ok(table)
}

/// calamine ranges start at the first used cell; positions here are absolute
/// so that data row `i` is always sheet row `i + 2`.
fn table_from_range(range: &Range<Data>) -> Table {
    let Some((last_row, last_col)) = range.end() else {
        return Table::new(Vec::new(), Vec::new());
    };
    let width = last_col as usize + 1;

    let headers = (0..width)
        .map(|col| match range.get_value((0, col as u32)) {
            Some(Data::Empty) | None => format!("Unnamed: {}", col),
            Some(value) => value.to_string(),
        })
        .collect();

    let rows = (1..=last_row)
        .map(|row| {
            Row::new(
                (0..width)
                    .map(|col| {
                        range
                            .get_value((row, col as u32))
                            .map(cell_value)
                            .unwrap_or_default()
                    })
                    .collect(),
            )
        })
        .collect();

    Table::new(headers, rows)
}

fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}
