//! Format-preserving xlsx writer.
//!
//! The source package is edited in place: the active worksheet gains the
//! `Category` and `Confidence` columns, uncategorized rows get a solid fill,
//! and every other part is copied through untouched.

pub mod book;
pub mod cell_ref;
pub mod package;
pub mod sheet;
pub mod styles;
pub mod xml;

use crate::error::{FormatResult, Result, WriterError};
use book::WorkbookLayout;
use furniture_categorizer_common::{ClassificationResult, CATEGORY_HEADER, CONFIDENCE_HEADER};
use package::Package;
use serde::Serialize;
use sheet::Worksheet;
use styles::Stylesheet;

/// Light red used for uncategorized rows.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "FFCCCC";

/// Row 1 holds headers; result `i` belongs to sheet row `FIRST_DATA_ROW + i`.
pub const FIRST_DATA_ROW: u32 = 2;

/// Stylesheet target, relative to the workbook part, for workbooks without one.
const NEW_STYLES_TARGET: &str = "styles.xml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// `RRGGBB`
    pub highlight_color: String,
    /// Fail instead of truncating when results and sheet rows disagree.
    pub strict_row_count: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            strict_row_count: false,
        }
    }
}

impl WriteOptions {
    fn argb(&self) -> String {
        format!("FF{}", self.highlight_color.trim_start_matches('#').to_ascii_uppercase())
    }
}

/// Positional pairing of results with sheet data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowJoin {
    pub sheet_rows: usize,
    pub results: usize,
}

impl RowJoin {
    /// `max_row` is the sheet's last used row, header included.
    pub fn new(max_row: u32, results: usize) -> Self {
        Self {
            sheet_rows: max_row.saturating_sub(FIRST_DATA_ROW - 1) as usize,
            results,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.sheet_rows == self.results
    }

    /// Number of rows that receive a result.
    pub fn paired(&self) -> usize {
        self.sheet_rows.min(self.results)
    }

    pub fn sheet_row(index: usize) -> u32 {
        FIRST_DATA_ROW + index as u32
    }

    pub fn mismatch(&self) -> Option<WriterError> {
        (!self.is_exact()).then_some(WriterError::RowCountMismatch {
            sheet_rows: self.sheet_rows,
            results: self.results,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteReport {
    pub sheet_name: String,
    pub sheet_part: String,
    /// Last used column before the new ones were appended.
    pub original_max_column: u32,
    pub category_column: u32,
    pub confidence_column: u32,
    pub join: RowJoin,
    /// Set when results and sheet rows disagree (non-strict runs only).
    #[serde(skip)]
    pub mismatch: Option<WriterError>,
    pub rows_written: usize,
    pub rows_highlighted: usize,
}

#[derive(Debug, Clone)]
pub struct WriteOutcome {
    pub bytes: Vec<u8>,
    pub report: WriteReport,
}

/// The workbook's stylesheet, or a minimal one next to the workbook part
/// when it was saved without one.
fn open_styles(package: &Package, layout: &WorkbookLayout) -> FormatResult<Stylesheet> {
    let part = layout
        .styles_part
        .clone()
        .unwrap_or_else(|| package::resolve_target(&layout.workbook_part, NEW_STYLES_TARGET));
    match package.part(&part) {
        Some(bytes) => Stylesheet::parse(bytes, &part),
        None => {
            log::info!("workbook has no stylesheet, creating {}", part);
            Stylesheet::minimal(&part)
        }
    }
}

/// Append classification columns to the active sheet of `original`.
///
/// # Errors
/// - [`FormatError`](crate::error::FormatError) when `original` is not a readable xlsx package
/// - [`WriterError::RowCountMismatch`] in strict mode when the row counts differ
pub fn write(
    original: &[u8],
    results: &[ClassificationResult],
    options: &WriteOptions,
) -> Result<WriteOutcome> {
    let mut package = Package::from_bytes(original)?;
    let layout = WorkbookLayout::locate(&package)?;
    let entry = layout.active_sheet().clone();
    let mut sheet = Worksheet::parse(package.require_part(&entry.part)?, &entry.part)?;

    let max_col = sheet.max_column();
    let max_row = sheet.max_row();
    let category_col = max_col + 1;
    let confidence_col = max_col + 2;

    let join = RowJoin::new(max_row, results.len());
    let mismatch = join.mismatch();
    if let Some(mismatch) = &mismatch {
        if options.strict_row_count {
            return Err(mismatch.clone().into());
        }
        log::warn!(
            "sheet '{}' has {} data rows but {} results; writing {}",
            entry.name,
            join.sheet_rows,
            join.results,
            join.paired()
        );
    }

    sheet.set_inline_string(1, category_col, CATEGORY_HEADER);
    sheet.set_inline_string(1, confidence_col, CONFIDENCE_HEADER);

    let argb = options.argb();
    let mut styles: Option<Stylesheet> = None;
    let mut rows_highlighted = 0;

    for (index, result) in results.iter().take(join.paired()).enumerate() {
        let row = RowJoin::sheet_row(index);
        sheet.set_inline_string(row, category_col, result.category.as_str());
        sheet.set_number(row, confidence_col, result.confidence);

        if !result.is_uncategorized() {
            continue;
        }
        if styles.is_none() {
            styles = Some(open_styles(&package, &layout)?);
        }
        if let Some(styles) = styles.as_mut() {
            for col in 1..=confidence_col {
                let derived = styles.highlighted(sheet.cell_style(row, col), &argb)?;
                sheet.set_style(row, col, derived);
            }
        }
        rows_highlighted += 1;
    }

    sheet.widen_dimension(max_row.max(1), confidence_col);
    package.set_part(&entry.part, sheet.into_bytes());
    if let Some(styles) = styles.filter(|s| s.is_modified()) {
        let part = styles.part().to_string();
        let created = package.part(&part).is_none();
        package.set_part(&part, styles.into_bytes());
        if created {
            package.add_content_override(&part, styles::CONTENT_TYPE)?;
        }
        if layout.styles_part.is_none() {
            package.add_relationship(&layout.workbook_part, styles::RELATIONSHIP_TYPE, NEW_STYLES_TARGET)?;
        }
    }

    let report = WriteReport {
        sheet_name: entry.name,
        sheet_part: entry.part,
        original_max_column: max_col,
        category_column: category_col,
        confidence_column: confidence_col,
        join,
        mismatch,
        rows_written: join.paired(),
        rows_highlighted,
    };
    log::info!(
        "wrote {} rows to '{}' ({} highlighted)",
        report.rows_written,
        report.sheet_name,
        report.rows_highlighted
    );

    Ok(WriteOutcome {
        bytes: package.to_bytes()?,
        report,
    })
}
