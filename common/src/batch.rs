//! Batch processing
//!
//! Applies the classifier to one column of every row. Rows are independent, so
//! they are classified on the rayon pool and collected back in input order.

use crate::classifier::{ClassificationResult, Classifier};
use crate::error::{Error, Result};
use crate::table::{CellValue, Row, Table};
use rayon::prelude::*;
use serde::Serialize;

pub const CATEGORY_HEADER: &str = "Category";
pub const CONFIDENCE_HEADER: &str = "Confidence";

/// Original row plus its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedRow {
    pub row: Row,
    #[serde(flatten)]
    pub result: ClassificationResult,
}

/// Output of [`process`]: the source rows, unchanged and in order, each with a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedTable {
    pub headers: Vec<String>,
    pub source_field: String,
    pub rows: Vec<ProcessedRow>,
}

impl ProcessedTable {
    pub fn results(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.rows.iter().map(|r| &r.result)
    }

    /// Results in row order, the form consumed by the workbook writer.
    pub fn result_list(&self) -> Vec<ClassificationResult> {
        self.results().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flatten into a table with `Category` and `Confidence` appended.
    pub fn to_table(&self) -> Table {
        let mut headers = self.headers.clone();
        headers.push(CATEGORY_HEADER.to_string());
        headers.push(CONFIDENCE_HEADER.to_string());

        let rows = self
            .rows
            .iter()
            .map(|processed| {
                let mut values = processed.row.values.clone();
                values.resize(self.headers.len().max(values.len()), CellValue::Empty);
                values.push(CellValue::Text(processed.result.category.to_string()));
                values.push(CellValue::Number(processed.result.confidence));
                Row::new(values)
            })
            .collect();

        Table::new(headers, rows)
    }
}

/// Classify `source_field` of every row.
///
/// # Errors
/// [`Error::MissingColumn`] when the field is not a header; no row is classified.
pub fn process(table: &Table, source_field: &str, classifier: &Classifier) -> Result<ProcessedTable> {
    let column = table
        .column_index(source_field)
        .ok_or_else(|| Error::missing_column(source_field, &table.headers))?;

    let rows: Vec<ProcessedRow> = table
        .rows
        .par_iter()
        .map(|row| ProcessedRow {
            row: row.clone(),
            result: classifier.classify_value(row.get(column)),
        })
        .collect();

    log::info!(
        "classified {} rows using column '{}' (#{})",
        rows.len(),
        source_field,
        column + 1
    );

    Ok(ProcessedTable {
        headers: table.headers.clone(),
        source_field: source_field.to_string(),
        rows,
    })
}
