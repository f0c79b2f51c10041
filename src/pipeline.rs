//! Classify a workbook and write the annotated copy in one call.

use crate::error::{CategorizerError, Result};
use crate::reader;
use crate::workbook::{self, WriteOptions, WriteReport};
use furniture_categorizer_common::{
    process, Classifier, MatchMode, ProcessedTable, Summary, Table, Taxonomy,
};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CategorizeOutcome {
    pub processed: ProcessedTable,
    /// The annotated workbook.
    pub bytes: Vec<u8>,
    pub report: WriteReport,
}

impl CategorizeOutcome {
    pub fn summary(&self, taxonomy: &Taxonomy) -> Summary {
        Summary::from_processed(&self.processed, taxonomy)
    }
}

/// Reference taxonomy, or the JSON file at `taxonomy_path`.
pub fn load_classifier(taxonomy_path: Option<&Path>, mode: MatchMode) -> Result<Classifier> {
    let taxonomy = match taxonomy_path {
        Some(path) => {
            if !path.exists() {
                return Err(CategorizerError::FileNotFound(path.display().to_string()));
            }
            log::info!("loading taxonomy from {}", path.display());
            Taxonomy::from_file(path)?
        }
        None => Taxonomy::reference(),
    };
    Ok(Classifier::new(taxonomy, mode)?)
}

/// Classify `source_field` of an already-read `table` and write the results
/// back into `original`. A missing column fails before anything is classified
/// or written.
pub fn categorize_table(
    original: &[u8],
    table: &Table,
    source_field: &str,
    classifier: &Classifier,
    options: &WriteOptions,
) -> Result<CategorizeOutcome> {
    let processed = process(table, source_field, classifier)?;
    let outcome = workbook::write(original, &processed.result_list(), options)?;
    Ok(CategorizeOutcome {
        processed,
        bytes: outcome.bytes,
        report: outcome.report,
    })
}

/// Read, classify and write in one go.
pub fn categorize_workbook(
    original: &[u8],
    source_field: &str,
    classifier: &Classifier,
    options: &WriteOptions,
) -> Result<CategorizeOutcome> {
    let table = reader::read_table(original)?;
    categorize_table(original, &table, source_field, classifier, options)
}

/// Where the annotated copy goes: an explicit file, a file name inside an
/// explicit directory, or `default_name` next to the input.
pub fn output_path_for(input: &Path, output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(default_name),
    }
}
