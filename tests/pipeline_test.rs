//! End-to-end categorization tests
//!
//! Read → classify → write on the demo workbook, saved to a temp dir and read
//! back from disk.

use calamine::{open_workbook, Data, Reader, Xlsx};
use furniture_categorizer::common::{CategoryLabel, Classifier, Error, MatchMode, Taxonomy};
use furniture_categorizer::config::Config;
use furniture_categorizer::error::CategorizerError;
use furniture_categorizer::pipeline::{self, categorize_workbook};
use furniture_categorizer::reader;
use furniture_categorizer::sample::{sample_workbook, write_sample, SAMPLE_COLUMN, SAMPLE_SHEET};
use furniture_categorizer::workbook::book::WorkbookLayout;
use furniture_categorizer::workbook::package::Package;
use furniture_categorizer::workbook::sheet::Worksheet;
use furniture_categorizer::workbook::styles::Stylesheet;
use furniture_categorizer::workbook::WriteOptions;
use tempfile::tempdir;

fn classifier() -> Classifier {
    Classifier::new(Taxonomy::reference(), MatchMode::default()).unwrap()
}

/// Sheet row (1-based) holding `name` in the item column.
fn row_of(table: &furniture_categorizer::common::Table, name: &str) -> u32 {
    let col = table.column_index(SAMPLE_COLUMN).unwrap();
    let index = table
        .rows
        .iter()
        .position(|r| r.get(col).as_text().as_deref() == Some(name))
        .unwrap();
    index as u32 + 2
}

/// The two reference cases, read back from a saved file.
#[test]
fn test_end_to_end_on_disk() {
    let dir = tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("inventory.xlsx");
    write_sample(&input).unwrap();

    let (original, table) = reader::read_file(&input).unwrap();
    let outcome = pipeline::categorize_table(
        &original,
        &table,
        SAMPLE_COLUMN,
        &classifier(),
        &WriteOptions::default(),
    )
    .unwrap();

    let output = pipeline::output_path_for(&input, None, &Config::default().output_file_name);
    std::fs::write(&output, &outcome.bytes).unwrap();
    assert_eq!(output.file_name().unwrap(), "categorized_furniture.xlsx");

    let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
    let range = workbook.worksheet_range(SAMPLE_SHEET).unwrap();

    // four original columns, then Category (E) and Confidence (F)
    assert_eq!(range.get_value((0, 4)), Some(&Data::String("Category".into())));
    assert_eq!(range.get_value((0, 5)), Some(&Data::String("Confidence".into())));

    let chair = row_of(&table, "Modern Outdoor Patio Chair") - 1;
    assert_eq!(range.get_value((chair, 4)), Some(&Data::String("Outdoor Furniture".into())));
    assert_eq!(range.get_value((chair, 5)), Some(&Data::Float(1.0)));

    let widget = row_of(&table, "Widget X-200") - 1;
    assert_eq!(range.get_value((widget, 4)), Some(&Data::String("Uncategorized".into())));
    assert_eq!(range.get_value((widget, 5)), Some(&Data::Float(0.0)));
}

/// The uncategorized row is filled across every column, including the new ones.
#[test]
fn test_widget_row_highlighted() {
    let original = sample_workbook().unwrap();
    let outcome = categorize_workbook(&original, SAMPLE_COLUMN, &classifier(), &WriteOptions::default()).unwrap();
    let table = reader::read_table(&original).unwrap();

    let package = Package::from_bytes(&outcome.bytes).unwrap();
    let layout = WorkbookLayout::locate(&package).unwrap();
    let sheet_part = &layout.active_sheet().part;
    let sheet = Worksheet::parse(package.part(sheet_part).unwrap(), sheet_part).unwrap();
    let styles_part = layout.styles_part.clone().unwrap();
    let styles = Stylesheet::parse(package.part(&styles_part).unwrap(), &styles_part).unwrap();

    let widget = row_of(&table, "Widget X-200");
    for col in 1..=6 {
        let format = styles.cell_format(sheet.cell_style(widget, col)).unwrap();
        assert_eq!(styles.fill_rgb(format.fill_id).as_deref(), Some("FFFFCCCC"));
    }

    let chair = row_of(&table, "Modern Outdoor Patio Chair");
    let format = styles.cell_format(sheet.cell_style(chair, 1)).unwrap();
    assert_ne!(styles.fill_rgb(format.fill_id).as_deref(), Some("FFFFCCCC"));
}

#[test]
fn test_processed_rows_and_summary() {
    let original = sample_workbook().unwrap();
    let classifier = classifier();
    let outcome = categorize_workbook(&original, SAMPLE_COLUMN, &classifier, &WriteOptions::default()).unwrap();

    assert_eq!(outcome.processed.len(), 10);
    assert_eq!(outcome.report.rows_written, 10);
    assert!(outcome.report.mismatch.is_none());
    // Widget X-200 and Gift Card
    assert_eq!(outcome.report.rows_highlighted, 2);

    let summary = outcome.summary(classifier.taxonomy());
    assert_eq!(summary.total, 10);
    assert_eq!(summary.uncategorized, 2);
    assert_eq!(summary.categorized, 8);

    // source rows come through unchanged
    let table = reader::read_table(&original).unwrap();
    for (row, processed) in table.rows.iter().zip(&outcome.processed.rows) {
        assert_eq!(row, &processed.row);
    }
    assert_eq!(
        outcome.processed.rows[0].result.category,
        CategoryLabel::Named("Outdoor Furniture".into())
    );
}

#[test]
fn test_json_preview() {
    let original = sample_workbook().unwrap();
    let outcome = categorize_workbook(&original, SAMPLE_COLUMN, &classifier(), &WriteOptions::default()).unwrap();

    let json = serde_json::to_value(&outcome.processed).unwrap();
    assert_eq!(json["source_field"], SAMPLE_COLUMN);
    assert_eq!(json["rows"][0]["category"], "Outdoor Furniture");
    assert_eq!(json["rows"][0]["confidence"], 1.0);
    assert_eq!(json["rows"][6]["category"], "Uncategorized");
}

/// A missing column fails before anything is written.
#[test]
fn test_missing_column() {
    let original = sample_workbook().unwrap();
    let err = categorize_workbook(&original, "Description", &classifier(), &WriteOptions::default()).unwrap_err();

    match err {
        CategorizerError::Common(inner) => {
            assert!(matches!(inner, Error::MissingColumn { .. }));
            assert!(inner.is_configuration());
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_idempotent() {
    let original = sample_workbook().unwrap();
    let classifier = classifier();
    let first = categorize_workbook(&original, SAMPLE_COLUMN, &classifier, &WriteOptions::default()).unwrap();
    let second = categorize_workbook(&original, SAMPLE_COLUMN, &classifier, &WriteOptions::default()).unwrap();

    assert_eq!(first.processed, second.processed);
    let sheet = |bytes: &[u8]| {
        let package = Package::from_bytes(bytes).unwrap();
        package.part("xl/worksheets/sheet1.xml").unwrap().to_vec()
    };
    assert_eq!(sheet(&first.bytes), sheet(&second.bytes));
}

#[test]
fn test_custom_taxonomy_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("taxonomy.json");
    std::fs::write(
        &path,
        r#"[{"name": "Gadgets", "triggers": ["widget"]}, {"name": "Seating", "triggers": ["chair", "sofa", "bench"]}]"#,
    )
    .unwrap();

    let classifier = pipeline::load_classifier(Some(path.as_path()), MatchMode::default()).unwrap();
    let original = sample_workbook().unwrap();
    let outcome = categorize_workbook(&original, SAMPLE_COLUMN, &classifier, &WriteOptions::default()).unwrap();

    let labels: Vec<&str> = outcome
        .processed
        .results()
        .map(|r| r.category.as_str())
        .collect();
    assert_eq!(labels[0], "Seating");
    assert_eq!(labels[6], "Gadgets");
    assert_eq!(labels[3], "Uncategorized");
}
