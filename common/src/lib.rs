//! Furniture Categorizer Common Library
//!
//! Taxonomy, keyword classifier and batch processing. Nothing in this crate
//! touches spreadsheet files; the application crate reads and writes those.

pub mod error;
pub mod taxonomy;
pub mod table;
pub mod classifier;
pub mod batch;
pub mod summary;

pub use error::{Error, Result};
pub use taxonomy::{Category, Taxonomy, UNCATEGORIZED};
pub use table::{CellValue, Row, Table};
pub use classifier::{
    CategoryLabel, ClassificationResult, Classifier, Explanation, MatchKind, MatchMode,
    TriggerMatch,
};
pub use batch::{process, ProcessedRow, ProcessedTable, CATEGORY_HEADER, CONFIDENCE_HEADER};
pub use summary::{CategoryCount, Summary};
