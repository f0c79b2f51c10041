//! Error types
//!
//! Errors raised by the taxonomy, classifier and batch processor.

use thiserror::Error;

/// Shared error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The column selected for classification is not among the table headers.
    #[error("Column not found: '{column}' (available: {available})")]
    MissingColumn { column: String, available: String },

    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("Invalid trigger pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl Error {
    pub fn missing_column(column: &str, headers: &[String]) -> Self {
        Error::MissingColumn {
            column: column.to_string(),
            available: headers.join(", "),
        }
    }

    /// Configuration errors are raised before any row is processed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::MissingColumn { .. } | Error::InvalidTaxonomy(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_missing_column() {
        let headers = vec!["Item".to_string(), "Qty".to_string()];
        let error = Error::missing_column("Product", &headers);
        assert_eq!(
            format!("{}", error),
            "Column not found: 'Product' (available: Item, Qty)"
        );
        assert!(error.is_configuration());
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
        assert!(!error.is_configuration());
    }

    #[test]
    fn test_error_debug() {
        let error = Error::InvalidTaxonomy("empty".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("InvalidTaxonomy"));
        assert!(debug.contains("empty"));
    }
}
