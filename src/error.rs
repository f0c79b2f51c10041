use thiserror::Error;

#[derive(Error, Debug)]
pub enum CategorizerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error(transparent)]
    Common(#[from] furniture_categorizer_common::Error),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Writer(#[from] WriterError),

    #[error("Excel generation error: {0}")]
    ExcelGeneration(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The source workbook could not be parsed (or re-serialised) as an xlsx package.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("not a readable xlsx package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error while reading package: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("missing workbook part: {0}")]
    MissingPart(String),

    #[error("invalid cell reference '{reference}' in {part}")]
    InvalidCellReference { part: String, reference: String },

    #[error("invalid {part}: {message}")]
    Invalid { part: String, message: String },

    #[error("could not read sheet values: {0}")]
    Read(String),
}

impl FormatError {
    pub(crate) fn xml(part: &str, message: impl std::fmt::Display) -> Self {
        FormatError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn invalid(part: &str, message: impl Into<String>) -> Self {
        FormatError::Invalid {
            part: part.to_string(),
            message: message.into(),
        }
    }
}

/// Processed rows do not line up with the sheet being written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriterError {
    #[error("row count mismatch: sheet has {sheet_rows} data rows but {results} results were supplied")]
    RowCountMismatch { sheet_rows: usize, results: usize },
}

pub type Result<T> = std::result::Result<T, CategorizerError>;

pub type FormatResult<T> = std::result::Result<T, FormatError>;
