//! Furniture Categorizer
//!
//! Reads an inventory workbook, assigns each item a furniture category by
//! keyword scoring and writes back a copy of the workbook with `Category` and
//! `Confidence` columns, keeping the original formatting.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod reader;
pub mod sample;
pub mod workbook;

pub use furniture_categorizer_common as common;
