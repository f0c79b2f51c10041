//! Interactive column picker.

use crate::error::{CategorizerError, Result};
use dialoguer::Select;

/// Header words that usually mark the item-name column.
const NAME_HINTS: &[&str] = &["product name", "item name", "name", "product", "item", "description", "title"];

/// Best guess for the item-name column: the first header matching the
/// earliest hint, compared case-insensitively.
pub fn suggest_column(headers: &[String]) -> Option<usize> {
    NAME_HINTS.iter().find_map(|hint| {
        headers
            .iter()
            .position(|h| h.trim().to_lowercase() == *hint)
            .or_else(|| headers.iter().position(|h| h.to_lowercase().contains(hint)))
    })
}

/// Ask which header holds the item names.
pub fn select_column(headers: &[String]) -> Result<String> {
    if headers.is_empty() {
        return Err(CategorizerError::Config("the sheet has no header row".into()));
    }
    let default = suggest_column(headers).unwrap_or(0);

    let index = Select::new()
        .with_prompt("Column with the item names")
        .items(headers)
        .default(default)
        .interact()
        .map_err(|e| CategorizerError::Prompt(e.to_string()))?;

    Ok(headers[index].clone())
}
