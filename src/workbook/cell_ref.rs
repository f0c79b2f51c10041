//! A1-style references. Rows and columns are 1-based throughout.

use lazy_static::lazy_static;
use regex::Regex;

/// Last column Excel accepts (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;
pub const MAX_ROW: u32 = 1_048_576;

lazy_static! {
    static ref CELL_RE: Regex = Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]{1,7})$").unwrap();
}

/// Rectangular block, corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl CellRange {
    pub fn to_reference(self) -> String {
        let first = cell_name(self.first_row, self.first_col);
        if self.first_row == self.last_row && self.first_col == self.last_col {
            first
        } else {
            format!("{}:{}", first, cell_name(self.last_row, self.last_col))
        }
    }
}

/// 1 → `A`, 27 → `AA`.
pub fn column_letters(col: u32) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    letters.iter().rev().collect()
}

pub fn column_number(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut n: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    (n <= MAX_COLUMN).then_some(n)
}

pub fn cell_name(row: u32, col: u32) -> String {
    format!("{}{}", column_letters(col), row)
}

/// `"B12"` → `(12, 2)`. Absolute markers (`$B$12`) are accepted.
pub fn parse_cell(reference: &str) -> Option<(u32, u32)> {
    let caps = CELL_RE.captures(reference.trim())?;
    let col = column_number(&caps[1])?;
    let row: u32 = caps[2].parse().ok()?;
    (1..=MAX_ROW).contains(&row).then_some((row, col))
}

/// `"A1:C3"` or a single cell.
pub fn parse_range(reference: &str) -> Option<CellRange> {
    let (first, last) = match reference.split_once(':') {
        Some((a, b)) => (parse_cell(a)?, parse_cell(b)?),
        None => {
            let cell = parse_cell(reference)?;
            (cell, cell)
        }
    };
    Some(CellRange {
        first_row: first.0.min(last.0),
        first_col: first.1.min(last.1),
        last_row: first.0.max(last.0),
        last_col: first.1.max(last.1),
    })
}
