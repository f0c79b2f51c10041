//! Tabular rows read from a spreadsheet.

use serde::{Serialize, Serializer};

/// Value of one cell as seen by the batch processor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text form used for classification; `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// One data row; values line up with [`Table::headers`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Row {
    pub values: Vec<CellValue>,
}

impl Row {
    pub fn new(values: Vec<CellValue>) -> Self {
        Self { values }
    }

    /// Value at a column index; short rows read as empty.
    pub fn get(&self, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.values.get(column).unwrap_or(EMPTY)
    }
}

/// Header row plus data rows, in sheet order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Index of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text() {
        assert_eq!(CellValue::Empty.as_text(), None);
        assert_eq!(CellValue::from("Sofa").as_text(), Some("Sofa".to_string()));
        assert_eq!(CellValue::Number(12.0).as_text(), Some("12".to_string()));
        assert_eq!(CellValue::Number(0.5).as_text(), Some("0.5".to_string()));
        assert_eq!(CellValue::Bool(true).as_text(), Some("TRUE".to_string()));
    }

    #[test]
    fn test_row_get_short_row() {
        let row = Row::new(vec![CellValue::from("a")]);
        assert_eq!(row.get(0), &CellValue::from("a"));
        assert_eq!(row.get(5), &CellValue::Empty);
    }

    #[test]
    fn test_column_index_first_match() {
        let table = Table::new(
            vec!["Name".into(), "Qty".into(), "Name".into()],
            Vec::new(),
        );
        assert_eq!(table.column_index("Name"), Some(0));
        assert_eq!(table.column_index("Qty"), Some(1));
        assert_eq!(table.column_index("name"), None);
    }

    #[test]
    fn test_serialize_row() {
        let row = Row::new(vec![
            CellValue::from("Lamp"),
            CellValue::Number(2.0),
            CellValue::Empty,
        ]);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"values":["Lamp",2.0,null]}"#);
    }
}
