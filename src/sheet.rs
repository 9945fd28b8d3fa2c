//! Tabular store abstraction
//!
//! A sheet is a grid of [`CellValue`]s whose first row is the header. Rows and
//! columns are 1-indexed at this boundary, the same way spreadsheet ranges are.

use crate::error::Result;
use serde_json::Value;
use std::fmt;

/// Value of a single cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value as returned by the Sheets values API
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
            Value::String(s) if s.is_empty() => CellValue::Empty,
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Convert to the JSON form the Sheets values API accepts with
    /// `valueInputOption=USER_ENTERED`
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Empty => Value::String(String::new()),
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(String::new())),
            CellValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// The data range of a sheet: header row plus body rows
///
/// Body rows are padded to the header width by the stores that produce them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Split a raw grid into header and body
    pub fn from_grid(mut grid: Vec<Vec<CellValue>>) -> Self {
        if grid.is_empty() {
            return Table::default();
        }
        let header = grid
            .remove(0)
            .into_iter()
            .map(|c| c.to_string())
            .collect();
        Table { header, rows: grid }
    }

    /// Header plus body as one grid, header first
    pub fn to_grid(&self) -> Vec<Vec<CellValue>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        if !self.header.is_empty() {
            grid.push(self.header.iter().map(|h| CellValue::text(h.as_str())).collect());
        }
        grid.extend(self.rows.iter().cloned());
        grid
    }

    /// Number of the last row holding data (header counts as row 1)
    pub fn last_row(&self) -> usize {
        if self.header.is_empty() && self.rows.is_empty() {
            0
        } else {
            self.rows.len() + 1
        }
    }

    pub fn last_column(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }
}

/// A rectangular block of cells, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub row: usize,
    pub column: usize,
    pub rows: usize,
    pub columns: usize,
}

impl CellRange {
    pub fn new(row: usize, column: usize, rows: usize, columns: usize) -> Self {
        Self {
            row,
            column,
            rows,
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.columns == 0
    }

    pub fn last_row(&self) -> usize {
        self.row + self.rows.saturating_sub(1)
    }

    pub fn last_column(&self) -> usize {
        self.column + self.columns.saturating_sub(1)
    }
}

/// Spreadsheet operations the sweeps need
pub trait TabularStore {
    /// Read the whole data range of a sheet
    fn read_all(&self, sheet: &str) -> Result<Table>;

    /// Clear cell contents inside a range, leaving formatting alone
    fn clear_range(&mut self, sheet: &str, range: CellRange) -> Result<()>;

    /// Write a block of values with its top-left corner at (row, column)
    fn write_range(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<()>;

    /// Append a row after the last row holding data
    fn append_row(&mut self, sheet: &str, values: &[CellValue]) -> Result<()>;

    /// Clear every cell's contents
    fn clear_all(&mut self, sheet: &str) -> Result<()>;

    /// Delete a row, shifting the rows below it up by one
    fn delete_row(&mut self, sheet: &str, row: usize) -> Result<()>;

    /// Turn a range into checkbox inputs with the flag column styling
    fn apply_checkboxes(&mut self, sheet: &str, range: CellRange) -> Result<()>;
}

/// Pad every row to the width of the widest one
pub fn rectangular(values: &[Vec<CellValue>]) -> Vec<Vec<CellValue>> {
    let width = values.iter().map(|r| r.len()).max().unwrap_or(0);
    values
        .iter()
        .map(|r| {
            let mut row = r.clone();
            row.resize(width, CellValue::Empty);
            row
        })
        .collect()
}

/// `=HYPERLINK("url", "label")` with embedded quotes doubled
pub fn hyperlink_formula(url: &str, label: &str) -> String {
    format!(
        "=HYPERLINK(\"{}\", \"{}\")",
        url.replace('"', "\"\""),
        label.replace('"', "\"\"")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_from_grid() {
        let table = Table::from_grid(vec![
            vec!["RemoveMe".into(), "Id".into()],
            vec![CellValue::Bool(true), "abc".into()],
        ]);
        assert_eq!(table.header, vec!["RemoveMe", "Id"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.last_row(), 2);
        assert_eq!(table.last_column(), 2);
    }

    #[test]
    fn test_empty_table() {
        let table = Table::from_grid(Vec::new());
        assert_eq!(table.last_row(), 0);
        assert!(table.to_grid().is_empty());
    }

    #[test]
    fn test_cell_json_conversion() {
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from_json(&json!("")), CellValue::Empty);
        assert_eq!(CellValue::from_json(&json!(1.5)), CellValue::Number(1.5));
        assert_eq!(CellValue::from_json(&json!("ReMoVeD")), CellValue::text("ReMoVeD"));
        assert_eq!(CellValue::Empty.to_json(), json!(""));
        assert_eq!(CellValue::Bool(false).to_json(), json!(false));
    }

    #[test]
    fn test_hyperlink_formula_escapes_quotes() {
        assert_eq!(
            hyperlink_formula("https://x/\"a\"", "View"),
            "=HYPERLINK(\"https://x/\"\"a\"\"\", \"View\")"
        );
    }

    #[test]
    fn test_rectangular_pads_rows() {
        let grid = rectangular(&[vec!["a".into()], vec!["b".into(), "c".into()]]);
        assert_eq!(grid[0], vec![CellValue::text("a"), CellValue::Empty]);
        assert_eq!(grid[1].len(), 2);
    }
}
