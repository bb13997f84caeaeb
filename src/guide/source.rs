//! Reading a style guide into header-less rows of cells.
//!
//! Workbooks (xlsx, xlsm, xlsb, xls, ods) go through `calamine`; a `.json` file holding an
//! array of arrays is accepted as well, which is handy for fixtures and generated guides.

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::{AuditError, Result};

/// A single spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// The cell as displayed text. Whole numbers print without a fraction (`32`, not `32.0`).
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Trimmed text, or `None` when the cell is blank.
    pub fn trimmed(&self) -> Option<String> {
        let text = self.text();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::Bool(b) => Cell::Bool(*b),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Reads the first sheet of the style guide as rows of cells.
///
/// Column indexes are absolute: a sheet whose used range starts at column C still has
/// its first data cell at index 2.
pub fn read_rows(path: &Path) -> Result<Vec<Vec<Cell>>> {
    if !path.exists() {
        return Err(AuditError::Config(format!(
            "Style guide file not found: {}",
            path.display()
        )));
    }

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        let raw = fs::read_to_string(path)?;
        let rows: Vec<Vec<Cell>> = serde_json::from_str(&raw)?;
        return Ok(rows);
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Ok(Vec::new()),
    };
    let column_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    Ok(range
        .rows()
        .map(|row| {
            std::iter::repeat(Cell::Empty)
                .take(column_offset)
                .chain(row.iter().map(Cell::from))
                .collect()
        })
        .collect())
}
