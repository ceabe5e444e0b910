use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Untyped table as returned by the Sheets API: a header row plus data rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetGrid {
  /// Named range the grid was read from (e.g. "f_cv")
  pub range: String,
  /// When the grid was fetched from the spreadsheet
  pub fetched_at: DateTime<Utc>,
  pub header: Vec<String>,
  pub rows: Vec<Vec<String>>,
}

impl SheetGrid {
  /// Split raw range values into header and data rows.
  ///
  /// Returns None when the range has no header row.
  pub fn from_values(range: &str, mut values: Vec<Vec<String>>) -> Option<Self> {
    if values.is_empty() {
      return None;
    }
    let header = values.remove(0).into_iter().map(|h| h.trim().to_string()).collect();

    Some(Self {
      range: range.to_string(),
      fetched_at: Utc::now(),
      header,
      rows: values,
    })
  }

  /// Position of a header column (exact match after trimming).
  pub fn column(&self, name: &str) -> Option<usize> {
    self.header.iter().position(|h| h == name.trim())
  }

  /// Cell text, empty for cells the API left out at the end of a row.
  pub fn cell(&self, row: usize, column: usize) -> &str {
    self
      .rows
      .get(row)
      .and_then(|r| r.get(column))
      .map(String::as_str)
      .unwrap_or("")
  }
}
