//! Typed records parsed from the CV and skills sheets.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{DashError, DashResult};
use crate::google::SheetGrid;

/// Dates in the sheets are written day first, e.g. `01.09.2019`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// One position in the work history.
#[derive(Debug, Clone, PartialEq)]
pub struct CvRecord {
  pub start: NaiveDate,
  pub end: NaiveDate,
  pub company: String,
  pub position: String,
  pub summary: String,
  pub achievements: String,
}

impl CvRecord {
  /// Days between start and end. Negative when the sheet has the dates swapped.
  pub fn tenure_days(&self) -> i64 {
    (self.end - self.start).num_days()
  }
}

/// One tool in the skills sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRecord {
  pub category: String,
  pub tool: String,
  /// Self-assessed proficiency, 0–100
  pub proficiency: f64,
  pub weight: f64,
  pub comment: String,
}

impl ToolRecord {
  pub fn weighted_score(&self) -> f64 {
    self.weight * self.proficiency
  }
}

/// Header names of the CV sheet columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CvColumns {
  pub start: String,
  pub end: String,
  pub company: String,
  pub position: String,
  pub summary: String,
  pub achievements: String,
}

impl Default for CvColumns {
  fn default() -> Self {
    Self {
      start: "начало".to_string(),
      end: "конец".to_string(),
      company: "компания".to_string(),
      position: "должность".to_string(),
      summary: "суть работы".to_string(),
      achievements: "достижения".to_string(),
    }
  }
}

/// Header names of the skills sheet columns.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolColumns {
  pub category: String,
  pub tool: String,
  pub proficiency: String,
  pub weight: String,
  pub comment: String,
}

impl Default for ToolColumns {
  fn default() -> Self {
    Self {
      category: "группа1".to_string(),
      tool: "инструмент".to_string(),
      proficiency: "Экспертиза".to_string(),
      weight: "вес".to_string(),
      comment: "комментарий".to_string(),
    }
  }
}

/// Parse a decimal that may use a comma as the decimal separator.
pub fn parse_decimal(text: &str) -> Option<f64> {
  let normalized: String = text
    .trim()
    .chars()
    .filter(|c| !c.is_whitespace())
    .map(|c| if c == ',' { '.' } else { c })
    .collect();
  if normalized.is_empty() {
    return None;
  }
  normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a `DD.MM.YYYY` date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Resolves header names to column positions and reads typed cells.
struct RowReader<'a> {
  grid: &'a SheetGrid,
}

impl<'a> RowReader<'a> {
  fn column(&self, name: &str) -> DashResult<usize> {
    self.grid.column(name).ok_or_else(|| {
      DashError::data_shape(&self.grid.range, 0, name, "column missing from header row")
    })
  }

  /// 1-based sheet row number of a data row (the header is row 1).
  fn sheet_row(row: usize) -> usize {
    row + 2
  }

  fn is_blank(&self, row: usize) -> bool {
    self.grid.rows[row].iter().all(|c| c.trim().is_empty())
  }

  fn text(&self, row: usize, column: usize) -> String {
    self.grid.cell(row, column).trim().to_string()
  }

  fn required(&self, row: usize, column: usize, name: &str) -> DashResult<String> {
    let text = self.text(row, column);
    if text.is_empty() {
      return Err(DashError::data_shape(
        &self.grid.range,
        Self::sheet_row(row),
        name,
        "value is missing",
      ));
    }
    Ok(text)
  }

  fn date(&self, row: usize, column: usize, name: &str) -> DashResult<NaiveDate> {
    let text = self.grid.cell(row, column);
    parse_date(text).ok_or_else(|| {
      DashError::data_shape(
        &self.grid.range,
        Self::sheet_row(row),
        name,
        format!("expected a DD.MM.YYYY date, got '{}'", text),
      )
    })
  }

  fn decimal(&self, row: usize, column: usize, name: &str) -> DashResult<f64> {
    let text = self.grid.cell(row, column);
    parse_decimal(text).ok_or_else(|| {
      DashError::data_shape(
        &self.grid.range,
        Self::sheet_row(row),
        name,
        format!("expected a number, got '{}'", text),
      )
    })
  }
}

/// Coerce the CV sheet into records, in sheet order.
///
/// Fully blank rows are skipped; any other malformed row fails the whole table.
pub fn parse_cv(grid: &SheetGrid, columns: &CvColumns) -> DashResult<Vec<CvRecord>> {
  let reader = RowReader { grid };
  let start = reader.column(&columns.start)?;
  let end = reader.column(&columns.end)?;
  let company = reader.column(&columns.company)?;
  let position = reader.column(&columns.position)?;
  let summary = reader.column(&columns.summary)?;
  let achievements = reader.column(&columns.achievements)?;

  (0..grid.rows.len())
    .filter(|&row| !reader.is_blank(row))
    .map(|row| {
      Ok(CvRecord {
        start: reader.date(row, start, &columns.start)?,
        end: reader.date(row, end, &columns.end)?,
        company: reader.text(row, company),
        position: reader.text(row, position),
        summary: reader.text(row, summary),
        achievements: reader.text(row, achievements),
      })
    })
    .collect()
}

/// Coerce the skills sheet into records, in sheet order.
pub fn parse_tools(grid: &SheetGrid, columns: &ToolColumns) -> DashResult<Vec<ToolRecord>> {
  let reader = RowReader { grid };
  let category = reader.column(&columns.category)?;
  let tool = reader.column(&columns.tool)?;
  let proficiency = reader.column(&columns.proficiency)?;
  let weight = reader.column(&columns.weight)?;
  let comment = reader.column(&columns.comment)?;

  (0..grid.rows.len())
    .filter(|&row| !reader.is_blank(row))
    .map(|row| {
      Ok(ToolRecord {
        category: reader.required(row, category, &columns.category)?,
        tool: reader.required(row, tool, &columns.tool)?,
        proficiency: reader.decimal(row, proficiency, &columns.proficiency)?,
        weight: reader.decimal(row, weight, &columns.weight)?,
        comment: reader.text(row, comment),
      })
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grid(range: &str, rows: &[&[&str]]) -> SheetGrid {
    let values = rows
      .iter()
      .map(|r| r.iter().map(|c| c.to_string()).collect())
      .collect();
    SheetGrid::from_values(range, values).unwrap()
  }

  const TOOLS_HEADER: &[&str] = &["группа1", "инструмент", "Экспертиза", "вес", "комментарий"];
  const CV_HEADER: &[&str] = &[
    "начало",
    "конец",
    "компания",
    "должность",
    "суть работы",
    "достижения",
  ];

  #[test]
  fn test_parse_decimal_with_comma_separator() {
    assert_eq!(parse_decimal("12,5"), Some(12.5));
    assert_eq!(parse_decimal(" 3.25 "), Some(3.25));
    assert_eq!(parse_decimal("80"), Some(80.0));
    assert_eq!(parse_decimal("1 000,5"), Some(1000.5));
  }

  #[test]
  fn test_parse_decimal_rejects_text() {
    assert_eq!(parse_decimal(""), None);
    assert_eq!(parse_decimal("abc"), None);
    assert_eq!(parse_decimal("NaN"), None);
  }

  #[test]
  fn test_parse_date_day_first() {
    assert_eq!(
      parse_date("01.09.2019"),
      NaiveDate::from_ymd_opt(2019, 9, 1)
    );
    assert_eq!(parse_date("2019-09-01"), None);
    assert_eq!(parse_date("31.02.2019"), None);
  }

  #[test]
  fn test_parse_tools() {
    let grid = grid(
      "f_tools",
      &[
        TOOLS_HEADER,
        &["BI", "Power BI", "90", "12,5", "DAX, M"],
        &["", "", "", "", ""],
        &["SQL", "PostgreSQL", "70", "1"],
      ],
    );

    let tools = parse_tools(&grid, &ToolColumns::default()).unwrap();

    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].weight, 12.5);
    assert_eq!(tools[0].weighted_score(), 1125.0);
    assert_eq!(tools[1].comment, "");
  }

  #[test]
  fn test_non_numeric_weight_is_data_shape_error() {
    let grid = grid("f_tools", &[TOOLS_HEADER, &["BI", "Power BI", "90", "heavy", ""]]);

    let err = parse_tools(&grid, &ToolColumns::default()).unwrap_err();
    match err {
      DashError::DataShape { row, column, .. } => {
        assert_eq!(row, 2);
        assert_eq!(column, "вес");
      }
      other => panic!("expected data shape error, got {:?}", other),
    }
  }

  #[test]
  fn test_missing_category_is_data_shape_error() {
    let grid = grid("f_tools", &[TOOLS_HEADER, &["", "Excel", "60", "1", ""]]);

    let err = parse_tools(&grid, &ToolColumns::default()).unwrap_err();
    assert!(matches!(err, DashError::DataShape { ref column, .. } if column == "группа1"));
  }

  #[test]
  fn test_missing_column_is_reported() {
    let grid = grid("f_tools", &[&["группа1", "инструмент"], &["BI", "Power BI"]]);

    let err = parse_tools(&grid, &ToolColumns::default()).unwrap_err();
    assert!(err.to_string().contains("column missing from header row"));
  }

  #[test]
  fn test_parse_cv_and_tenure() {
    let grid = grid(
      "f_cv",
      &[
        CV_HEADER,
        &["01.02.2020", "07.03.2021", "ACME", "Analyst", "Reports", "Saved 2h/day"],
      ],
    );

    let cv = parse_cv(&grid, &CvColumns::default()).unwrap();

    assert_eq!(cv.len(), 1);
    assert_eq!(cv[0].company, "ACME");
    assert_eq!(cv[0].tenure_days(), 400);
  }

  #[test]
  fn test_bad_cv_date_names_the_row() {
    let grid = grid(
      "f_cv",
      &[
        CV_HEADER,
        &["01.02.2020", "07.03.2021", "ACME", "Analyst", "", ""],
        &["2020/01/01", "07.03.2021", "Initech", "Analyst", "", ""],
      ],
    );

    let err = parse_cv(&grid, &CvColumns::default()).unwrap_err();
    assert_eq!(
      err.to_string(),
      "f_cv, row 3, column 'начало': expected a DD.MM.YYYY date, got '2020/01/01'"
    );
  }

  #[test]
  fn test_custom_column_names() {
    let grid = grid(
      "skills",
      &[
        &["group", "tool", "level", "weight", "note"],
        &["BI", "Tableau", "55", "0,5", ""],
      ],
    );
    let columns = ToolColumns {
      category: "group".into(),
      tool: "tool".into(),
      proficiency: "level".into(),
      weight: "weight".into(),
      comment: "note".into(),
    };

    let tools = parse_tools(&grid, &columns).unwrap();
    assert_eq!(tools[0].weight, 0.5);
  }
}
