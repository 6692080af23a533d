//! Cell values, tolerant parsing, and the immutable [`Table`] input model.
//!
//! A [`Table`] is an ordered sequence of named columns of equal length. It is
//! the only input the analysis pipeline accepts and is never mutated in
//! place; components that need a derived view (sorted, coerced, bucketed)
//! build their own working copy and discard it.

use std::borrow::Cow;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::pipeline::AnalysisError;

/// A single non-null cell value. Result sets coming back from ad-hoc SQL
/// carry no declared types, so everything is either a number or text; nulls
/// are modeled as `Option<Value>` at the cell level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the cell. Text cells are coerced when they parse
    /// cleanly as a float; coercion failure yields `None`, never an error.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Raw textual view of the cell, as it would appear in a rendered table.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Number(n) => Cow::Owned(format_number(*n)),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// A nullable cell.
pub type Cell = Option<Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// Ordered, named, equal-length columns. Construction validates shape once;
/// after that the table is read-only for the lifetime of an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table from `(name, cells)` pairs, rejecting ragged input.
    pub fn from_columns(columns: Vec<(String, Vec<Cell>)>) -> Result<Self, AnalysisError> {
        if columns.is_empty() {
            return Err(AnalysisError::NoColumns);
        }
        let row_count = columns[0].1.len();
        for (name, cells) in &columns {
            if cells.len() != row_count {
                return Err(AnalysisError::RaggedColumns {
                    column: name.clone(),
                    expected: row_count,
                    actual: cells.len(),
                });
            }
        }
        Ok(Self {
            columns: columns
                .into_iter()
                .map(|(name, cells)| Column { name, cells })
                .collect(),
        })
    }

    /// Reads a CSV file into a table. Empty fields become null cells; fields
    /// that parse as floats become numbers; everything else stays text.
    pub fn from_csv_path(path: &Path, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_path(path)
            .with_context(|| format!("Opening {path:?}"))?;
        let headers = reader
            .headers()
            .with_context(|| format!("Reading headers from {path:?}"))?
            .clone();
        let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
        for (row_idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            for (col_idx, column) in cells.iter_mut().enumerate() {
                column.push(parse_cell(record.get(col_idx).unwrap_or("")));
            }
        }
        let columns = headers
            .iter()
            .map(str::to_string)
            .zip(cells)
            .collect::<Vec<_>>();
        Ok(Table::from_columns(columns)?)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Total cell count (rows × columns).
    pub fn cell_count(&self) -> usize {
        self.row_count() * self.column_count()
    }

    /// Count of null cells across the whole table.
    pub fn null_count(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.cells.iter().filter(|cell| cell.is_none()).count())
            .sum()
    }

    /// Fraction of null cells in [0,1]; 0 for a degenerate empty table.
    pub fn missing_ratio(&self) -> f64 {
        let total = self.cell_count();
        if total == 0 {
            return 0.0;
        }
        self.null_count() as f64 / total as f64
    }
}

impl Column {
    /// Non-null cells in row order.
    pub fn present(&self) -> impl Iterator<Item = &Value> {
        self.cells.iter().flatten()
    }

    /// Non-null numeric view of the column; cells that fail coercion are
    /// dropped rather than reported.
    pub fn numbers(&self) -> Vec<f64> {
        self.present().filter_map(Value::as_number).collect()
    }

    pub fn null_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    /// Count of distinct non-null display values.
    pub fn distinct_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        for value in self.present() {
            seen.insert(value.as_text().into_owned());
        }
        seen.len()
    }
}

fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return Some(Value::Number(number));
    }
    Some(Value::Text(trimmed.to_string()))
}

/// Parses a raw value as a full calendar date or timestamp using a tolerant
/// multi-format chain. Month-only period labels are rejected here; see
/// [`parse_flexible_date`] for the padded variant.
pub fn parse_date_strict(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

/// [`parse_date_strict`] plus a compatibility fallback for month-only period
/// labels such as `2024-01`: a synthetic first-of-month day is appended
/// before parsing, matching how aggregation queries label periods.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    if let Some(parsed) = parse_date_strict(value) {
        return Some(parsed);
    }
    let trimmed = value.trim();
    if trimmed.len() == 7 && trimmed.as_bytes().get(4) == Some(&b'-') {
        let padded = format!("{trimmed}-01");
        if let Ok(parsed) = NaiveDate::parse_from_str(&padded, "%Y-%m-%d") {
            return Some(parsed);
        }
    }
    None
}

/// Date view of a cell; numbers never qualify as dates.
pub fn cell_as_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(_) => None,
        Value::Text(s) => parse_flexible_date(s),
    }
}

/// Compact numeric rendering shared by display and insight text: integers
/// print without a fractional part, everything else with four decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}
