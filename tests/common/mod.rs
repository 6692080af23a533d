#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

use query_insights::data::{Cell, Table, Value};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn text_cells(values: &[&str]) -> Vec<Cell> {
    values
        .iter()
        .map(|v| Some(Value::Text(v.to_string())))
        .collect()
}

pub fn number_cells(values: &[f64]) -> Vec<Cell> {
    values.iter().map(|v| Some(Value::Number(*v))).collect()
}

pub fn build_table(columns: Vec<(&str, Vec<Cell>)>) -> Table {
    Table::from_columns(
        columns
            .into_iter()
            .map(|(name, cells)| (name.to_string(), cells))
            .collect(),
    )
    .expect("well-formed table")
}

/// A 24-month revenue ramp: period labels "2024-01".."2025-12" and revenue
/// 1000..=1023, the canonical aggregation-query shape.
pub fn revenue_ramp() -> Table {
    let months = (0..24)
        .map(|i| {
            let year = 2024 + i / 12;
            let month = (i % 12) + 1;
            Some(Value::Text(format!("{year}-{month:02}")))
        })
        .collect::<Vec<_>>();
    let revenue = (0..24)
        .map(|i| Some(Value::Number(1000.0 + i as f64)))
        .collect::<Vec<_>>();
    build_table(vec![("month", months), ("revenue", revenue)])
}
