//! Data quality scoring: completeness, consistency, and validity.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::classify::{ColumnRole, ColumnRoles};
use crate::data::Table;

/// Points deducted from the validity score per detected issue.
const VALIDITY_PENALTY: f64 = 10.0;

/// Quality sub-scores as percentages in [0,100]. `overall_score` is always
/// the unweighted mean of the three sub-scores, never set independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub completeness_score: f64,
    pub consistency_score: f64,
    pub validity_score: f64,
    pub overall_score: f64,
    pub issues: Vec<String>,
    pub strengths: Vec<String>,
}

impl QualityReport {
    fn from_scores(
        completeness: f64,
        consistency: f64,
        validity: f64,
        issues: Vec<String>,
        strengths: Vec<String>,
    ) -> Self {
        Self {
            completeness_score: completeness,
            consistency_score: consistency,
            validity_score: validity,
            overall_score: (completeness + consistency + validity) / 3.0,
            issues,
            strengths,
        }
    }
}

/// Scores a classified table. Never fails; a degenerate table with no cells
/// scores 100 across the board by convention (nothing present, nothing
/// missing or duplicated).
pub fn score(table: &Table, roles: &ColumnRoles) -> QualityReport {
    let completeness = completeness_score(table);
    let duplicate_rows = duplicate_row_count(table);
    let consistency = consistency_score(table, duplicate_rows);
    let validity_issues = validity_issues(table, roles);
    let validity = (100.0 - VALIDITY_PENALTY * validity_issues.len() as f64).max(0.0);

    let mut issues = Vec::new();
    let mut strengths = Vec::new();
    if completeness > 95.0 {
        strengths.push("Excellent data completeness".to_string());
    } else if completeness > 85.0 {
        strengths.push("Good data completeness".to_string());
    } else {
        issues.push("Data has significant missing values".to_string());
    }
    if duplicate_rows > 0 {
        issues.push(format!("Found {duplicate_rows} duplicate rows"));
    }
    issues.extend(validity_issues);

    QualityReport::from_scores(completeness, consistency, validity, issues, strengths)
}

fn completeness_score(table: &Table) -> f64 {
    let total = table.cell_count();
    if total == 0 {
        return 100.0;
    }
    (total - table.null_count()) as f64 / total as f64 * 100.0
}

fn consistency_score(table: &Table, duplicate_rows: usize) -> f64 {
    let rows = table.row_count();
    if rows == 0 {
        return 100.0;
    }
    (rows - duplicate_rows) as f64 / rows as f64 * 100.0
}

/// Counts rows that are exact duplicates of an earlier row across every
/// column, comparing display values so `1` and `1.0` collapse the same way.
fn duplicate_row_count(table: &Table) -> usize {
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    for row in 0..table.row_count() {
        let key = table
            .columns()
            .iter()
            .map(|column| match &column.cells[row] {
                Some(value) => value.as_text().into_owned(),
                None => String::new(),
            })
            .collect::<Vec<_>>()
            .join("\u{1f}");
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    duplicates
}

fn validity_issues(table: &Table, roles: &ColumnRoles) -> Vec<String> {
    let mut issues = Vec::new();
    for column in table.columns() {
        if roles.get(&column.name) != Some(ColumnRole::Numeric) {
            continue;
        }
        let numbers = column.numbers();
        if numbers.iter().any(|n| n.is_infinite()) {
            issues.push(format!("Infinite values in {}", column.name));
        }
        if column.name.to_lowercase().contains("amount") && numbers.iter().any(|n| *n < 0.0) {
            issues.push(format!("Negative values in amount field: {}", column.name));
        }
    }
    issues
}
