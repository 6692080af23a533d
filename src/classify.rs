//! Schema-less column role inference.
//!
//! Result sets from ad-hoc queries arrive with no declared types, so every
//! analysis stage leans on this module to decide which columns are dates,
//! metrics, or categories. Detection is an ordered chain of predicates with
//! first-match-wins semantics: date, then numeric, then categorical. Each
//! predicate samples a bounded prefix of the column so cost stays flat no
//! matter how large the result set is. Classification never fails; a column
//! that matches nothing is tagged [`ColumnRole::Unclassified`].

use serde::{Deserialize, Serialize};

use crate::data::{Column, Table, Value, parse_date_strict, parse_flexible_date};

/// Rows sampled per column when testing a role predicate.
const SAMPLE_ROWS: usize = 8;

/// Distinct-to-total ratio below which a text column counts as categorical.
const CATEGORICAL_DISTINCT_RATIO: f64 = 0.5;

/// Inferred semantic category of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Date,
    Numeric,
    Categorical,
    Identifier,
    Unclassified,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Date => "date",
            ColumnRole::Numeric => "numeric",
            ColumnRole::Categorical => "categorical",
            ColumnRole::Identifier => "identifier",
            ColumnRole::Unclassified => "unclassified",
        }
    }
}

/// Role assignment for every column of a table, in column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRoles {
    entries: Vec<(String, ColumnRole)>,
}

impl ColumnRoles {
    pub fn get(&self, name: &str) -> Option<ColumnRole> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, role)| *role)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnRole)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names with the given role, in table order.
    pub fn with_role(&self, role: ColumnRole) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, r)| *r == role)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// First date column, if any.
    pub fn first_date(&self) -> Option<&str> {
        self.with_role(ColumnRole::Date).first().copied()
    }

    /// First numeric column, if any.
    pub fn first_numeric(&self) -> Option<&str> {
        self.with_role(ColumnRole::Numeric).first().copied()
    }
}

/// Assigns a role to every column. Total and deterministic: the same table
/// always yields the same assignment, and no input makes this fail.
pub fn classify_columns(table: &Table) -> ColumnRoles {
    let mut entries = table
        .columns()
        .iter()
        .map(|column| (column.name.clone(), classify_column(column)))
        .collect::<Vec<_>>();

    // Aggregation queries often return a period label in column 0 whose raw
    // values (e.g. "2024-01") do not survive strict date parsing. When no
    // column classified as a date and there are at least two columns, column
    // 0 gets a second chance with the padded period parser. The policy is
    // deliberately asymmetric and only promotes, never demotes; it can
    // misclassify a genuinely categorical first column, which is acceptable
    // for a best-effort dashboard heuristic.
    let has_date = entries.iter().any(|(_, role)| *role == ColumnRole::Date);
    if !has_date
        && table.column_count() >= 2
        && let Some(first) = table.columns().first()
        && sample_all(first, |value| {
            matches!(value, Value::Text(s) if parse_flexible_date(s).is_some())
        })
    {
        entries[0].1 = ColumnRole::Date;
    }

    ColumnRoles { entries }
}

fn classify_column(column: &Column) -> ColumnRole {
    // Strict parse only: period labels like "2024-01" are not dates here,
    // they are handled by the first-column fallback in `classify_columns`.
    if sample_all(column, |value| {
        matches!(value, Value::Text(s) if parse_date_strict(s).is_some())
    }) {
        return ColumnRole::Date;
    }
    if sample_all(column, |value| value.as_number().is_some()) {
        return ColumnRole::Numeric;
    }
    categorize_text(column)
}

/// True when the sample prefix is non-empty and every sampled value passes
/// the predicate. Nulls are skipped rather than counted against the column.
fn sample_all(column: &Column, predicate: impl Fn(&Value) -> bool) -> bool {
    let mut sampled = 0usize;
    for value in column.present().take(SAMPLE_ROWS) {
        if !predicate(value) {
            return false;
        }
        sampled += 1;
    }
    sampled > 0
}

fn categorize_text(column: &Column) -> ColumnRole {
    let total = column.cells.len();
    if total == 0 {
        return ColumnRole::Unclassified;
    }
    let distinct = column.distinct_count();
    if distinct == 0 {
        // All-null column: nothing to categorize.
        return ColumnRole::Unclassified;
    }
    if (distinct as f64) < (total as f64) * CATEGORICAL_DISTINCT_RATIO {
        return ColumnRole::Categorical;
    }
    // High-cardinality text: every row distinct smells like a key; anything
    // short of that is free text we make no claim about.
    if distinct == total && total > 1 {
        ColumnRole::Identifier
    } else {
        ColumnRole::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Cell, Table};

    fn text(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| Some(Value::Text(v.to_string())))
            .collect()
    }

    fn numbers(values: &[f64]) -> Vec<Cell> {
        values.iter().map(|v| Some(Value::Number(*v))).collect()
    }

    #[test]
    fn detects_dates_numbers_and_categories() {
        let table = Table::from_columns(vec![
            (
                "order_date".to_string(),
                text(&[
                    "2024-01-02",
                    "2024-01-03",
                    "2024-01-04",
                    "2024-01-05",
                    "2024-01-06",
                ]),
            ),
            (
                "amount".to_string(),
                numbers(&[10.0, 20.0, 30.0, 40.0, 50.0]),
            ),
            ("region".to_string(), text(&["EU", "EU", "US", "EU", "US"])),
        ])
        .unwrap();
        let roles = classify_columns(&table);
        assert_eq!(roles.get("order_date"), Some(ColumnRole::Date));
        assert_eq!(roles.get("amount"), Some(ColumnRole::Numeric));
        assert_eq!(roles.get("region"), Some(ColumnRole::Categorical));
    }

    #[test]
    fn numeric_text_coerces_to_numeric() {
        let table = Table::from_columns(vec![
            ("qty".to_string(), text(&["1", "2", "3"])),
            ("note".to_string(), text(&["a", "b", "c"])),
        ])
        .unwrap();
        let roles = classify_columns(&table);
        assert_eq!(roles.get("qty"), Some(ColumnRole::Numeric));
    }

    #[test]
    fn high_cardinality_text_becomes_identifier() {
        let table = Table::from_columns(vec![
            ("sku".to_string(), text(&["A-1", "B-2", "C-3", "D-4"])),
            ("n".to_string(), numbers(&[1.0, 2.0, 3.0, 4.0])),
        ])
        .unwrap();
        assert_eq!(
            classify_columns(&table).get("sku"),
            Some(ColumnRole::Identifier)
        );
    }

    #[test]
    fn period_labels_in_first_column_get_second_chance() {
        let table = Table::from_columns(vec![
            (
                "month".to_string(),
                text(&["2024-01", "2024-02", "2024-03"]),
            ),
            ("revenue".to_string(), numbers(&[100.0, 110.0, 120.0])),
        ])
        .unwrap();
        assert_eq!(classify_columns(&table).get("month"), Some(ColumnRole::Date));
    }

    #[test]
    fn fallback_only_applies_to_first_column() {
        let table = Table::from_columns(vec![
            ("revenue".to_string(), numbers(&[100.0, 110.0, 120.0])),
            (
                "month".to_string(),
                text(&["2024-01", "2024-02", "2024-03"]),
            ),
        ])
        .unwrap();
        let roles = classify_columns(&table);
        assert_eq!(roles.get("month"), Some(ColumnRole::Identifier));
        assert_eq!(roles.first_date(), None);
    }

    #[test]
    fn all_null_column_stays_unclassified() {
        let table = Table::from_columns(vec![
            ("empty".to_string(), vec![None, None, None]),
            ("n".to_string(), numbers(&[1.0, 2.0, 3.0])),
        ])
        .unwrap();
        assert_eq!(
            classify_columns(&table).get("empty"),
            Some(ColumnRole::Unclassified)
        );
    }
}
