//! Descriptive statistics, Pearson correlations, and IQR outlier bounds for
//! the numeric columns of a classified table.
//!
//! Undefined quantities (std-dev of one sample, correlation of a constant
//! column) are represented as `None` in the output and excluded from
//! strong-correlation reporting; they are never errors.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::classify::{ColumnRole, ColumnRoles};
use crate::data::{Table, Value};

/// |r| above which a column pair is reported as strongly correlated.
const STRONG_CORRELATION_THRESHOLD: f64 = 0.7;

/// IQR multiplier for outlier bounds.
const IQR_FENCE: f64 = 1.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

/// Symmetric Pearson correlation matrix over the numeric columns, in table
/// order. Cells are `None` where the coefficient is undefined (zero
/// variance, fewer than two paired observations).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrongCorrelation {
    pub left: String,
    pub right: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierSummary {
    pub column: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub columns: Vec<ColumnSummary>,
    pub correlations: Option<CorrelationMatrix>,
    pub strong_correlations: Vec<StrongCorrelation>,
    pub outliers: Vec<OutlierSummary>,
}

/// Summarizes every numeric column. Tables without numeric columns yield an
/// empty (but well-formed) summary.
pub fn summarize(table: &Table, roles: &ColumnRoles) -> StatisticalSummary {
    // Row-aligned numeric views: coercion failures and nulls both land as
    // `None` so correlation can pair complete observations per row.
    let series = roles
        .with_role(ColumnRole::Numeric)
        .iter()
        .filter_map(|name| {
            table.column(name).map(|c| {
                let aligned = c
                    .cells
                    .iter()
                    .map(|cell| cell.as_ref().and_then(Value::as_number))
                    .collect::<Vec<_>>();
                (name.to_string(), aligned)
            })
        })
        .collect::<Vec<_>>();

    let columns = series
        .iter()
        .map(|(name, values)| {
            let present = values.iter().flatten().copied().collect::<Vec<_>>();
            describe(name, &present)
        })
        .collect::<Vec<_>>();

    let correlations = (series.len() > 1).then(|| correlation_matrix(&series));
    let strong_correlations = correlations
        .as_ref()
        .map(|matrix| strong_pairs(matrix))
        .unwrap_or_default();

    let outliers = series
        .iter()
        .filter_map(|(name, values)| {
            let present = values.iter().flatten().copied().collect::<Vec<_>>();
            iqr_outliers(name, &present, table.row_count())
        })
        .collect();

    StatisticalSummary {
        columns,
        correlations,
        strong_correlations,
        outliers,
    }
}

fn describe(name: &str, values: &[f64]) -> ColumnSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    ColumnSummary {
        name: name.to_string(),
        count: values.len(),
        mean: mean(values),
        std_dev: sample_std_dev(values),
        min: sorted.first().copied(),
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (N−1 denominator); undefined below two samples.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() as f64 - 1.0);
    Some(variance.max(0.0).sqrt())
}

/// Quantile by linear interpolation over a pre-sorted slice. For
/// `[1,2,3,4,5,100]` this puts Q1 at 2.25 and Q3 at 4.75.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = position - lower as f64;
    Some(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
}

/// Pearson correlation over paired slices; `None` when either side has zero
/// variance or fewer than two observations.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let xs = &xs[..n];
    let ys = &ys[..n];
    pearson_inner(xs, ys)
}

fn pearson_inner(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        var_x += (x - mx) * (x - mx);
        var_y += (y - my) * (y - my);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

fn correlation_matrix(series: &[(String, Vec<Option<f64>>)]) -> CorrelationMatrix {
    let columns = series.iter().map(|(name, _)| name.clone()).collect();
    let n = series.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        // Diagonal is 1.0 only where the column actually varies.
        values[i][i] = pearson_paired(&series[i].1, &series[i].1).map(|_| 1.0);
        for j in i + 1..n {
            let r = pearson_paired(&series[i].1, &series[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { columns, values }
}

/// Pearson over complete observations only: rows where either side is null
/// are dropped before the coefficient is computed.
fn pearson_paired(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let (paired_x, paired_y): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    if paired_x.len() < 2 {
        return None;
    }
    pearson_inner(&paired_x, &paired_y)
}

fn strong_pairs(matrix: &CorrelationMatrix) -> Vec<StrongCorrelation> {
    let n = matrix.columns.len();
    (0..n)
        .tuple_combinations()
        .filter_map(|(i, j)| {
            let r = matrix.values[i][j]?;
            (r.abs() > STRONG_CORRELATION_THRESHOLD).then(|| StrongCorrelation {
                left: matrix.columns[i].clone(),
                right: matrix.columns[j].clone(),
                coefficient: r,
            })
        })
        .collect()
}

fn iqr_outliers(name: &str, values: &[f64], total_rows: usize) -> Option<OutlierSummary> {
    if values.is_empty() || total_rows == 0 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let q1 = quantile(&sorted, 0.25)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let lower_bound = q1 - IQR_FENCE * iqr;
    let upper_bound = q3 + IQR_FENCE * iqr;
    let count = values
        .iter()
        .filter(|v| **v < lower_bound || **v > upper_bound)
        .count();
    Some(OutlierSummary {
        column: name.to_string(),
        lower_bound,
        upper_bound,
        count,
        percentage: count as f64 / total_rows as f64 * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_columns;
    use crate::data::{Cell, Table, Value};

    fn numbers(values: &[f64]) -> Vec<Cell> {
        values.iter().map(|v| Some(Value::Number(*v))).collect()
    }

    fn table(columns: Vec<(&str, Vec<Cell>)>) -> Table {
        Table::from_columns(
            columns
                .into_iter()
                .map(|(n, c)| (n.to_string(), c))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert!((quantile(&sorted, 0.25).unwrap() - 2.25).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75).unwrap() - 4.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5).unwrap() - 3.5).abs() < 1e-12);
    }

    #[test]
    fn iqr_flags_the_single_spike() {
        let t = table(vec![("v", numbers(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]))]);
        let summary = summarize(&t, &classify_columns(&t));
        let outlier = &summary.outliers[0];
        assert!((outlier.upper_bound - 8.5).abs() < 1e-12);
        assert_eq!(outlier.count, 1);
        assert!((outlier.percentage - 100.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn identical_columns_correlate_at_one() {
        let t = table(vec![
            ("a", numbers(&[1.0, 2.0, 3.0, 4.0])),
            ("b", numbers(&[1.0, 2.0, 3.0, 4.0])),
        ]);
        let summary = summarize(&t, &classify_columns(&t));
        let matrix = summary.correlations.unwrap();
        assert!((matrix.values[0][1].unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(matrix.values[0][1], matrix.values[1][0]);
        assert_eq!(matrix.values[0][0], Some(1.0));
        assert_eq!(summary.strong_correlations.len(), 1);
    }

    #[test]
    fn constant_column_has_undefined_correlation() {
        let t = table(vec![
            ("a", numbers(&[5.0, 5.0, 5.0])),
            ("b", numbers(&[1.0, 2.0, 3.0])),
        ]);
        let summary = summarize(&t, &classify_columns(&t));
        let matrix = summary.correlations.unwrap();
        assert_eq!(matrix.values[0][0], None);
        assert_eq!(matrix.values[0][1], None);
        assert!(summary.strong_correlations.is_empty());
    }

    #[test]
    fn single_sample_std_dev_is_undefined() {
        let t = table(vec![("a", numbers(&[42.0]))]);
        let summary = summarize(&t, &classify_columns(&t));
        let column = &summary.columns[0];
        assert_eq!(column.count, 1);
        assert_eq!(column.std_dev, None);
        assert_eq!(column.median, Some(42.0));
    }

    #[test]
    fn no_numeric_columns_yields_empty_summary() {
        let t = table(vec![(
            "label",
            vec![
                Some(Value::Text("x".into())),
                Some(Value::Text("y".into())),
                Some(Value::Text("x".into())),
            ],
        )]);
        let summary = summarize(&t, &classify_columns(&t));
        assert!(summary.columns.is_empty());
        assert!(summary.correlations.is_none());
        assert!(summary.outliers.is_empty());
    }
}
