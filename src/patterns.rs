//! Temporal pattern detection: monthly aggregation, growth trend, and a
//! simple seasonality-strength signal.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::classify::ColumnRoles;
use crate::data::{Table, Value, cell_as_date};
use crate::stats::{mean, sample_std_dev};

/// Minimum distinct monthly buckets before seasonality is evaluated.
const SEASONALITY_MIN_BUCKETS: usize = 12;

/// Coefficient-of-variation threshold above which seasonality is reported.
const SEASONALITY_MIN_STRENGTH: f64 = 0.1;

/// A `(date, value)` pair series extracted from the first date column and
/// first numeric column, nulls dropped, sorted chronologically. Feeds both
/// pattern detection and external chart builders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries {
    pub date_column: String,
    pub value_column: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthTrend {
    pub metric: String,
    /// Mean month-over-month percent change.
    pub average_monthly_growth: f64,
    pub direction: TrendDirection,
    /// Std-dev of the percent-change series; undefined below two changes.
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityPattern {
    pub metric: String,
    /// Coefficient of variation of the month-of-year means.
    pub strength: f64,
    /// Calendar month (1-12) with the highest mean value.
    pub peak_month: u32,
    /// Calendar month (1-12) with the lowest mean value.
    pub low_month: u32,
}

/// Zero-or-one growth record and zero-or-one seasonality record. Absence of
/// a usable (date, value) pair yields the empty report, never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternReport {
    pub growth: Option<GrowthTrend>,
    pub seasonality: Option<SeasonalityPattern>,
}

impl PatternReport {
    pub fn is_empty(&self) -> bool {
        self.growth.is_none() && self.seasonality.is_none()
    }
}

/// Extracts the reusable time series from the first detected date column and
/// first detected numeric column; absence of either yields `None`. Rows
/// where either side is null or fails coercion are dropped. When the value
/// column turns out not to be summable at all (every cell fails coercion)
/// the series degrades to one unit per dated row, so monthly aggregation
/// counts instead of sums.
pub fn prepare_time_series(table: &Table, roles: &ColumnRoles) -> Option<TimeSeries> {
    let date_name = roles.first_date()?;
    let value_name = roles.first_numeric()?;
    let date_column = table.column(date_name)?;
    let value_column = table.column(value_name)?;

    let dates = date_column
        .cells
        .iter()
        .map(|cell| cell.as_ref().and_then(cell_as_date))
        .collect::<Vec<_>>();

    let mut points = Vec::new();
    for (date, cell) in dates.iter().zip(&value_column.cells) {
        if let (Some(date), Some(value)) = (date, cell.as_ref().and_then(Value::as_number)) {
            points.push((*date, value));
        }
    }
    if points.is_empty() {
        points.extend(dates.iter().flatten().map(|date| (*date, 1.0)));
    }

    if points.is_empty() {
        return None;
    }
    points.sort_by_key(|(date, _)| *date);
    Some(TimeSeries {
        date_column: date_name.to_string(),
        value_column: value_name.to_string(),
        points,
    })
}

/// Runs growth and seasonality detection over the prepared series.
pub fn detect(table: &Table, roles: &ColumnRoles) -> PatternReport {
    let Some(series) = prepare_time_series(table, roles) else {
        return PatternReport::default();
    };
    let monthly = monthly_sums(&series.points);
    PatternReport {
        growth: growth_trend(&series.value_column, &monthly),
        seasonality: seasonality(&series.value_column, &series.points, monthly.len()),
    }
}

/// Sums values into calendar-month buckets, keyed by first-of-month so the
/// BTreeMap iterates chronologically.
fn monthly_sums(points: &[(NaiveDate, f64)]) -> BTreeMap<NaiveDate, f64> {
    let mut buckets = BTreeMap::new();
    for (date, value) in points {
        let month_start = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
            .unwrap_or(*date);
        *buckets.entry(month_start).or_insert(0.0) += value;
    }
    buckets
}

fn growth_trend(metric: &str, monthly: &BTreeMap<NaiveDate, f64>) -> Option<GrowthTrend> {
    if monthly.len() < 2 {
        return None;
    }
    let series = monthly.values().copied().collect::<Vec<_>>();
    // Percent change per consecutive bucket; zero-base transitions are
    // undefined and dropped before averaging.
    let changes = series
        .windows(2)
        .filter(|pair| pair[0] != 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect::<Vec<_>>();
    let average = mean(&changes)? * 100.0;
    Some(GrowthTrend {
        metric: metric.to_string(),
        average_monthly_growth: average,
        direction: if average > 0.0 {
            TrendDirection::Increasing
        } else {
            TrendDirection::Decreasing
        },
        volatility: sample_std_dev(&changes).map(|sd| sd * 100.0),
    })
}

/// Month-of-year profile over the raw dated points: mean value per calendar
/// month, strength = CV of those means. Only evaluated once the series spans
/// at least twelve monthly buckets.
fn seasonality(
    metric: &str,
    points: &[(NaiveDate, f64)],
    bucket_count: usize,
) -> Option<SeasonalityPattern> {
    if bucket_count < SEASONALITY_MIN_BUCKETS {
        return None;
    }
    let mut sums = [0.0f64; 12];
    let mut counts = [0usize; 12];
    for (date, value) in points {
        let idx = (date.month() - 1) as usize;
        sums[idx] += value;
        counts[idx] += 1;
    }
    let means = (0..12)
        .filter(|&i| counts[i] > 0)
        .map(|i| (i as u32 + 1, sums[i] / counts[i] as f64))
        .collect::<Vec<_>>();
    let values = means.iter().map(|(_, m)| *m).collect::<Vec<_>>();
    let overall = mean(&values)?;
    if overall == 0.0 {
        return None;
    }
    let strength = sample_std_dev(&values)? / overall;
    if strength <= SEASONALITY_MIN_STRENGTH {
        return None;
    }
    let peak_month = means
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(month, _)| *month)?;
    let low_month = means
        .iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(month, _)| *month)?;
    Some(SeasonalityPattern {
        metric: metric.to_string(),
        strength,
        peak_month,
        low_month,
    })
}
