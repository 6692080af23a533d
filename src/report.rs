//! The six-step analysis report model.
//!
//! Each stage of the pipeline produces one [`Step`] whose payload is a
//! variant of [`StepDetails`], so presentation code dispatches on the enum
//! exhaustively instead of switching on magic step numbers. The report is
//! produced once per run and immutable thereafter; its lifecycle is entirely
//! request-scoped.

use serde::{Deserialize, Serialize};

use crate::classify::{ColumnRole, ColumnRoles};
use crate::data::Table;
use crate::insight::Recommendation;
use crate::patterns::PatternReport;
use crate::quality::QualityReport;
use crate::stats::{StatisticalSummary, mean, quantile, sample_std_dev};

/// Fixed stage order of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepKind {
    Overview,
    Quality,
    Statistics,
    Patterns,
    BusinessIntelligence,
    Recommendations,
}

impl StepKind {
    pub const ALL: [StepKind; 6] = [
        StepKind::Overview,
        StepKind::Quality,
        StepKind::Statistics,
        StepKind::Patterns,
        StepKind::BusinessIntelligence,
        StepKind::Recommendations,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            StepKind::Overview => "Data Overview & Structure",
            StepKind::Quality => "Data Quality Assessment",
            StepKind::Statistics => "Statistical Analysis",
            StepKind::Patterns => "Pattern Detection & Trends",
            StepKind::BusinessIntelligence => "Business Intelligence & Insights",
            StepKind::Recommendations => "Strategic Recommendations",
        }
    }
}

/// Stage payload, one variant per step kind. An `Empty` payload marks a
/// stage that completed with no data (either nothing applied or the stage
/// was isolated after an internal failure).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepDetails {
    Overview(OverviewDetails),
    Quality(QualityReport),
    Statistics(StatisticalSummary),
    Patterns(PatternReport),
    BusinessIntelligence { insights: Vec<String> },
    Recommendations { recommendations: Vec<Recommendation> },
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub number: usize,
    pub kind: StepKind,
    pub title: String,
    pub details: StepDetails,
}

/// Per-column profile for the overview step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnOverview {
    pub name: String,
    pub role: ColumnRole,
    pub non_null_count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    /// Distinct display values; capped at 50 for non-numeric columns, where
    /// `None` means "more than 50".
    pub distinct_values: Option<usize>,
    pub numeric_profile: Option<NumericProfile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericProfile {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewDetails {
    pub total_rows: usize,
    pub total_columns: usize,
    /// Count of columns per inferred role, in role declaration order.
    pub role_counts: Vec<(ColumnRole, usize)>,
    pub columns: Vec<ColumnOverview>,
}

/// The assembled six-step report plus the aggregated insight and
/// recommendation lists surfaced at the top level for presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub steps: Vec<Step>,
    pub insights: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisReport {
    pub fn step(&self, kind: StepKind) -> Option<&Step> {
        self.steps.iter().find(|s| s.kind == kind)
    }
}

const DISTINCT_DISPLAY_CAP: usize = 50;

/// Builds the overview payload: table shape, role tally, per-column profile.
pub fn build_overview(table: &Table, roles: &ColumnRoles) -> OverviewDetails {
    let rows = table.row_count();
    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let role = roles.get(&column.name).unwrap_or(ColumnRole::Unclassified);
            let null_count = column.null_count();
            let distinct = column.distinct_count();
            let distinct_values = if role == ColumnRole::Numeric || distinct <= DISTINCT_DISPLAY_CAP
            {
                Some(distinct)
            } else {
                None
            };
            let numeric_profile = (role == ColumnRole::Numeric).then(|| {
                let mut values = column.numbers();
                values.sort_by(|a, b| a.total_cmp(b));
                NumericProfile {
                    mean: mean(&values),
                    median: quantile(&values, 0.5),
                    std_dev: sample_std_dev(&values),
                    min: values.first().copied(),
                    max: values.last().copied(),
                }
            });
            ColumnOverview {
                name: column.name.clone(),
                role,
                non_null_count: column.cells.len() - null_count,
                null_count,
                null_percentage: if rows == 0 {
                    0.0
                } else {
                    null_count as f64 / rows as f64 * 100.0
                },
                distinct_values,
                numeric_profile,
            }
        })
        .collect();

    let role_order = [
        ColumnRole::Date,
        ColumnRole::Numeric,
        ColumnRole::Categorical,
        ColumnRole::Identifier,
        ColumnRole::Unclassified,
    ];
    let role_counts = role_order
        .into_iter()
        .filter_map(|role| {
            let count = roles.iter().filter(|(_, r)| *r == role).count();
            (count > 0).then_some((role, count))
        })
        .collect();

    OverviewDetails {
        total_rows: rows,
        total_columns: table.column_count(),
        role_counts,
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_columns;
    use crate::data::{Cell, Table, Value};

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
    fn overview_profiles_each_column() {
        let t = table(vec![
            (
                "day",
                vec![
                    Some(Value::Text("2024-01-01".into())),
                    Some(Value::Text("2024-01-02".into())),
                    None,
                ],
            ),
            (
                "amount",
                vec![Some(Value::Number(10.0)), Some(Value::Number(30.0)), Some(Value::Number(20.0))],
            ),
        ]);
        let overview = build_overview(&t, &classify_columns(&t));
        assert_eq!(overview.total_rows, 3);
        assert_eq!(overview.total_columns, 2);

        let day = &overview.columns[0];
        assert_eq!(day.role, ColumnRole::Date);
        assert_eq!(day.null_count, 1);
        assert!((day.null_percentage - 100.0 / 3.0).abs() < 1e-9);
        assert!(day.numeric_profile.is_none());

        let amount = &overview.columns[1];
        assert_eq!(amount.role, ColumnRole::Numeric);
        let profile = amount.numeric_profile.as_ref().unwrap();
        assert_eq!(profile.mean, Some(20.0));
        assert_eq!(profile.median, Some(20.0));
        assert_eq!(profile.min, Some(10.0));
        assert_eq!(profile.max, Some(30.0));

        assert_eq!(
            overview.role_counts,
            vec![(ColumnRole::Date, 1), (ColumnRole::Numeric, 1)]
        );
    }

    #[test]
    fn step_kinds_carry_fixed_titles_in_order() {
        let titles = StepKind::ALL.iter().map(StepKind::title).collect::<Vec<_>>();
        assert_eq!(titles.len(), 6);
        assert_eq!(titles[0], "Data Overview & Structure");
        assert_eq!(titles[5], "Strategic Recommendations");
    }
}
