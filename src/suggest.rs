//! Analysis-type and chart-shape suggestions derived from column roles.
//!
//! This is selection only: the caller owns rendering. Suggestions are keyed
//! off the classified table; an optional free-text prompt marks which
//! suggestions fit what the user asked for.

use serde::{Deserialize, Serialize};

use crate::classify::{ColumnRole, ColumnRoles};
use crate::data::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisKind {
    TimeSeries,
    Comparison,
    Distribution,
    Correlation,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::TimeSeries => "Time Series",
            AnalysisKind::Comparison => "Comparison",
            AnalysisKind::Distribution => "Distribution",
            AnalysisKind::Correlation => "Correlation",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            AnalysisKind::TimeSeries => "Trend analysis over time with forecasting",
            AnalysisKind::Comparison => "Compare performance across categories",
            AnalysisKind::Distribution => "Statistical distribution and outlier analysis",
            AnalysisKind::Correlation => "Relationship analysis between metrics",
        }
    }

    fn prompt_hints(&self) -> &'static [&'static str] {
        match self {
            AnalysisKind::TimeSeries => &["trend", "time", "monthly", "daily", "forecast"],
            AnalysisKind::Comparison => &["compare", "top", "best", "vs", "by"],
            AnalysisKind::Distribution => &["distribution", "outlier", "stats", "summary"],
            AnalysisKind::Correlation => &["correlation", "relationship", "impact"],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSuggestion {
    pub kind: AnalysisKind,
    pub description: String,
    /// True when the prompt mentions a keyword associated with this kind.
    pub suitable: bool,
}

/// Chart shape recommendation for a charting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartShape {
    Bar,
    Line,
    MultiSeriesLine,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSuggestion {
    pub shape: ChartShape,
    pub x_column: String,
    pub y_columns: Vec<String>,
}

/// Rows at or below which a two-column table charts as a bar ranking.
const BAR_CHART_MAX_ROWS: usize = 10;

/// Rows above which a two-column table charts as a line series.
const LINE_CHART_MIN_ROWS: usize = 20;

/// Proposes every analysis kind the classified table supports, marking the
/// ones the prompt asked for. Order is fixed; an empty prompt simply leaves
/// every suggestion unmarked.
pub fn suggest_analyses(roles: &ColumnRoles, prompt: &str) -> Vec<AnalysisSuggestion> {
    let prompt_lower = prompt.to_lowercase();
    let has_date = roles.first_date().is_some();
    let numeric_count = roles.with_role(ColumnRole::Numeric).len();
    let has_categorical = !roles.with_role(ColumnRole::Categorical).is_empty();

    let mut kinds = Vec::new();
    if has_date && numeric_count > 0 {
        kinds.push(AnalysisKind::TimeSeries);
    }
    if has_categorical && numeric_count > 0 {
        kinds.push(AnalysisKind::Comparison);
    }
    if numeric_count > 0 {
        kinds.push(AnalysisKind::Distribution);
    }
    if numeric_count >= 2 {
        kinds.push(AnalysisKind::Correlation);
    }

    kinds
        .into_iter()
        .map(|kind| AnalysisSuggestion {
            kind,
            description: kind.description().to_string(),
            suitable: kind
                .prompt_hints()
                .iter()
                .any(|hint| prompt_lower.contains(hint)),
        })
        .collect()
}

/// Picks a chart shape for the table, or `None` when nothing charts cleanly.
///
/// Two-column category/value tables become a bar ranking when small (or when
/// the prompt asks for a ranking) and a line when long; wider tables with
/// several metrics fall back to a multi-series line over row order.
pub fn recommend_chart(table: &Table, roles: &ColumnRoles, prompt: &str) -> Option<ChartSuggestion> {
    let prompt_lower = prompt.to_lowercase();
    let numeric = roles.with_role(ColumnRole::Numeric);

    if table.column_count() == 2 {
        let names = table.column_names().collect::<Vec<_>>();
        let (first, second) = (names[0], names[1]);
        if roles.get(second) == Some(ColumnRole::Numeric)
            && roles.get(first) != Some(ColumnRole::Numeric)
        {
            let wants_ranking =
                prompt_lower.contains("top") || prompt_lower.contains("rank");
            let shape = if wants_ranking || table.row_count() <= BAR_CHART_MAX_ROWS {
                ChartShape::Bar
            } else if table.row_count() > LINE_CHART_MIN_ROWS {
                ChartShape::Line
            } else {
                return None;
            };
            return Some(ChartSuggestion {
                shape,
                x_column: first.to_string(),
                y_columns: vec![second.to_string()],
            });
        }
    }

    if numeric.len() >= 2 {
        return Some(ChartSuggestion {
            shape: ChartShape::MultiSeriesLine,
            x_column: "row".to_string(),
            y_columns: numeric
                .iter()
                .take(5)
                .map(|n| n.to_string())
                .collect(),
        });
    }

    None
}
