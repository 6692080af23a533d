//! The fixed six-stage analysis pipeline.
//!
//! `analyze` is the one operation the core exposes to callers: classify the
//! columns once, run each stage in order, and assemble the report. Malformed
//! input fails fast before stage 1; after that no stage failure may abort the
//! run. Stages are isolated at their boundary: an unexpected panic inside a
//! stage is caught, logged, and recorded as a completed step with an empty
//! payload so the report always carries exactly six steps.

use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use thiserror::Error;

use crate::classify::{self, ColumnRoles};
use crate::data::Table;
use crate::insight;
use crate::patterns;
use crate::quality;
use crate::report::{self, AnalysisReport, Step, StepDetails, StepKind};
use crate::stats;

/// The only error that crosses the core boundary. Everything softer than
/// this degrades into the report's data instead of failing the run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("result set has no columns")]
    NoColumns,
    #[error("result set has no rows")]
    NoRows,
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },
}

/// Runs the full pipeline over an immutable table and returns the six-step
/// report. The table is never mutated; every stage builds and discards its
/// own working views.
pub fn analyze(table: &Table) -> Result<AnalysisReport, AnalysisError> {
    if table.column_count() == 0 {
        return Err(AnalysisError::NoColumns);
    }
    if table.row_count() == 0 {
        return Err(AnalysisError::NoRows);
    }

    let roles = classify::classify_columns(table);
    debug!(
        "Classified {} column(s) over {} row(s)",
        roles.len(),
        table.row_count()
    );

    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    let steps = StepKind::ALL
        .iter()
        .enumerate()
        .map(|(idx, kind)| {
            let details = run_stage(*kind, table, &roles);
            match &details {
                StepDetails::BusinessIntelligence { insights: found } => {
                    insights = found.clone();
                }
                StepDetails::Recommendations {
                    recommendations: found,
                } => {
                    recommendations = found.clone();
                }
                _ => {}
            }
            Step {
                number: idx + 1,
                kind: *kind,
                title: kind.title().to_string(),
                details,
            }
        })
        .collect();

    Ok(AnalysisReport {
        steps,
        insights,
        recommendations,
    })
}

/// Narrow entry point for callers that only need role inference.
pub fn classify_columns(table: &Table) -> ColumnRoles {
    classify::classify_columns(table)
}

/// Executes one stage inside an isolation boundary. A stage that panics is
/// recorded as completed-with-no-data rather than aborting the pipeline.
fn run_stage(kind: StepKind, table: &Table, roles: &ColumnRoles) -> StepDetails {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match kind {
        StepKind::Overview => StepDetails::Overview(report::build_overview(table, roles)),
        StepKind::Quality => StepDetails::Quality(quality::score(table, roles)),
        StepKind::Statistics => StepDetails::Statistics(stats::summarize(table, roles)),
        StepKind::Patterns => StepDetails::Patterns(patterns::detect(table, roles)),
        StepKind::BusinessIntelligence => StepDetails::BusinessIntelligence {
            insights: insight::compose_insights(table, roles),
        },
        StepKind::Recommendations => StepDetails::Recommendations {
            recommendations: insight::compose_recommendations(table, roles),
        },
    }));
    match outcome {
        Ok(details) => details,
        Err(_) => {
            warn!(
                "Stage '{}' failed unexpectedly; recording an empty step",
                kind.title()
            );
            StepDetails::Empty
        }
    }
}
