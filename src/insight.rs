//! Business-insight strings and prioritized recommendations.
//!
//! Insight generation is rule-based and strictly ordered: monetary metrics
//! first, then customer cardinality, then geography, then product
//! popularity. The list is truncated to [`INSIGHT_CAP`] entries in that
//! priority order; later categories are dropped silently, never merged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::classify::{ColumnRole, ColumnRoles};
use crate::data::{Column, Table, Value};
use crate::stats::quantile;

/// Maximum number of insight strings reported per run.
pub const INSIGHT_CAP: usize = 5;

/// Missing-cell ratio above which a data-quality recommendation fires.
const MISSING_DATA_THRESHOLD: f64 = 0.10;

/// Column-name fragments that suggest a monetary metric.
const REVENUE_HINTS: &[&str] = &["revenue", "total", "amount", "price"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub recommendation: String,
    pub priority: Priority,
    pub impact: String,
}

/// Composes the capped, priority-ordered insight list.
pub fn compose_insights(table: &Table, roles: &ColumnRoles) -> Vec<String> {
    let mut insights = Vec::new();
    let revenue_column = find_revenue_column(table, roles);

    if let Some(column) = revenue_column {
        let values = column.numbers();
        if !values.is_empty() {
            let total: f64 = values.iter().sum();
            let average = total / values.len() as f64;
            let label = column.name.replace('_', " ");
            insights.push(format!("Total {label}: ${}", format_grouped(total)));
            insights.push(format!(
                "Average transaction value: ${}",
                format_grouped(average)
            ));
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.total_cmp(b));
            if let Some(threshold) = quantile(&sorted, 0.8) {
                let high_value = values.iter().filter(|v| **v >= threshold).count();
                insights.push(format!(
                    "High-value transactions (top 20%): {high_value} transactions"
                ));
            }
        }
    }

    if let Some(column) = find_customer_column(table) {
        let unique = column.distinct_count();
        if unique > 0 {
            insights.push(format!(
                "Total unique customers: {}",
                group_thousands(unique as u64)
            ));
            let per_customer = table.row_count() as f64 / unique as f64;
            insights.push(format!(
                "Average transactions per customer: {per_customer:.1}"
            ));
        }
    }

    if let Some(column) = find_column_with_hint(table, &["country", "geography", "region"]) {
        if let Some(top_by_volume) = mode_by_count(column) {
            insights.push(format!("Top market by volume: {top_by_volume}"));
        }
        if let Some(revenue) = revenue_column
            && let Some(top_by_revenue) = top_group_by_sum(column, revenue)
        {
            insights.push(format!("Top market by revenue: {top_by_revenue}"));
        }
    }

    if let Some(column) = find_column_with_hint(table, &["product"])
        && let Some(top_product) = mode_by_count(column)
    {
        insights.push(format!("Most popular product: {top_product}"));
    }

    insights.truncate(INSIGHT_CAP);
    insights
}

/// Threshold-driven recommendation list; independent of the insight cap.
/// Always ends with the constant process-automation entry.
pub fn compose_recommendations(table: &Table, roles: &ColumnRoles) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if table.missing_ratio() > MISSING_DATA_THRESHOLD {
        recommendations.push(Recommendation {
            category: "Data Quality".to_string(),
            recommendation: "Implement data validation processes to reduce missing values"
                .to_string(),
            priority: Priority::High,
            impact: "Improve analysis accuracy and decision-making reliability".to_string(),
        });
    }

    if roles.first_date().is_some() {
        recommendations.push(Recommendation {
            category: "Performance Monitoring".to_string(),
            recommendation: "Implement real-time dashboards for trend monitoring".to_string(),
            priority: Priority::Medium,
            impact: "Enable proactive decision-making and early issue detection".to_string(),
        });
    }

    if find_column_with_hint(table, &["country", "geography", "region"]).is_some() {
        recommendations.push(Recommendation {
            category: "Market Expansion".to_string(),
            recommendation: "Analyze underperforming geographic markets for growth opportunities"
                .to_string(),
            priority: Priority::Medium,
            impact: "Potential revenue growth through market development".to_string(),
        });
    }

    recommendations.push(Recommendation {
        category: "Process Automation".to_string(),
        recommendation: "Automate recurring analytics workflows to reduce manual effort"
            .to_string(),
        priority: Priority::Low,
        impact: "Increase efficiency and reduce human error in reporting".to_string(),
    });

    recommendations
}

/// First numeric column whose name suggests money, in table order.
fn find_revenue_column<'a>(table: &'a Table, roles: &ColumnRoles) -> Option<&'a Column> {
    table.columns().iter().find(|column| {
        roles.get(&column.name) == Some(ColumnRole::Numeric)
            && has_hint(&column.name, REVENUE_HINTS)
    })
}

/// Customer identity column: the exact conventional names win, then any
/// "customer"-named column that is not itself a geography column.
fn find_customer_column(table: &Table) -> Option<&Column> {
    table
        .column("customer_name")
        .or_else(|| table.column("customer_id"))
        .or_else(|| {
            table.columns().iter().find(|column| {
                has_hint(&column.name, &["customer"])
                    && !has_hint(&column.name, &["country", "geography", "region"])
            })
        })
}

fn find_column_with_hint<'a>(table: &'a Table, hints: &[&str]) -> Option<&'a Column> {
    table
        .columns()
        .iter()
        .find(|column| has_hint(&column.name, hints))
}

fn has_hint(name: &str, hints: &[&str]) -> bool {
    let lowered = name.to_lowercase();
    hints.iter().any(|hint| lowered.contains(hint))
}

/// Most frequent non-null display value; ties resolve to the
/// lexicographically smaller value so output stays deterministic.
fn mode_by_count(column: &Column) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in column.present() {
        *counts.entry(value.as_text().into_owned()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(value, _)| value)
}

/// Group label with the largest summed metric across paired rows.
fn top_group_by_sum(groups: &Column, metric: &Column) -> Option<String> {
    let mut sums: HashMap<String, f64> = HashMap::new();
    for (group, cell) in groups.cells.iter().zip(&metric.cells) {
        if let (Some(group), Some(value)) = (group, cell.as_ref().and_then(Value::as_number)) {
            *sums.entry(group.as_text().into_owned()).or_insert(0.0) += value;
        }
    }
    sums.into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(group, _)| group)
}

/// Renders a float rounded to whole units with thousands separators, the way
/// dashboard KPI cards print money.
fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let grouped = group_thousands(rounded.abs() as u64);
    if negative { format!("-{grouped}") } else { grouped }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx).is_multiple_of(3) {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
