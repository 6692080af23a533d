pub mod classify;
pub mod cli;
pub mod data;
pub mod insight;
pub mod patterns;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod stats;
pub mod suggest;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};
use crate::data::{Table, format_number};
use crate::report::{AnalysisReport, StepDetails};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("query_insights", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => handle_analyze(&args),
        Commands::Classify(args) => handle_classify(&args),
        Commands::Series(args) => handle_series(&args),
    }
}

fn handle_analyze(args: &cli::AnalyzeArgs) -> Result<()> {
    let table = Table::from_csv_path(&args.input, args.delimiter)
        .with_context(|| format!("Loading result set from {:?}", args.input))?;
    info!(
        "Analyzing {} row(s) across {} column(s)",
        table.row_count(),
        table.column_count()
    );
    let analysis = pipeline::analyze(&table)
        .with_context(|| format!("Analyzing {:?}", args.input))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    print_report(&analysis);

    let roles = pipeline::classify_columns(&table);
    let suggestions = suggest::suggest_analyses(&roles, &args.prompt);
    if !suggestions.is_empty() {
        println!("\nSuggested analyses:");
        for suggestion in &suggestions {
            let marker = if suggestion.suitable { "*" } else { " " };
            println!(
                " {marker} {} - {}",
                suggestion.kind.as_str(),
                suggestion.description
            );
        }
    }
    if let Some(chart) = suggest::recommend_chart(&table, &roles, &args.prompt) {
        println!(
            "\nSuggested chart: {:?} of {} over {}",
            chart.shape,
            chart.y_columns.join(", "),
            chart.x_column
        );
    }
    Ok(())
}

fn handle_classify(args: &cli::ClassifyArgs) -> Result<()> {
    let table = Table::from_csv_path(&args.input, args.delimiter)
        .with_context(|| format!("Loading result set from {:?}", args.input))?;
    let roles = pipeline::classify_columns(&table);
    let headers = vec!["column".to_string(), "role".to_string()];
    let rows = roles
        .iter()
        .map(|(name, role)| vec![name.to_string(), role.as_str().to_string()])
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
    info!("Classified {} column(s)", roles.len());
    Ok(())
}

fn handle_series(args: &cli::SeriesArgs) -> Result<()> {
    let table = Table::from_csv_path(&args.input, args.delimiter)
        .with_context(|| format!("Loading result set from {:?}", args.input))?;
    let roles = pipeline::classify_columns(&table);
    match patterns::prepare_time_series(&table, &roles) {
        Some(series) => {
            let headers = vec!["date".to_string(), "value".to_string()];
            let rows = series
                .points
                .iter()
                .map(|(date, value)| {
                    vec![date.format("%Y-%m-%d").to_string(), format_number(*value)]
                })
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
            info!(
                "Extracted {} point(s) from '{}' and '{}'",
                series.points.len(),
                series.date_column,
                series.value_column
            );
        }
        None => println!("No usable (date, value) column pair found."),
    }
    Ok(())
}

fn print_report(analysis: &AnalysisReport) {
    for step in &analysis.steps {
        println!("\nStep {}: {}", step.number, step.title);
        match &step.details {
            StepDetails::Overview(overview) => {
                println!(
                    "{} row(s), {} column(s)",
                    overview.total_rows, overview.total_columns
                );
                let headers = ["column", "role", "nulls", "null %", "distinct"]
                    .map(String::from)
                    .to_vec();
                let rows = overview
                    .columns
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            c.role.as_str().to_string(),
                            c.null_count.to_string(),
                            format!("{:.1}", c.null_percentage),
                            c.distinct_values
                                .map(|d| d.to_string())
                                .unwrap_or_else(|| "50+".to_string()),
                        ]
                    })
                    .collect::<Vec<_>>();
                table::print_table(&headers, &rows);
            }
            StepDetails::Quality(quality) => {
                println!(
                    "Overall {:.1} (completeness {:.1}, consistency {:.1}, validity {:.1})",
                    quality.overall_score,
                    quality.completeness_score,
                    quality.consistency_score,
                    quality.validity_score
                );
                for strength in &quality.strengths {
                    println!("  + {strength}");
                }
                for issue in &quality.issues {
                    println!("  - {issue}");
                }
            }
            StepDetails::Statistics(summary) => {
                if summary.columns.is_empty() {
                    println!("No numeric columns to summarize.");
                    continue;
                }
                let headers = ["column", "count", "mean", "std", "min", "median", "max"]
                    .map(String::from)
                    .to_vec();
                let rows = summary
                    .columns
                    .iter()
                    .map(|c| {
                        vec![
                            c.name.clone(),
                            c.count.to_string(),
                            opt_metric(c.mean),
                            opt_metric(c.std_dev),
                            opt_metric(c.min),
                            opt_metric(c.median),
                            opt_metric(c.max),
                        ]
                    })
                    .collect::<Vec<_>>();
                table::print_table(&headers, &rows);
                for pair in &summary.strong_correlations {
                    println!(
                        "Strong correlation: {} ~ {} (r = {:.3})",
                        pair.left, pair.right, pair.coefficient
                    );
                }
            }
            StepDetails::Patterns(patterns) => {
                if patterns.is_empty() {
                    println!("No temporal patterns detected.");
                }
                if let Some(growth) = &patterns.growth {
                    println!(
                        "{}: {:.2}% average monthly growth ({})",
                        growth.metric,
                        growth.average_monthly_growth,
                        growth.direction.as_str()
                    );
                }
                if let Some(seasonal) = &patterns.seasonality {
                    println!(
                        "{}: seasonal (strength {:.2}, peak month {}, low month {})",
                        seasonal.metric, seasonal.strength, seasonal.peak_month, seasonal.low_month
                    );
                }
            }
            StepDetails::BusinessIntelligence { insights } => {
                if insights.is_empty() {
                    println!("Insufficient data for business insights.");
                }
                for insight in insights {
                    println!("  - {insight}");
                }
            }
            StepDetails::Recommendations { recommendations } => {
                for rec in recommendations {
                    println!(
                        "  [{}] {}: {}",
                        rec.priority.as_str(),
                        rec.category,
                        rec.recommendation
                    );
                }
            }
            StepDetails::Empty => println!("Insufficient data for this analysis."),
        }
    }
}

fn opt_metric(metric: Option<f64>) -> String {
    metric.map(format_number).unwrap_or_default()
}
