use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

use query_insights::data::{Cell, Table, Value};
use query_insights::pipeline;

fn arb_cell() -> impl Strategy<Value = Cell> {
    option::weighted(
        0.8,
        prop_oneof![
            (-1.0e6..1.0e6f64).prop_map(Value::Number),
            "[a-z]{1,8}".prop_map(Value::Text),
            Just(Value::Text("2024-03-15".to_string())),
        ],
    )
}

fn arb_table() -> impl Strategy<Value = Table> {
    (1usize..5, 1usize..30).prop_flat_map(|(columns, rows)| {
        vec(vec(arb_cell(), rows..=rows), columns..=columns).prop_map(|cells| {
            let named = cells
                .into_iter()
                .enumerate()
                .map(|(idx, column)| (format!("col_{idx}"), column))
                .collect();
            Table::from_columns(named).expect("equal-length columns")
        })
    })
}

proptest! {
    // Any non-degenerate table yields a well-formed six-step report.
    #[test]
    fn analyze_never_fails_on_nonempty_tables(table in arb_table()) {
        let report = pipeline::analyze(&table).expect("non-degenerate input");
        prop_assert_eq!(report.steps.len(), 6);
        for (idx, step) in report.steps.iter().enumerate() {
            prop_assert_eq!(step.number, idx + 1);
        }
        prop_assert!(report.insights.len() <= 5);
        prop_assert!(
            report
                .recommendations
                .iter()
                .any(|r| r.category == "Process Automation")
        );
    }

    #[test]
    fn quality_scores_stay_within_percent_bounds(table in arb_table()) {
        let roles = pipeline::classify_columns(&table);
        let report = query_insights::quality::score(&table, &roles);
        for score in [
            report.completeness_score,
            report.consistency_score,
            report.validity_score,
            report.overall_score,
        ] {
            prop_assert!((0.0..=100.0).contains(&score));
        }
    }

    #[test]
    fn classification_is_total_and_deterministic(table in arb_table()) {
        let first = pipeline::classify_columns(&table);
        let second = pipeline::classify_columns(&table);
        prop_assert_eq!(first.len(), table.column_count());
        for (name, role) in first.iter() {
            prop_assert_eq!(second.get(name), Some(role));
        }
    }
}
