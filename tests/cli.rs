mod common;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

use common::TestWorkspace;

fn bin() -> Command {
    Command::cargo_bin("query-insights").expect("binary built")
}

const SALES_CSV: &str = "\
month,revenue,country
2024-01,1000,US
2024-02,1100,US
2024-03,1250,DE
2024-04,1400,DE
2024-05,1600,US
";

#[test]
fn analyze_prints_all_six_steps() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", SALES_CSV);
    bin()
        .args(["analyze", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(
            contains("Step 1: Data Overview & Structure")
                .and(contains("Step 2: Data Quality Assessment"))
                .and(contains("Step 3: Statistical Analysis"))
                .and(contains("Step 4: Pattern Detection & Trends"))
                .and(contains("Step 5: Business Intelligence & Insights"))
                .and(contains("Step 6: Strategic Recommendations"))
                .and(contains("Process Automation")),
        );
}

#[test]
fn analyze_emits_json_when_requested() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", SALES_CSV);
    bin()
        .args(["analyze", "--json", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("\"steps\"").and(contains("\"recommendations\"")));
}

#[test]
fn classify_lists_roles_per_column() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", SALES_CSV);
    bin()
        .args(["classify", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(
            contains("month")
                .and(contains("date"))
                .and(contains("revenue"))
                .and(contains("numeric")),
        );
}

#[test]
fn series_extracts_sorted_points() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", SALES_CSV);
    bin()
        .args(["series", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("2024-01-01").and(contains("1000")));
}

#[test]
fn series_reports_missing_pair_politely() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("names.csv", "name\nalpha\nbeta\n");
    bin()
        .args(["series", "-i"])
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("No usable (date, value) column pair found."));
}

#[test]
fn missing_input_fails_with_context() {
    bin()
        .args(["analyze", "-i", "does-not-exist.csv"])
        .assert()
        .failure()
        .stderr(contains("Loading result set"));
}
