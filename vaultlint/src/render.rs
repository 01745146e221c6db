// vaultlint/src/render.rs

//! Human-readable rendering of lint reports and query results.
//! The JSON renderings are straight serializations of the same data, so
//! both views always agree.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use vaultlint_core::domain::query::QueryData;
use vaultlint_core::domain::report::{LintReport, LintResult};
use vaultlint_core::domain::rule::Severity;

pub fn print_report(report: &LintReport, verbose: bool) {
    if !report.has_failures() {
        println!(
            "✅ No issues found ({} rules checked).",
            report.total_rules()
        );
        return;
    }

    let mut summary = Vec::new();
    if report.error_count() > 0 {
        summary.push(format!("{} error(s)", report.error_count()));
    }
    if report.warning_count() > 0 {
        summary.push(format!("{} warning(s)", report.warning_count()));
    }
    if report.info_count() > 0 {
        summary.push(format!("{} info", report.info_count()));
    }
    println!(
        "Checked {} rules: {} passed, {} failed ({}).",
        report.total_rules(),
        report.passed_count(),
        report.failed_count(),
        summary.join(", ")
    );
    println!();

    print_severity_group(report, Severity::Error, "Errors", Color::Red);
    print_severity_group(report, Severity::Warning, "Warnings", Color::Yellow);
    if verbose {
        print_severity_group(report, Severity::Info, "Information", Color::Blue);
    }
}

fn print_severity_group(report: &LintReport, severity: Severity, title: &str, color: Color) {
    let failures: Vec<&LintResult> = report
        .by_severity(severity)
        .filter(|r| !r.passed)
        .collect();
    if failures.is_empty() {
        return;
    }

    println!("{title}:");
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(vec![
        Cell::new("Rule").fg(color),
        Cell::new("Severity").fg(color),
        Cell::new("Message").fg(color),
    ]);
    for result in failures {
        table.add_row(vec![
            result.rule_name.clone(),
            result.severity.to_string(),
            result.message.clone(),
        ]);
    }
    println!("{table}");
    println!();
}

pub fn print_query_data(data: &QueryData) {
    if data.is_empty() {
        println!("No results found");
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.apply_modifier(UTF8_ROUND_CORNERS);
    table.set_header(data.columns.clone());
    for row in &data.rows {
        table.add_row(
            data.columns
                .iter()
                .map(|col| match row.get(col) {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                })
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    println!("{} row(s)", data.row_count());
}
