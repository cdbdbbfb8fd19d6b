//! Report output: dry-run export and console summaries.

use crate::api::ImportResponse;
use crate::convert::XrayReport;
use crate::convert::types::StatusVocabulary;
use crate::runner::DirectoryOutcome;
use crate::ui;
use std::fs::File;
use std::path::Path;

/// Pass/fail counts of a converted report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

pub fn summarize_report(report: &XrayReport, vocabulary: StatusVocabulary) -> TestSummary {
    let failed = report.failed_tests(vocabulary);
    TestSummary { passed: report.tests.len() - failed, failed, total: report.tests.len() }
}

/// Export the Xray JSON that would have been uploaded.
///
/// # Arguments
/// * `report` - The converted report
/// * `output_path` - Path to write the JSON file
pub fn export_json_report(report: &XrayReport, output_path: &Path) -> std::io::Result<()> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Link to an issue in the Jira UI
pub fn browse_url(jira_url: &str, issue_key: &str) -> String {
    format!("{}/browse/{}", jira_url.trim_end_matches('/'), issue_key)
}

pub fn print_report_summary(report: &XrayReport, vocabulary: StatusVocabulary) {
    let summary = summarize_report(report, vocabulary);
    ui::status(&format!("Converted {} test(s): {} passed, {} failed", summary.total, summary.passed, summary.failed));
}

/// Print the import response and where to find the execution
pub fn print_import_response(response: &ImportResponse, jira_url: &str) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Failed to format import response: {}", e),
    }
    ui::print_success(&format!("Uploaded results to: {}", browse_url(jira_url, response.key())));
}

/// Print one line per suite directory and return how many failed
pub fn print_suite_summary(outcomes: &[DirectoryOutcome]) -> usize {
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    println!();
    for outcome in outcomes {
        match &outcome.result {
            Ok(response) => println!("  ✓ {} -> {}", outcome.directory.display(), response.key()),
            Err(e) => println!("  ✗ {}: {}", outcome.directory.display(), e),
        }
    }
    println!();
    ui::status(&format!("{} of {} director(ies) uploaded", outcomes.len() - failed, outcomes.len()));
    failed
}
