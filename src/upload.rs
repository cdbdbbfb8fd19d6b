/// Upload pipeline: read a Bruno report and its companions, convert, import
use crate::api::{ImportResponse, XrayClient};
use crate::convert::{self, ConversionOptions, ReportAttachment, TestExecutionDetails, XrayFormat, XrayReport};
use crate::dataset;
use crate::mask::Masking;
use crate::types::{self, BrunoIteration, RunSummary};
use log::debug;
use std::fs;
use std::path::Path;

/// Files and settings describing one upload
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub results_file: &'a Path,
    pub csv_file: Option<&'a Path>,
    pub html_report: Option<&'a Path>,
    pub masking: Masking,
    pub details: TestExecutionDetails,
    pub execution_key: Option<String>,
}

impl<'a> UploadRequest<'a> {
    pub fn new(results_file: &'a Path) -> Self {
        Self {
            results_file,
            csv_file: None,
            html_report: None,
            masking: Masking::default(),
            details: TestExecutionDetails::default(),
            execution_key: None,
        }
    }
}

/// Read the request's files and convert them into an Xray report
pub fn prepare_report(request: &UploadRequest, format: XrayFormat) -> Result<XrayReport, String> {
    let iterations = read_results(request.results_file)?;
    let totals = run_totals(&iterations);
    debug!(
        "{}: {} iteration(s), {}/{} request(s) passed",
        request.results_file.display(),
        iterations.len(),
        totals.passed_requests,
        totals.total_requests
    );

    let parameters = request.csv_file.map(dataset::read_parameters).transpose()?;
    let report = request.html_report.map(read_attachment).transpose()?;

    let options = ConversionOptions {
        format,
        parameters,
        details: request.details.clone(),
        execution_key: request.execution_key.clone(),
        masking: request.masking.clone(),
        report,
    };
    convert::convert(&iterations, &options).map_err(|e| e.to_string())
}

/// Convert and import in one go
pub fn upload_results(request: &UploadRequest, client: &XrayClient, project_key: &str) -> Result<ImportResponse, String> {
    let report = prepare_report(request, client.format())?;
    client.import_execution(&report, project_key).map_err(|e| format!("Failed to upload results: {}", e))
}

fn read_results(path: &Path) -> Result<Vec<BrunoIteration>, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    types::parse_results(&content).map_err(|e| format!("Invalid Bruno JSON report {}: {}", path.display(), e))
}

fn read_attachment(path: &Path) -> Result<ReportAttachment, String> {
    let content = fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let filename = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "report.html".to_string());
    Ok(ReportAttachment { filename, content })
}

/// Sum the run summaries Bruno wrote for each iteration
pub fn run_totals(iterations: &[BrunoIteration]) -> RunSummary {
    iterations.iter().filter_map(|i| i.summary.as_ref()).fold(RunSummary::default(), |mut total, s| {
        total.total_requests += s.total_requests;
        total.passed_requests += s.passed_requests;
        total.failed_requests += s.failed_requests;
        total.total_assertions += s.total_assertions;
        total.passed_assertions += s.passed_assertions;
        total.failed_assertions += s.failed_assertions;
        total.total_tests += s.total_tests;
        total.passed_tests += s.passed_tests;
        total.failed_tests += s.failed_tests;
        total
    })
}
