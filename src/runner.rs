use crate::api::{ImportResponse, XrayClient};
use crate::config::{DatasetConfig, SuiteConfig, SuiteTest, TestSuite};
use crate::dataset;
use crate::mask::Masking;
use crate::ui;
use crate::upload::{self, UploadRequest};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Bruno JSON report written into each suite directory
pub const RESULTS_JSON: &str = "results.json";
/// Bruno HTML report written next to it when enabled
pub const RESULTS_HTML: &str = "results.html";

/// How to start the Bruno CLI, e.g. `npx bru`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrunoCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BrunoCommand {
    /// Split a command line on whitespace; `None` if it is blank
    pub fn parse(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self { program, args: words.collect() })
    }
}

impl Default for BrunoCommand {
    fn default() -> Self {
        Self { program: "npx".to_string(), args: vec!["bru".to_string()] }
    }
}

/// Paths for running one suite directory, all anchored at the collection directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPlan {
    pub directory: PathBuf,
    pub results_json: PathBuf,
    pub results_html: Option<PathBuf>,
    pub cert_file: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
}

/// Resolve the paths of one suite entry
pub fn plan_directory(config: &SuiteConfig, test: &SuiteTest, collection_directory: &Path) -> DirectoryPlan {
    let directory = collection_directory.join(&test.directory);
    DirectoryPlan {
        results_json: directory.join(RESULTS_JSON),
        results_html: config.bruno.report.html.then(|| directory.join(RESULTS_HTML)),
        cert_file: config.bruno.cert_file.as_ref().map(|cert| collection_directory.join(cert)),
        dataset: test.dataset.as_ref().map(|d| collection_directory.join(&d.location)),
        directory,
    }
}

/// Arguments for `bru` that run one directory and write its reports
pub fn bruno_args(environment: &str, plan: &DirectoryPlan) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "run".into(),
        "-r".into(),
        plan.directory.clone().into(),
        "--env".into(),
        environment.into(),
        "--output".into(),
        plan.results_json.clone().into(),
    ];
    if let Some(cert) = &plan.cert_file {
        args.push("--cacert".into());
        args.push(cert.clone().into());
    }
    if let Some(dataset) = &plan.dataset {
        args.push("--csv-file-path".into());
        args.push(dataset.clone().into());
    }
    if let Some(html) = &plan.results_html {
        args.push("--reporter-html".into());
        args.push(html.clone().into());
    }
    args
}

/// Run Bruno with inherited stdio.
///
/// A non-zero exit only means some requests failed; only failing to start is an error.
pub fn run_bruno(command: &BrunoCommand, args: &[OsString], working_dir: &Path) -> Result<ExitStatus, String> {
    debug!("Running {} {:?} {:?} in {:?}", command.program, command.args, args, working_dir);
    Command::new(&command.program)
        .args(&command.args)
        .args(args)
        .current_dir(working_dir)
        .status()
        .map_err(|e| format!("Failed to start {}: {}", command.program, e))
}

/// Make sure a directory's dataset exists, downloading it from Xray if needed
pub fn ensure_dataset(
    client: &XrayClient,
    test: &SuiteTest,
    dataset: &DatasetConfig,
    location: &Path,
) -> Result<(), String> {
    if location.exists() {
        debug!("Using existing dataset {:?}", location);
        return Ok(());
    }
    let issue_key = dataset
        .issue_key
        .as_deref()
        .or(test.key.as_deref())
        .ok_or_else(|| format!("Failed to find test dataset {}", location.display()))?;
    ui::status(&format!("Downloading dataset of {} to {}", issue_key, location.display()));
    dataset::download_dataset(client, issue_key, location)?;
    Ok(())
}

/// Everything shared by the directories of one suite run
pub struct SuiteRun<'a> {
    pub collection_directory: &'a Path,
    pub masking: &'a Masking,
    pub bruno: &'a BrunoCommand,
    pub client: &'a XrayClient,
}

/// Result of running and uploading one suite directory
#[derive(Debug)]
pub struct DirectoryOutcome {
    pub directory: PathBuf,
    pub result: Result<ImportResponse, String>,
}

impl DirectoryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every directory of the suite in order.
///
/// A failing directory does not stop the run. The callback is invoked for each
/// completed directory.
pub fn run_suite<F>(suite: &TestSuite, run: &SuiteRun, mut on_result: F) -> Vec<DirectoryOutcome>
where
    F: FnMut(&DirectoryOutcome),
{
    debug!("Running {} suite director(ies) from {:?}", suite.tests.len(), run.collection_directory);

    let mut outcomes = Vec::with_capacity(suite.tests.len());
    for test in &suite.tests {
        let outcome = DirectoryOutcome {
            directory: test.directory.clone(),
            result: run_directory(&suite.config, test, run),
        };
        on_result(&outcome);
        outcomes.push(outcome);
    }
    outcomes
}

fn run_directory(config: &SuiteConfig, test: &SuiteTest, run: &SuiteRun) -> Result<ImportResponse, String> {
    let plan = plan_directory(config, test, run.collection_directory);

    if let (Some(dataset), Some(location)) = (&test.dataset, &plan.dataset) {
        ensure_dataset(run.client, test, dataset, location)?;
    }

    // Never upload a report left over from an earlier run
    if plan.results_json.exists() {
        std::fs::remove_file(&plan.results_json)
            .map_err(|e| format!("Failed to remove stale {}: {}", plan.results_json.display(), e))?;
    }

    ui::status(&format!("Running {}", plan.directory.display()));
    let status = run_bruno(run.bruno, &bruno_args(&config.bruno.environment, &plan), run.collection_directory)?;
    if !status.success() {
        debug!("Bruno exited with {} for {:?}", status, plan.directory);
    }

    let execution = config.jira.test_execution.clone().unwrap_or_default();
    let request = UploadRequest {
        csv_file: plan.dataset.as_deref(),
        html_report: plan.results_html.as_deref(),
        masking: run.masking.clone(),
        details: execution.details,
        execution_key: execution.key,
        ..UploadRequest::new(&plan.results_json)
    };
    upload::upload_results(&request, run.client, &config.jira.project_key)
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
