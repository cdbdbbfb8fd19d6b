// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod api;
mod cli;
mod config;
mod convert;
mod dataset;
mod mask;
mod report;
mod runner;
mod types;
mod ui;
mod upload;

use cli::{Command, DownloadArgs, RunSuiteArgs, UploadArgs};
use convert::XrayFormat;
use log::debug;
use runner::{BrunoCommand, SuiteRun};
use upload::UploadRequest;

fn main() {
    env_logger::init();

    // Values from .env never override the real environment
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {:?}", path);
    }

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    let result = match &args.command {
        Command::UploadResults(upload) => upload_results(upload),
        Command::DownloadDataset(download) => download_dataset(download),
        Command::RunSuite(run) => run_suite(run),
    };

    if let Err(e) = result {
        ui::print_error(&e);
        std::process::exit(1);
    }
}

fn upload_results(args: &UploadArgs) -> Result<(), String> {
    let request = UploadRequest {
        csv_file: args.csv_file.as_deref(),
        html_report: args.bruno_html_report.as_deref(),
        masking: args.masking(),
        details: config::execution_details(args),
        execution_key: args.test_execution_key.clone(),
        ..UploadRequest::new(&args.results)
    };

    // Dry run: credentials only pick the format
    if let Some(output) = &args.output {
        let format = config::credentials_from(&args.auth).map(|c| c.format()).unwrap_or(XrayFormat::Server);
        let report = upload::prepare_report(&request, format)?;
        report::print_report_summary(&report, format.vocabulary());
        report::export_json_report(&report, output)
            .map_err(|e| format!("Failed to write {}: {}", output.display(), e))?;
        ui::print_success(&format!("Xray JSON written to {}", output.display()));
        return Ok(());
    }

    let client = config::build_client(&args.auth, &args.jira_url)?;
    let report = upload::prepare_report(&request, client.format())?;
    report::print_report_summary(&report, client.format().vocabulary());
    let response = client
        .import_execution(&report, &args.project_key)
        .map_err(|e| format!("Failed to upload results: {}", e))?;
    report::print_import_response(&response, &args.jira_url);
    Ok(())
}

fn download_dataset(args: &DownloadArgs) -> Result<(), String> {
    let client = config::build_client(&args.auth, &args.jira_url)?;
    let path = dataset::download_dataset(&client, &args.issue_key, &args.output)?;
    ui::print_success(&format!("dataset for {} written to {}", args.issue_key, path.display()));
    Ok(())
}

fn run_suite(args: &RunSuiteArgs) -> Result<(), String> {
    let suite = config::load_suite(&args.suite)?;
    let bruno = BrunoCommand::parse(&args.bruno_command).unwrap_or_default();
    let collection_directory = std::path::absolute(&args.collection_directory)
        .map_err(|e| format!("Invalid collection directory {}: {}", args.collection_directory.display(), e))?;
    let client = config::build_client(&args.auth, &suite.config.jira.url)?;

    let masking = args.masking();
    let run = SuiteRun {
        collection_directory: &collection_directory,
        masking: &masking,
        bruno: &bruno,
        client: &client,
    };
    let outcomes = runner::run_suite(&suite, &run, |outcome| match &outcome.result {
        Ok(response) => report::print_import_response(response, &suite.config.jira.url),
        Err(e) => ui::print_error(&format!("{}: {}", outcome.directory.display(), e)),
    });

    let failed = report::print_suite_summary(&outcomes);
    if failed > 0 {
        return Err(format!("{} of {} suite director(ies) failed", failed, outcomes.len()));
    }
    Ok(())
}
