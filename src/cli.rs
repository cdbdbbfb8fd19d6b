use crate::config;
use crate::mask::{MaskStrategy, Masking};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "bruno-xray")]
#[command(about = "Run Bruno collections and upload their results to Xray")]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a Bruno JSON report and upload it as an Xray test execution
    UploadResults(UploadArgs),

    /// Download the dataset of a test issue as CSV
    DownloadDataset(DownloadArgs),

    /// Run every directory of a test suite with Bruno and upload each result
    RunSuite(RunSuiteArgs),
}

/// Jira/Xray credentials, also read from the environment
#[derive(Args, Debug, Clone, Default)]
pub struct AuthArgs {
    /// Jira personal access token (Xray server)
    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    pub jira_token: Option<String>,

    /// Jira username for basic authentication (Xray server)
    #[arg(long, env = "JIRA_USERNAME", requires = "jira_password")]
    pub jira_username: Option<String>,

    /// Jira password for basic authentication (Xray server)
    #[arg(long, env = "JIRA_PASSWORD", hide_env_values = true, requires = "jira_username")]
    pub jira_password: Option<String>,

    /// Xray cloud API client id
    #[arg(long, env = "XRAY_CLIENT_ID", requires = "xray_client_secret")]
    pub xray_client_id: Option<String>,

    /// Xray cloud API client secret
    #[arg(long, env = "XRAY_CLIENT_SECRET", hide_env_values = true, requires = "xray_client_id")]
    pub xray_client_secret: Option<String>,

    /// Xray cloud base URL, for regional endpoints
    #[arg(long, env = "XRAY_CLOUD_URL", value_name = "URL")]
    pub xray_cloud_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Bruno JSON report to upload
    #[arg(value_name = "RESULTS")]
    pub results: PathBuf,

    /// Jira base URL, used for Xray server requests and issue links
    #[arg(long, value_name = "URL")]
    pub jira_url: String,

    /// Project in which a new test execution issue is created
    #[arg(long, value_name = "KEY")]
    pub project_key: String,

    /// CSV dataset the collection iterated over
    #[arg(long, value_name = "FILE")]
    pub csv_file: Option<PathBuf>,

    /// Bruno HTML report to attach to every test
    #[arg(long, value_name = "FILE")]
    pub bruno_html_report: Option<PathBuf>,

    /// Value to hide in uploaded evidence (repeatable)
    #[arg(long = "mask-value", value_name = "VALUE")]
    pub mask_values: Vec<String>,

    /// How masked values are rewritten
    #[arg(long, value_enum, default_value_t = MaskStrategy::KeepFirstLast)]
    pub mask_strategy: MaskStrategy,

    /// Existing test execution issue to upload into
    #[arg(long, value_name = "KEY")]
    pub test_execution_key: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub test_execution_summary: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub test_execution_description: Option<String>,

    #[arg(long, value_name = "VERSION")]
    pub test_execution_version: Option<String>,

    #[arg(long, value_name = "REVISION")]
    pub test_execution_revision: Option<String>,

    #[arg(long, value_name = "USER")]
    pub test_execution_user: Option<String>,

    #[arg(long, value_name = "KEY")]
    pub test_execution_test_plan_key: Option<String>,

    /// Test environment of the execution (repeatable)
    #[arg(long, value_name = "NAME")]
    pub test_execution_test_environment: Vec<String>,

    /// Write the Xray JSON to this file instead of uploading it
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub auth: AuthArgs,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Test issue whose dataset to download
    #[arg(value_name = "ISSUE_KEY")]
    pub issue_key: String,

    /// Jira base URL
    #[arg(long, value_name = "URL")]
    pub jira_url: String,

    /// Where to write the CSV
    #[arg(long, short = 'o', default_value = "data.csv")]
    pub output: PathBuf,

    #[command(flatten)]
    pub auth: AuthArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RunSuiteArgs {
    /// Test suite file (.json or .toml)
    #[arg(value_name = "SUITE")]
    pub suite: PathBuf,

    /// Bruno collection root; suite paths are relative to it
    #[arg(long, default_value = ".")]
    pub collection_directory: PathBuf,

    /// Value to hide in uploaded evidence (repeatable)
    #[arg(long = "mask-value", value_name = "VALUE")]
    pub mask_values: Vec<String>,

    /// How masked values are rewritten
    #[arg(long, value_enum, default_value_t = MaskStrategy::KeepFirstLast)]
    pub mask_strategy: MaskStrategy,

    /// Command that starts the Bruno CLI
    #[arg(long, env = "BRUNO_COMMAND", default_value = "npx bru", value_name = "COMMAND")]
    pub bruno_command: String,

    #[command(flatten)]
    pub auth: AuthArgs,
}

impl UploadArgs {
    pub fn masking(&self) -> Masking {
        Masking { values: self.mask_values.clone(), strategy: self.mask_strategy }
    }
}

impl RunSuiteArgs {
    pub fn masking(&self) -> Masking {
        Masking { values: self.mask_values.clone(), strategy: self.mask_strategy }
    }
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            // A dry run only needs credentials to pick the format
            Command::UploadResults(args) if args.output.is_some() => {}
            Command::UploadResults(UploadArgs { auth, .. })
            | Command::DownloadDataset(DownloadArgs { auth, .. })
            | Command::RunSuite(RunSuiteArgs { auth, .. }) => {
                config::resolve_credentials(auth)?;
            }
        }

        if let Command::RunSuite(args) = &self.command
            && args.bruno_command.split_whitespace().next().is_none()
        {
            return Err("--bruno-command must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("bruno-xray").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_upload_results_flags() {
        let args = parse(&[
            "upload-results",
            "results.json",
            "--jira-url",
            "https://jira.example.com",
            "--project-key",
            "BRU",
            "--jira-token",
            "pat",
            "--mask-value",
            "Jeff",
            "--mask-value",
            "George",
            "--test-execution-test-environment",
            "production",
            "--test-execution-test-environment",
            "live",
        ]);
        let Command::UploadResults(upload) = &args.command else {
            panic!("expected upload-results, got {:?}", args.command);
        };
        assert_eq!(upload.results, PathBuf::from("results.json"));
        assert_eq!(upload.project_key, "BRU");
        assert_eq!(upload.mask_values, vec!["Jeff", "George"]);
        assert_eq!(upload.test_execution_test_environment, vec!["production", "live"]);
        assert_eq!(upload.auth.jira_token.as_deref(), Some("pat"));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_download_dataset_defaults() {
        let args = parse(&["download-dataset", "BRU-65", "--jira-url", "https://jira.example.com", "--jira-token", "t"]);
        let Command::DownloadDataset(download) = &args.command else {
            panic!("expected download-dataset");
        };
        assert_eq!(download.issue_key, "BRU-65");
        assert_eq!(download.output, PathBuf::from("data.csv"));
    }

    #[test]
    fn test_run_suite_defaults() {
        let args = parse(&["run-suite", "suite.toml", "--jira-token", "t"]);
        let Command::RunSuite(run) = &args.command else {
            panic!("expected run-suite");
        };
        assert_eq!(run.suite, PathBuf::from("suite.toml"));
        assert_eq!(run.collection_directory, PathBuf::from("."));
        assert!(run.mask_values.is_empty());
        assert_eq!(run.mask_strategy, MaskStrategy::KeepFirstLast);
    }

    #[test]
    fn test_cloud_pair_must_be_complete() {
        let result = CliArgs::try_parse_from([
            "bruno-xray",
            "download-dataset",
            "BRU-1",
            "--jira-url",
            "u",
            "--xray-client-id",
            "id",
        ]);
        // Only fails when XRAY_CLIENT_SECRET is not set in the environment
        if std::env::var_os("XRAY_CLIENT_SECRET").is_none() {
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_dry_run_needs_no_credentials() {
        let args = parse(&[
            "upload-results",
            "results.json",
            "--jira-url",
            "u",
            "--project-key",
            "BRU",
            "--output",
            "xray.json",
        ]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_empty_bruno_command_rejected() {
        let args = parse(&["run-suite", "suite.json", "--jira-token", "t", "--bruno-command", " "]);
        assert_eq!(args.validate().unwrap_err(), "--bruno-command must not be empty");
    }
}
