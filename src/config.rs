/// Configuration resolution module
///
/// This module handles:
/// - Loading test suite files (JSON or TOML)
/// - Migrating the legacy flat suite schema to the nested one
/// - Resolving credentials from CLI flags and environment variables
/// - Building test execution details from CLI flags
use crate::api::{Credentials, XrayClient};
use crate::cli::{AuthArgs, UploadArgs};
use crate::convert::TestExecutionDetails;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A suite of Bruno test directories sharing one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    pub config: SuiteConfig,
    pub tests: Vec<SuiteTest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub bruno: BrunoConfig,
    pub jira: JiraConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrunoConfig {
    /// Bruno environment to run against
    pub environment: String,
    /// CA certificate passed to Bruno, relative to the collection directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<PathBuf>,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Let Bruno write an HTML report and attach it as evidence
    #[serde(default)]
    pub html: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraConfig {
    pub url: String,
    /// Project in which new test execution issues are created
    pub project_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_execution: Option<TestExecutionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestExecutionConfig {
    /// Existing test execution issue to upload to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub details: TestExecutionDetails,
}

/// One Bruno directory to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteTest {
    pub directory: PathBuf,
    /// Test issue the directory belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetConfig {
    /// Test issue to download the dataset from when `location` is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_key: Option<String>,
    pub location: PathBuf,
}

/// Supported suite file syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    Json,
    Toml,
}

impl SuiteFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(SuiteFormat::Json),
            Some("toml") => Some(SuiteFormat::Toml),
            _ => None,
        }
    }
}

/// Load a suite file, picking the parser from the file extension
pub fn load_suite(path: &Path) -> Result<TestSuite, String> {
    let format = SuiteFormat::from_path(path)
        .ok_or_else(|| format!("Unsupported test suite file extension: {}", path.display()))?;
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    parse_suite(&content, format).map_err(|e| format!("Invalid test suite {}: {}", path.display(), e))
}

/// Parse suite content, migrating older layouts first
pub fn parse_suite(content: &str, format: SuiteFormat) -> Result<TestSuite, String> {
    let mut value: Value = match format {
        SuiteFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
        SuiteFormat::Toml => toml::from_str(content).map_err(|e| e.to_string())?,
    };
    if migrate_legacy_schema(&mut value) {
        debug!("Migrated legacy test suite layout");
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Rewrite older suite layouts into the nested `bruno`/`jira` schema.
///
/// Handles the flat layout (`environment`, `certFile`, `projectKey`, `url` and
/// `testExecution` directly under `config`) and test execution blocks whose
/// `summary`/`description` sit next to `key` instead of inside `details`.
/// Returns whether anything changed.
pub fn migrate_legacy_schema(suite: &mut Value) -> bool {
    let Some(config) = suite.get_mut("config").and_then(Value::as_object_mut) else {
        return false;
    };
    let mut changed = false;

    if !config.contains_key("bruno") && !config.contains_key("jira") {
        let mut bruno = Map::new();
        let mut jira = Map::new();
        for field in ["environment", "certFile"] {
            if let Some(value) = config.remove(field) {
                bruno.insert(field.to_string(), value);
            }
        }
        for field in ["url", "projectKey", "testExecution"] {
            if let Some(value) = config.remove(field) {
                jira.insert(field.to_string(), value);
            }
        }
        config.insert("bruno".to_string(), Value::Object(bruno));
        config.insert("jira".to_string(), Value::Object(jira));
        changed = true;
    }

    if let Some(execution) = config
        .get_mut("jira")
        .and_then(|jira| jira.get_mut("testExecution"))
        .and_then(Value::as_object_mut)
    {
        for field in ["summary", "description"] {
            if let Some(value) = execution.remove(field) {
                let details = execution.entry("details").or_insert_with(|| Value::Object(Map::new()));
                if let Some(details) = details.as_object_mut() {
                    details.entry(field).or_insert(value);
                }
                changed = true;
            }
        }
    }

    changed
}

/// Pick credentials from the provided flags: cloud pair, then token, then basic auth
pub fn credentials_from(auth: &AuthArgs) -> Option<Credentials> {
    if let (Some(client_id), Some(client_secret)) = (&auth.xray_client_id, &auth.xray_client_secret) {
        return Some(Credentials::Cloud { client_id: client_id.clone(), client_secret: client_secret.clone() });
    }
    if let Some(token) = &auth.jira_token {
        return Some(Credentials::ServerToken { token: token.clone() });
    }
    if let (Some(username), Some(password)) = (&auth.jira_username, &auth.jira_password) {
        return Some(Credentials::ServerBasic { username: username.clone(), password: password.clone() });
    }
    None
}

/// Like [`credentials_from`], but missing credentials are an error
pub fn resolve_credentials(auth: &AuthArgs) -> Result<Credentials, String> {
    credentials_from(auth).ok_or_else(|| {
        "One of [--xray-client-id ... --xray-client-secret ...] or [--jira-token ... --jira-url ...] must be provided"
            .to_string()
    })
}

/// Build the client for one invocation
pub fn build_client(auth: &AuthArgs, jira_url: &str) -> Result<XrayClient, String> {
    let credentials = resolve_credentials(auth)?;
    let cloud = matches!(credentials, Credentials::Cloud { .. });
    let client = XrayClient::new(credentials, jira_url);
    Ok(match &auth.xray_cloud_url {
        Some(url) if cloud => client.with_base_url(url),
        _ => client,
    })
}

/// Test execution details given on the command line
pub fn execution_details(args: &UploadArgs) -> TestExecutionDetails {
    TestExecutionDetails {
        summary: args.test_execution_summary.clone(),
        description: args.test_execution_description.clone(),
        version: args.test_execution_version.clone(),
        revision: args.test_execution_revision.clone(),
        user: args.test_execution_user.clone(),
        test_plan_key: args.test_execution_test_plan_key.clone(),
        test_environments: if args.test_execution_test_environment.is_empty() {
            None
        } else {
            Some(args.test_execution_test_environment.clone())
        },
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
