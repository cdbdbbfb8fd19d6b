//! Xray import JSON model.
//!
//! Field names follow the Xray "import execution results" format shared by the
//! server and cloud deployments; only the status strings differ between them.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DESCRIPTION: &str = "Generated from Bruno JSON report";
pub const DEFAULT_SUMMARY: &str = "Bruno test execution";

/// The document uploaded to the import endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayReport {
    /// Existing test execution issue to update instead of creating a new one
    #[serde(rename = "testExecutionKey", default, skip_serializing_if = "Option::is_none")]
    pub execution_key: Option<String>,
    pub info: TestExecutionInfo,
    pub tests: Vec<XrayTest>,
}

impl XrayReport {
    pub fn failed_tests(&self, vocabulary: StatusVocabulary) -> usize {
        self.tests.iter().filter(|t| t.status == vocabulary.fail).count()
    }
}

/// Test execution issue fields, after defaults have been applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestExecutionInfo {
    pub summary: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_plan_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_environments: Option<Vec<String>>,
}

impl Default for TestExecutionInfo {
    fn default() -> Self {
        Self {
            summary: DEFAULT_SUMMARY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            version: None,
            revision: None,
            user: None,
            test_plan_key: None,
            test_environments: None,
        }
    }
}

/// Caller supplied test execution fields; every present value overrides the default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestExecutionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_plan_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_environments: Option<Vec<String>>,
}

impl TestExecutionDetails {
    /// Shallow merge on top of `base`, key by key
    pub fn merge_onto(&self, base: TestExecutionInfo) -> TestExecutionInfo {
        TestExecutionInfo {
            summary: self.summary.clone().unwrap_or(base.summary),
            description: self.description.clone().unwrap_or(base.description),
            version: self.version.clone().or(base.version),
            revision: self.revision.clone().or(base.revision),
            user: self.user.clone().or(base.user),
            test_plan_key: self.test_plan_key.clone().or(base.test_plan_key),
            test_environments: self.test_environments.clone().or(base.test_environments),
        }
    }
}

/// One test issue's result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayTest {
    pub test_key: String,
    pub status: String,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<Vec<IterationResult>>,
}

/// Per-iteration result of a data-driven test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationResult {
    pub parameters: Vec<Parameter>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// A base64 encoded attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub data: String,
    pub filename: String,
    pub content_type: String,
}

/// Pass/fail strings of one Xray deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusVocabulary {
    pub pass: &'static str,
    pub fail: &'static str,
}

impl StatusVocabulary {
    pub const SERVER: StatusVocabulary = StatusVocabulary { pass: "PASS", fail: "FAIL" };
    pub const CLOUD: StatusVocabulary = StatusVocabulary { pass: "PASSED", fail: "FAILED" };

    pub fn status(&self, failed: bool) -> &'static str {
        if failed { self.fail } else { self.pass }
    }
}

/// Which Xray deployment the report targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum XrayFormat {
    #[default]
    Server,
    Cloud,
}

impl XrayFormat {
    pub fn vocabulary(&self) -> StatusVocabulary {
        match self {
            XrayFormat::Server => StatusVocabulary::SERVER,
            XrayFormat::Cloud => StatusVocabulary::CLOUD,
        }
    }
}
