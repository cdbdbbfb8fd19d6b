/// Bruno result data structures
///
/// This module models the JSON report written by `bru run --output`. There is no
/// published schema for it, so every field the conversion does not strictly need
/// is optional or defaulted.
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Ordered parameter record for one data-driven iteration (column name, value)
pub type Parameters = Vec<(String, String)>;

/// One data-driven pass over a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrunoIteration {
    pub iteration_index: usize,
    #[serde(default)]
    pub results: Vec<RequestResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,
}

/// Counters Bruno computes per iteration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunSummary {
    pub total_requests: u64,
    pub passed_requests: u64,
    pub failed_requests: u64,
    pub total_assertions: u64,
    pub passed_assertions: u64,
    pub failed_assertions: u64,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
}

/// Outcome of a single request within an iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResult {
    pub test: TestFile,
    pub request: Request,
    pub response: Response,
    /// Set when the request could not be completed at all (e.g. connection refused)
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub assertion_results: Vec<AssertionResult>,
    #[serde(default)]
    pub test_results: Vec<TestOutcome>,
    #[serde(default)]
    pub iteration_index: usize,
    #[serde(default)]
    pub suitename: String,
    #[serde(default)]
    pub runtime: Option<Number>,
}

impl RequestResult {
    /// The free-text identifier issue keys are extracted from
    pub fn source_identifier(&self) -> &str {
        &self.test.filename
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFile {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Response descriptor; everything may be null when the transport failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub response_time: Option<Number>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResult {
    #[serde(default)]
    pub uid: String,
    pub lhs_expr: String,
    pub rhs_expr: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub rhs_operand: String,
    #[serde(default)]
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    #[serde(default)]
    pub uid: String,
    pub description: String,
    #[serde(default)]
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Bruno's own pass/fail marker (the conversion relies on `error` instead)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    #[default]
    Pass,
    Fail,
}

/// Parse the content of a Bruno JSON results file
pub fn parse_results(content: &str) -> Result<Vec<BrunoIteration>, serde_json::Error> {
    serde_json::from_str(content)
}
