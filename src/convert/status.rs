//! Pass/fail evaluation of Bruno requests.

use crate::types::{Request, RequestResult, Response};
use serde::Serialize;

/// Label of the failure entry recorded for a request that never got a response
pub const RUNNER_ERROR_LABEL: &str = "internal runner error";

/// Diagnostic summary of one request, serialized into the evidence files
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSummary<'a> {
    pub errors: Vec<FailureEntry>,
    pub request: &'a Request,
    pub response: &'a Response,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub error: String,
    pub test: String,
}

/// Summarize the requests of one iteration, collecting all of their failures.
pub fn evaluate<'a>(results: &[&'a RequestResult]) -> Vec<RequestSummary<'a>> {
    results.iter().copied().map(summarize).collect()
}

fn summarize(result: &RequestResult) -> RequestSummary<'_> {
    let mut errors = Vec::new();

    if let Some(error) = &result.error {
        errors.push(FailureEntry { error: error.clone(), test: RUNNER_ERROR_LABEL.to_string() });
    }

    for assertion in &result.assertion_results {
        if let Some(error) = &assertion.error {
            errors.push(FailureEntry {
                error: error.clone(),
                test: format!("{} {}", assertion.lhs_expr, assertion.rhs_expr),
            });
        }
    }

    for test in &result.test_results {
        if let Some(error) = &test.error {
            errors.push(FailureEntry { error: error.clone(), test: test.description.clone() });
        }
    }

    RequestSummary { errors, request: &result.request, response: &result.response }
}

/// True if any request of the iteration recorded a failure
pub fn has_failure(summaries: &[RequestSummary<'_>]) -> bool {
    summaries.iter().any(|s| !s.errors.is_empty())
}
