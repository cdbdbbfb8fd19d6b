//! Builders for Bruno results used across the conversion tests.

use crate::types::{AssertionResult, BrunoIteration, OutcomeStatus, Request, RequestResult, Response, TestFile, TestOutcome};
use base64::{Engine as _, engine::general_purpose};
use std::collections::BTreeMap;

pub fn request(filename: &str) -> RequestResult {
    RequestResult {
        test: TestFile { filename: filename.to_string() },
        request: Request {
            method: "GET".to_string(),
            url: "http://localhost:8080/users".to_string(),
            headers: BTreeMap::from([("accept".to_string(), serde_json::json!("application/json"))]),
            data: None,
        },
        response: Response {
            status: Some(200),
            status_text: Some("OK".to_string()),
            headers: Some(BTreeMap::from([("content-type".to_string(), serde_json::json!("application/json"))])),
            data: serde_json::json!({ "name": "Jeff" }),
            response_time: Some(serde_json::Number::from(12u64)),
        },
        error: None,
        assertion_results: vec![],
        test_results: vec![],
        iteration_index: 0,
        suitename: filename.trim_end_matches(".bru").to_string(),
        runtime: None,
    }
}

pub fn iteration(index: usize, mut results: Vec<RequestResult>) -> BrunoIteration {
    for result in &mut results {
        result.iteration_index = index;
    }
    BrunoIteration { iteration_index: index, results, summary: None }
}

pub fn passed_test(description: &str) -> TestOutcome {
    TestOutcome {
        uid: format!("uid-{}", description),
        description: description.to_string(),
        status: OutcomeStatus::Pass,
        expected: None,
        actual: None,
        error: None,
    }
}

pub fn failed_test(description: &str, error: &str) -> TestOutcome {
    TestOutcome { status: OutcomeStatus::Fail, error: Some(error.to_string()), ..passed_test(description) }
}

pub fn failed_assertion(lhs: &str, rhs: &str, error: &str) -> AssertionResult {
    AssertionResult {
        uid: format!("uid-{}", lhs),
        lhs_expr: lhs.to_string(),
        rhs_expr: rhs.to_string(),
        operator: "eq".to_string(),
        rhs_operand: rhs.trim_start_matches("eq ").to_string(),
        status: OutcomeStatus::Fail,
        error: Some(error.to_string()),
    }
}

pub fn decode(data: &str) -> String {
    String::from_utf8(general_purpose::STANDARD.decode(data).expect("valid base64")).expect("utf-8 evidence")
}
