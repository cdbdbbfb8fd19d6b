//! Evidence attachments and per-test results.

use super::group::IterationGroup;
use super::status::{self, RequestSummary};
use super::types::{Evidence, IterationResult, Parameter, StatusVocabulary, XrayTest};
use crate::mask::Masking;
use base64::{Engine as _, engine::general_purpose};
use log::warn;
use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Name of the evidence file of a test executed exactly once
pub const SUMMARY_FILENAME: &str = "summary.json";

/// Parameter synthesized for every iteration of a data-driven test
pub const ITERATION_PARAMETER: &str = "iteration";

/// An external report file (usually Bruno's HTML report) attached to every test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Encode `data` as an evidence item.
pub fn evidence(data: &[u8], content_type: &str, filename: &str) -> Evidence {
    Evidence {
        data: general_purpose::STANDARD.encode(data),
        filename: filename.to_string(),
        content_type: content_type.to_string(),
    }
}

fn report_evidence(report: &ReportAttachment, masking: &Masking) -> Evidence {
    if masking.is_empty() {
        return evidence(&report.content, HTML_CONTENT_TYPE, &report.filename);
    }
    match std::str::from_utf8(&report.content) {
        Ok(text) => evidence(masking.apply(text).as_bytes(), HTML_CONTENT_TYPE, &report.filename),
        Err(e) => {
            warn!("Attaching {} unmasked, it is not valid UTF-8: {}", report.filename, e);
            evidence(&report.content, HTML_CONTENT_TYPE, &report.filename)
        }
    }
}

/// Mask every string (and object key) of a JSON tree.
///
/// Done before serializing, since escaped characters would hide a secret from
/// a plain text replace.
fn mask_json(value: Value, masking: &Masking) -> Value {
    match value {
        Value::String(s) => Value::String(masking.apply(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| mask_json(v, masking)).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (masking.apply(&k), mask_json(v, masking))).collect())
        }
        other => other,
    }
}

fn summary_evidence(
    summaries: &[RequestSummary<'_>],
    filename: &str,
    masking: &Masking,
) -> Result<Evidence, serde_json::Error> {
    let json = if masking.is_empty() {
        serde_json::to_string_pretty(summaries)?
    } else {
        serde_json::to_string_pretty(&mask_json(serde_json::to_value(summaries)?, masking))?
    };
    Ok(evidence(json.as_bytes(), JSON_CONTENT_TYPE, filename))
}

/// Build the result of one test issue from its iterations (sorted by index).
///
/// A single iteration produces a flat test with one `summary.json`. Several
/// iterations produce one sub-result and one evidence file per iteration.
pub fn build_test(
    test_key: &str,
    iterations: &[IterationGroup<'_>],
    vocabulary: StatusVocabulary,
    masking: &Masking,
    report: Option<&ReportAttachment>,
) -> Result<XrayTest, serde_json::Error> {
    let mut evidence = Vec::with_capacity(iterations.len() + 1);
    if let Some(report) = report {
        evidence.push(report_evidence(report, masking));
    }

    if let [single] = iterations {
        let summaries = status::evaluate(&single.requests);
        evidence.push(summary_evidence(&summaries, SUMMARY_FILENAME, masking)?);
        return Ok(XrayTest {
            test_key: test_key.to_string(),
            status: vocabulary.status(status::has_failure(&summaries)).to_string(),
            evidence,
            iterations: None,
        });
    }

    let mut results = Vec::with_capacity(iterations.len());
    for iteration in iterations {
        let summaries = status::evaluate(&iteration.requests);
        let iteration_status = vocabulary.status(status::has_failure(&summaries));
        let filename = format!("iteration {} {}.json", iteration.iteration_index + 1, iteration_status);
        evidence.push(summary_evidence(&summaries, &filename, masking)?);
        results.push(IterationResult { parameters: iteration_parameters(iteration), status: iteration_status.to_string() });
    }

    let failed = results.iter().any(|r| r.status == vocabulary.fail);
    Ok(XrayTest {
        test_key: test_key.to_string(),
        status: vocabulary.status(failed).to_string(),
        evidence,
        iterations: Some(results),
    })
}

/// The 1-based `iteration` parameter followed by the dataset columns.
///
/// A dataset column literally named `iteration` is dropped in favour of the
/// positional value.
fn iteration_parameters(iteration: &IterationGroup<'_>) -> Vec<Parameter> {
    let mut parameters =
        vec![Parameter { name: ITERATION_PARAMETER.to_string(), value: (iteration.iteration_index + 1).to_string() }];
    parameters.extend(
        iteration
            .parameters
            .iter()
            .filter(|(name, _)| name != ITERATION_PARAMETER)
            .map(|(name, value)| Parameter { name: name.clone(), value: value.clone() }),
    );
    parameters
}
