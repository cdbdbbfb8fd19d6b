//! Conversion of Bruno JSON results into Xray import JSON.
//!
//! The pipeline is:
//!
//! 1. **Validate**: a dataset must provide one parameter row per iteration
//! 2. **Group**: requests are attributed to every issue key in their file name
//! 3. **Evaluate**: failures are collected per request and iteration
//! 4. **Build**: evidence and statuses are assembled per test issue
//!
//! Conversion is a pure function of its inputs; the caller reads files and
//! decides where the report goes.
//!
//! # Module Organization
//!
//! - `group` - Issue key extraction and grouping by iteration
//! - `status` - Request summaries and failure detection
//! - `evidence` - Evidence attachments and per-test results
//! - `types` - Xray import JSON model

pub mod evidence;
pub mod group;
pub mod status;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::mask::Masking;
use crate::types::{BrunoIteration, Parameters};
use log::debug;

pub use evidence::ReportAttachment;
pub use types::{TestExecutionDetails, TestExecutionInfo, XrayFormat, XrayReport};

/// Reasons a conversion can fail.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("must provide parameters for every iteration (iterations: {iterations}, parameter sets: {parameter_sets})")]
    ParameterCount { iterations: usize, parameter_sets: usize },

    #[error("No Xray tests found in Bruno JSON")]
    NoTests,

    #[error("failed to serialize request summaries: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything besides the results themselves that shapes the report.
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Decides the pass/fail vocabulary
    pub format: XrayFormat,
    /// One row per iteration for data-driven runs
    pub parameters: Option<Vec<Parameters>>,
    /// Overrides for the default test execution fields
    pub details: TestExecutionDetails,
    /// Existing test execution issue to import into
    pub execution_key: Option<String>,
    /// Values to hide in all evidence
    pub masking: Masking,
    /// Report file attached in front of every test's evidence
    pub report: Option<ReportAttachment>,
}

/// Convert Bruno iterations into an Xray report.
pub fn convert(iterations: &[BrunoIteration], options: &ConversionOptions) -> Result<XrayReport, ConversionError> {
    if let Some(parameters) = &options.parameters
        && parameters.len() != iterations.len()
    {
        return Err(ConversionError::ParameterCount { iterations: iterations.len(), parameter_sets: parameters.len() });
    }

    let vocabulary = options.format.vocabulary();
    let groups = group::group(iterations, options.parameters.as_deref());
    debug!("Converting {} iteration(s) into {} test(s)", iterations.len(), groups.len());

    let mut tests = Vec::with_capacity(groups.len());
    for (test_key, test_iterations) in &groups {
        let test = evidence::build_test(
            test_key,
            test_iterations,
            vocabulary,
            &options.masking,
            options.report.as_ref(),
        )?;
        debug!("{} -> {} ({} evidence file(s))", test.test_key, test.status, test.evidence.len());
        tests.push(test);
    }

    if tests.is_empty() {
        return Err(ConversionError::NoTests);
    }

    Ok(XrayReport {
        execution_key: options.execution_key.clone(),
        info: options.details.merge_onto(TestExecutionInfo::default()),
        tests,
    })
}
