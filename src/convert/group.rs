//! Grouping of Bruno request results by the Jira test issues they belong to.

use crate::types::{BrunoIteration, Parameters, RequestResult};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    // Input:  'abc CYP-123 def BFG-664 asoi//QRT-3636'
    // Output: ['CYP-123', 'BFG-664', 'QRT-3636']
    static ref ISSUE_KEY: Regex = Regex::new(r"[A-Za-z0-9_]+-[0-9]+").expect("valid issue key pattern");
}

/// All requests of one iteration attributed to one test issue
#[derive(Debug, Clone, PartialEq)]
pub struct IterationGroup<'a> {
    pub iteration_index: usize,
    pub parameters: Parameters,
    pub requests: Vec<&'a RequestResult>,
}

/// Extract every issue key embedded in a source identifier, in order of appearance.
pub fn extract_issue_keys(identifier: &str) -> Vec<&str> {
    ISSUE_KEY.find_iter(identifier).map(|m| m.as_str()).collect()
}

/// Group results by issue key.
///
/// Keys appear in order of first encounter; each key's iterations are sorted by
/// iteration index.
pub fn group<'a>(
    iterations: &'a [BrunoIteration],
    parameters: Option<&[Parameters]>,
) -> Vec<(String, Vec<IterationGroup<'a>>)> {
    let mut groups: Vec<(String, Vec<IterationGroup<'a>>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for iteration in iterations {
        for result in &iteration.results {
            for key in extract_issue_keys(result.source_identifier()) {
                let position = *positions.entry(key.to_string()).or_insert_with(|| {
                    groups.push((key.to_string(), Vec::new()));
                    groups.len() - 1
                });
                let buckets = &mut groups[position].1;

                match buckets.iter_mut().find(|b| b.iteration_index == iteration.iteration_index) {
                    Some(bucket) => bucket.requests.push(result),
                    None => buckets.push(IterationGroup {
                        iteration_index: iteration.iteration_index,
                        parameters: parameters_for(parameters, iteration.iteration_index),
                        requests: vec![result],
                    }),
                }
            }
        }
    }

    for (key, buckets) in &mut groups {
        buckets.sort_by_key(|b| b.iteration_index);
        debug!("{}: {} iteration(s)", key, buckets.len());
    }

    groups
}

fn parameters_for(parameters: Option<&[Parameters]>, index: usize) -> Parameters {
    match parameters {
        Some(rows) => rows.get(index).cloned().unwrap_or_else(|| {
            debug!("no parameter row for iteration {}", index);
            Parameters::new()
        }),
        None => Parameters::new(),
    }
}
