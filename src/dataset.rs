/// Dataset handling for data-driven runs
///
/// This module handles:
/// - Parsing CSV datasets into per-iteration parameter rows
/// - Downloading datasets from Xray test issues to disk
use crate::api::XrayClient;
use crate::types::Parameters;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse CSV text with a header row into one parameter record per data row.
///
/// Column order is preserved and empty lines are skipped.
pub fn parse_parameters(content: &str) -> Result<Vec<Parameters>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Parameters =
            headers.iter().zip(record.iter()).map(|(name, value)| (name.to_string(), value.to_string())).collect();
        rows.push(row);
    }

    debug!("parsed {} dataset row(s) with columns {:?}", rows.len(), headers);
    Ok(rows)
}

/// Read and parse a CSV dataset file
pub fn read_parameters(path: &Path) -> Result<Vec<Parameters>, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read dataset {}: {}", path.display(), e))?;
    parse_parameters(&content).map_err(|e| format!("Failed to parse dataset {}: {}", path.display(), e))
}

/// Write dataset content, creating parent directories as needed
pub fn save_dataset(content: &str, destination: &Path) -> std::io::Result<()> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(destination, content)
}

/// Download the dataset of a test issue and save it
///
/// Returns the absolute path the dataset was written to.
pub fn download_dataset(client: &XrayClient, issue_key: &str, output: &Path) -> Result<PathBuf, String> {
    let content = client
        .download_dataset(issue_key)
        .map_err(|e| format!("Failed to download dataset of {}: {}", issue_key, e))?;
    let destination = if output.is_absolute() {
        output.to_path_buf()
    } else {
        std::env::current_dir().map_err(|e| e.to_string())?.join(output)
    };
    save_dataset(&content, &destination)
        .map_err(|e| format!("Failed to write dataset to {}: {}", destination.display(), e))?;
    debug!("dataset of {} written to {:?}", issue_key, destination);
    Ok(destination)
}
