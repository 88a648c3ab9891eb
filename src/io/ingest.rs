//! CSV ingest of tabulated profiles.
//!
//! The CSV holds one sample per row with an abscissa column (`x`, `v` or
//! `velocity`) and a value column (`f`, `y` or `value`); header names are
//! case-insensitive. Bad rows are skipped and reported, rows are sorted by
//! abscissa, and the result must still form a valid [`SampledProfile`].

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::data::SampledProfile;
use crate::error::GhError;

const X_COLUMNS: [&str; 3] = ["x", "v", "velocity"];
const F_COLUMNS: [&str; 3] = ["f", "y", "value"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the profile plus what happened to each row.
#[derive(Debug, Clone)]
pub struct IngestedProfile {
    pub profile: SampledProfile,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

impl IngestedProfile {
    pub fn rows_used(&self) -> usize {
        self.profile.xs().len()
    }
}

/// Load a tabulated profile from a CSV file.
pub fn load_profile_csv(path: &Path) -> Result<IngestedProfile, GhError> {
    let file = File::open(path)
        .map_err(|e| GhError::Io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_profile_csv(file)
}

/// Load a tabulated profile from any CSV source.
pub fn read_profile_csv<R: Read>(source: R) -> Result<IngestedProfile, GhError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| GhError::Parse(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    let x_col = find_column(&header_map, &X_COLUMNS)?;
    let f_col = find_column(&header_map, &F_COLUMNS)?;

    let mut samples = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    for (idx, result) in reader.records().enumerate() {
        // records start on the line after the header, lines are 1-based
        let line = idx + 2;
        rows_read += 1;
        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, x_col, f_col));
        match parsed {
            Ok(sample) => samples.push(sample),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }
    if !row_errors.is_empty() {
        log::warn!("skipped {} of {rows_read} CSV rows", row_errors.len());
    }

    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (xs, ys): (Vec<f64>, Vec<f64>) = samples.into_iter().unzip();
    let profile = SampledProfile::new(xs, ys)?;

    Ok(IngestedProfile {
        profile,
        rows_read,
        row_errors,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Strip a UTF-8 BOM some spreadsheet tools put before the first header.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Result<usize, GhError> {
    names
        .iter()
        .find_map(|n| header_map.get(*n).copied())
        .ok_or_else(|| {
            GhError::Parse(format!(
                "CSV is missing a column named one of: {}",
                names.join(", ")
            ))
        })
}

fn parse_row(record: &StringRecord, x_col: usize, f_col: usize) -> Result<(f64, f64), String> {
    let x = parse_number(record, x_col, "x")?;
    let f = parse_number(record, f_col, "f")?;
    Ok((x, f))
}

fn parse_number(record: &StringRecord, col: usize, label: &str) -> Result<f64, String> {
    let raw = record
        .get(col)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing {label} value"))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("invalid {label} value '{raw}'"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite {label} value '{raw}'"))
    }
}
