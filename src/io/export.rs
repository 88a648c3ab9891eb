//! JSON exports of expansions and basis-to-GH matrices.
//!
//! Expansion JSON carries, per order, the envelope, the coefficients, the
//! integral and the fit diagnostics, plus a precomputed grid of the profile and
//! every reconstruction for quick plotting elsewhere.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Envelope, FitReport, ScalarFunction};
use crate::error::GhError;
use crate::models::{GaussHermiteExpansion, GaussHermiteMatrix};

/// Points of the precomputed grid.
pub const EXPORT_GRID_POINTS: usize = 201;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionRecord {
    pub order: usize,
    pub envelope: Envelope,
    pub coefficients: Vec<f64>,
    pub norm: f64,
    pub fit: Option<FitReport>,
}

impl From<&GaussHermiteExpansion> for ExpansionRecord {
    fn from(gh: &GaussHermiteExpansion) -> Self {
        Self {
            order: gh.order(),
            envelope: *gh.envelope(),
            coefficients: gh.coefficients().to_vec(),
            norm: gh.norm(),
            fit: gh.fit_report().cloned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileGrid {
    pub x: Vec<f64>,
    pub profile: Vec<f64>,
    /// One row per exported expansion, in the same order.
    pub reconstructions: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionFile {
    pub tool: String,
    pub profile: String,
    pub expansions: Vec<ExpansionRecord>,
    pub grid: ProfileGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixFile {
    pub tool: String,
    pub degree: usize,
    pub order: usize,
    pub grid: Vec<f64>,
    pub envelope: Envelope,
    /// `order + 1` rows of `num_functions` entries.
    pub rows: Vec<Vec<f64>>,
}

impl MatrixFile {
    pub fn new(degree: usize, grid: &[f64], matrix: &GaussHermiteMatrix) -> Self {
        Self {
            tool: "gh".to_string(),
            degree,
            order: matrix.order(),
            grid: grid.to_vec(),
            envelope: *matrix.envelope(),
            rows: (0..=matrix.order()).map(|m| matrix.row(m)).collect(),
        }
    }
}

/// Assemble the expansion JSON document.
pub fn expansion_file<F: ScalarFunction + ?Sized>(
    label: &str,
    profile: &F,
    range: (f64, f64),
    expansions: &[GaussHermiteExpansion],
) -> ExpansionFile {
    let (lo, hi) = range;
    let n = EXPORT_GRID_POINTS;
    let x: Vec<f64> = (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect();
    let grid = ProfileGrid {
        profile: x.iter().map(|&xi| profile.value(xi)).collect(),
        reconstructions: expansions
            .iter()
            .map(|gh| x.iter().map(|&xi| gh.value(xi)).collect())
            .collect(),
        x,
    };
    ExpansionFile {
        tool: "gh".to_string(),
        profile: label.to_string(),
        expansions: expansions.iter().map(ExpansionRecord::from).collect(),
        grid,
    }
}

pub fn write_expansions_json(path: &Path, doc: &ExpansionFile) -> Result<(), GhError> {
    write_json(path, doc, "expansion")
}

pub fn write_matrix_json(path: &Path, doc: &MatrixFile) -> Result<(), GhError> {
    write_json(path, doc, "matrix")
}

pub fn read_expansions_json(path: &Path) -> Result<ExpansionFile, GhError> {
    let file = File::open(path).map_err(|e| {
        GhError::Io(format!(
            "Failed to open expansion JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::from_reader(file).map_err(|e| GhError::Parse(format!("Invalid expansion JSON: {e}")))
}

fn write_json<T: Serialize>(path: &Path, doc: &T, what: &str) -> Result<(), GhError> {
    let file = File::create(path).map_err(|e| {
        GhError::Io(format!(
            "Failed to create {what} JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, doc)
        .map_err(|e| GhError::Io(format!("Failed to write {what} JSON: {e}")))?;
    log::info!("wrote {what} JSON to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gauss_hermite_matrix;

    fn gaussian(x: f64) -> f64 {
        (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
    }

    #[test]
    fn expansion_file_round_trips_through_disk() {
        let env = Envelope::new(1.0, 0.0, 1.0);
        let expansions = vec![
            GaussHermiteExpansion::with_envelope(&gaussian, 2, env).unwrap(),
            GaussHermiteExpansion::with_envelope(&gaussian, 4, env).unwrap(),
            GaussHermiteExpansion::fit(&gaussian, 6).unwrap(),
        ];
        let doc = expansion_file("gaussian", &gaussian, (-5.0, 5.0), &expansions);
        assert_eq!(doc.grid.x.len(), EXPORT_GRID_POINTS);
        assert_eq!(doc.grid.reconstructions.len(), 3);
        assert!(doc.expansions[2].fit.is_some());
        assert_eq!(doc.expansions[1].order, 4);
        assert!((doc.expansions[0].norm - 1.0).abs() < 1e-10);

        let path = std::env::temp_dir().join(format!("gh-export-{}.json", std::process::id()));
        write_expansions_json(&path, &doc).unwrap();
        let back = read_expansions_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, doc);
    }

    #[test]
    fn matrix_file_keeps_shape() {
        let grid = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let env = Envelope::new(1.0, 0.0, 1.0);
        let mat = gauss_hermite_matrix(2, &grid, 3, &env).unwrap();
        let doc = MatrixFile::new(2, &grid, &mat);
        assert_eq!(doc.rows.len(), 4);
        assert!(doc.rows.iter().all(|r| r.len() == 6));
        let json = serde_json::to_string(&doc).unwrap();
        let back: MatrixFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let doc = MatrixFile::new(
            0,
            &[0.0, 1.0],
            &gauss_hermite_matrix(0, &[0.0, 1.0], 2, &Envelope::new(1.0, 0.0, 1.0)).unwrap(),
        );
        let err = write_matrix_json(Path::new("/nonexistent/dir/m.json"), &doc).unwrap_err();
        assert!(matches!(err, GhError::Io(_)));
    }
}
