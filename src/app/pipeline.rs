//! Shared pipeline logic behind `gh fit` and `gh matrix`.
//!
//! Keeping this in one place separates the workflow
//! (profile -> expansions for every order -> quality -> export document)
//! from presentation (printing).

use rayon::prelude::*;

use crate::data::{Profile, SyntheticProfile};
use crate::domain::{ExpansionConfig, MatrixConfig, RunConfig};
use crate::error::GhError;
use crate::io::{ExpansionFile, IngestedProfile, MatrixFile, expansion_file, load_profile_csv};
use crate::models::{GaussHermiteExpansion, GaussHermiteMatrix, gauss_hermite_matrix};
use crate::report::{ReconstructionQuality, compute_quality};

/// Grid points used to measure reconstruction quality.
pub const QUALITY_POINTS: usize = 401;

/// All computed outputs of a single `gh fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub profile: Profile,
    pub label: String,
    pub range: (f64, f64),
    /// Analytic integral, when the profile is synthetic.
    pub integral: Option<f64>,
    /// Present when the profile came from a CSV file.
    pub ingest: Option<IngestSummary>,
    /// One expansion per requested order, in request order.
    pub expansions: Vec<GaussHermiteExpansion>,
    pub quality: Vec<ReconstructionQuality>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub rows_used: usize,
    pub rows_skipped: usize,
}

impl From<&IngestedProfile> for IngestSummary {
    fn from(ingest: &IngestedProfile) -> Self {
        Self {
            rows_read: ingest.rows_read,
            rows_used: ingest.rows_used(),
            rows_skipped: ingest.row_errors.len(),
        }
    }
}

impl RunOutput {
    pub fn export_document(&self) -> ExpansionFile {
        expansion_file(&self.label, &self.profile, self.range, &self.expansions)
    }
}

/// Execute the full expansion pipeline and return the computed outputs.
pub fn run_fit(config: &RunConfig) -> Result<RunOutput, GhError> {
    if config.orders.is_empty() {
        return Err(GhError::InvalidOrder(0));
    }
    // Fail fast on the first bad order before doing any work.
    if let Some(&bad) = config.orders.iter().find(|&&m| m < crate::models::MIN_ORDER) {
        return Err(GhError::InvalidOrder(bad));
    }

    // 1) Build the profile.
    let (profile, integral, ingest) = match &config.input_csv {
        Some(path) => {
            let ingest = load_profile_csv(path)?;
            let summary = IngestSummary::from(&ingest);
            (Profile::Sampled(ingest.profile), None, Some(summary))
        }
        None => {
            let integral = SyntheticProfile::new(config.profile.clone())?.integral();
            let profile = Profile::from_spec(&config.profile, config.sampling.as_ref())?;
            (profile, Some(integral), None)
        }
    };
    let range = profile.range();
    let label = profile.label();
    log::info!("profile {label} on [{:.4}, {:.4}]", range.0, range.1);

    // 2) Expand for every order; instances are independent.
    let expansions = config
        .orders
        .par_iter()
        .map(|&order| {
            let expansion_config = ExpansionConfig {
                order,
                envelope: config.envelope,
                strategy: config.strategy,
                lm: config.lm,
            };
            GaussHermiteExpansion::from_config(&profile, &expansion_config)
        })
        .collect::<Result<Vec<_>, _>>()?;

    // 3) Reconstruction quality.
    let quality = expansions
        .iter()
        .map(|gh| compute_quality(&profile, gh, range, QUALITY_POINTS))
        .collect::<Result<Vec<_>, _>>()?;
    for q in &quality {
        log::info!(
            "order {}: rms={:.3e}, rel-L2={:.3e}",
            q.order,
            q.rms,
            q.relative_l2
        );
    }

    Ok(RunOutput {
        profile,
        label,
        range,
        integral,
        ingest,
        expansions,
        quality,
    })
}

/// Build the basis-to-GH matrix of a `gh matrix` run.
pub fn run_matrix(config: &MatrixConfig) -> Result<(GaussHermiteMatrix, MatrixFile), GhError> {
    let matrix = gauss_hermite_matrix(config.degree, &config.grid, config.order, &config.envelope)?;
    log::info!(
        "matrix {}x{} for degree {}",
        matrix.order() + 1,
        matrix.num_functions(),
        config.degree
    );
    let doc = MatrixFile::new(config.degree, &config.grid, &matrix);
    Ok((matrix, doc))
}
