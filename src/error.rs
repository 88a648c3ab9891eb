//! Crate-wide error type.
//!
//! Every fallible entry point returns `Result<_, GhError>`. The binary maps each
//! variant to a process exit code:
//!
//! - `2`: invalid input or configuration (bad order, degree, grid, envelope, files)
//! - `4`: numerical failure (a profile the engine cannot describe)

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GhError {
    #[error("GaussHermiteExpansion: order must be >= 2 (got {0})")]
    InvalidOrder(usize),

    #[error("Unsupported B-spline degree {0} (supported: 0, 1, 2, 3)")]
    UnsupportedDegree(usize),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid envelope (amplitude={amplitude}, center={center}, width={width}): {reason}")]
    InvalidEnvelope {
        amplitude: f64,
        center: f64,
        width: f64,
        reason: &'static str,
    },

    #[error("Dimension mismatch: expected {expected} values, got {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Degenerate profile: {0}")]
    DegenerateProfile(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("{0}")]
    Io(String),

    #[error("{0}")]
    Parse(String),
}

impl GhError {
    pub fn exit_code(&self) -> u8 {
        match self {
            GhError::DegenerateProfile(_) => 4,
            _ => 2,
        }
    }
}
