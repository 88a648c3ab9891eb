//! `gh-expansion` library crate.
//!
//! Gauss-Hermite (GH) expansions of one-dimensional profiles: a Gaussian
//! envelope times a truncated series of normalized Hermite polynomials, plus
//! the linear map taking B-spline coefficients to GH coefficients.
//!
//! The binary (`gh`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the numerical modules are reusable on their own

pub mod app;
pub mod basis;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;

pub use domain::{Envelope, ExpansionConfig, FitReport, FitStrategy, Moments, ScalarFunction};
pub use error::GhError;
pub use models::{
    GaussHermiteExpansion, GaussHermiteMatrix, gauss_hermite_coefficients, gauss_hermite_matrix,
    gauss_hermite_matrix_for,
};
