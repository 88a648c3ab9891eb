//! Envelope estimation.
//!
//! Responsibilities:
//!
//! - classic moments of a function (initial guess)
//! - Levenberg-Marquardt refinement of amplitude, center and width

pub mod fitter;
pub mod moments;

pub use fitter::*;
pub use moments::*;
