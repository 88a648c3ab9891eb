//! Domain types used throughout the engine.
//!
//! This module defines:
//!
//! - the scalar function abstraction (`ScalarFunction`)
//! - envelope, moments and fit diagnostics (`Envelope`, `Moments`, `FitReport`)
//! - construction and run configuration (`ExpansionConfig`, `RunConfig`, `MatrixConfig`)

pub mod function;
pub mod types;

pub use function::*;
pub use types::*;
