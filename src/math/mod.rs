//! Mathematical utilities: Hermite polynomials, quadrature rules and
//! (nonlinear) least squares.

pub mod hermite;
pub mod lm;
pub mod ols;
pub mod quadrature;

pub use hermite::*;
pub use lm::*;
pub use ols::*;
pub use quadrature::*;
