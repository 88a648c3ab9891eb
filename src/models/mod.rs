//! GH expansion models.
//!
//! - direct coefficient integration for an explicit function (`coefficients`)
//! - the linear basis-to-GH map for spline-represented functions (`matrix`)
//! - the expansion object tying envelope fit and integration together (`expansion`)

pub mod coefficients;
pub mod expansion;
pub mod matrix;

pub use coefficients::*;
pub use expansion::*;
pub use matrix::*;
