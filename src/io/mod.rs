//! Input/output helpers.
//!
//! - CSV ingest of tabulated profiles (`ingest`)
//! - JSON exports of expansions and matrices (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
