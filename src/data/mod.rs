//! Input profiles for the `gh` binary.

pub mod profile;

pub use profile::*;
