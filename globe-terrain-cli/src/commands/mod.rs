//! CLI command implementations.

pub mod common;
pub mod elevation;
pub mod geodesy;
