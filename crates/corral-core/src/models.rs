//! Domain models for corral.
//!
//! These are the core types shared across all crates.

pub mod organization;
pub mod reindex;
