//! HTTP handlers.

pub mod error;
pub mod organizations;
pub mod payload;
pub mod reindex;
pub mod system;
