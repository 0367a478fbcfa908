//! corral core: domain models, error types, and the traits every
//! storage, search and provisioning collaborator implements.

pub mod error;
pub mod models;
pub mod provisioning;
pub mod repository;
