//! corral registry: identifier validation and the organization registry
//! service.

pub mod config;
pub mod error;
pub mod service;
pub mod validation;

pub use config::RegistryConfig;
pub use error::ValidationError;
pub use service::{CreateOrganization, OrganizationChanges, OrganizationService, OtherFields};
