//! corral server: HTTP surface of the organization management service.

pub mod api;
pub mod app;
pub mod config;
pub mod shim;
