//! Registry configuration.

/// Configuration for the organization registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Public base URL used to build canonical organization URLs
    /// (default: `http://localhost:8080`).
    pub base_url: String,
}

impl RegistryConfig {
    /// Canonical URL of an organization, e.g.
    /// `https://api.example.com/organizations/acme`.
    pub fn organization_url(&self, name: &str) -> String {
        format!("{}/organizations/{name}", self.base_url.trim_end_matches('/'))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".into(),
        }
    }
}
