//! Server configuration loaded from `CORRAL_*` environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use corral_db::DbConfig;
use corral_pki::ProvisionerConfig;
use corral_registry::RegistryConfig;
use corral_reindex::ReindexConfig;

use crate::shim::ResponseMode;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Response contract served by this deployment. Chosen once at startup.
    pub response_mode: ResponseMode,
    pub db: DbConfig,
    pub registry: RegistryConfig,
    pub provisioner: ProvisionerConfig,
    pub reindex: ReindexConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr: SocketAddr = env_or("CORRAL_BIND", DEFAULT_BIND)
            .parse()
            .with_context(|| "parse CORRAL_BIND")?;
        let response_mode = env_or("CORRAL_RESPONSE_MODE", "current")
            .parse::<ResponseMode>()
            .map_err(anyhow::Error::msg)
            .with_context(|| "parse CORRAL_RESPONSE_MODE")?;

        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: env_or("CORRAL_DB_URL", &db_defaults.url),
            namespace: env_or("CORRAL_DB_NAMESPACE", &db_defaults.namespace),
            database: env_or("CORRAL_DB_DATABASE", &db_defaults.database),
            username: std::env::var("CORRAL_DB_USER").ok().or(db_defaults.username),
            password: std::env::var("CORRAL_DB_PASSWORD").ok().or(db_defaults.password),
        };

        let registry = RegistryConfig {
            base_url: env_or("CORRAL_BASE_URL", &RegistryConfig::default().base_url),
        };

        let mut provisioner = ProvisionerConfig::default();
        if let Ok(bits) = std::env::var("CORRAL_RSA_KEY_BITS") {
            provisioner.rsa_key_bits = bits.parse().with_context(|| "parse CORRAL_RSA_KEY_BITS")?;
        }

        let mut reindex = ReindexConfig::default();
        if let Ok(value) = std::env::var("CORRAL_REINDEX_CONCURRENCY") {
            reindex.concurrency = value
                .parse()
                .with_context(|| "parse CORRAL_REINDEX_CONCURRENCY")?;
        }
        if let Ok(value) = std::env::var("CORRAL_REINDEX_TIMEOUT_SECS") {
            let secs: u64 = value
                .parse()
                .with_context(|| "parse CORRAL_REINDEX_TIMEOUT_SECS")?;
            reindex.call_timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            bind_addr,
            response_mode,
            db,
            registry,
            provisioner,
            reindex,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            response_mode: ResponseMode::Current,
            db: DbConfig::default(),
            registry: RegistryConfig::default(),
            provisioner: ProvisionerConfig::default(),
            reindex: ReindexConfig::default(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
