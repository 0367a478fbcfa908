//! HTTP application wiring: shared state and the router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use corral_db::DbManager;
use corral_db::repository::{
    SurrealObjectCatalog, SurrealOrganizationRepository, SurrealReindexJobRepository,
    SurrealSearchIndex,
};
use corral_pki::RsaProvisioner;
use corral_registry::OrganizationService;
use corral_reindex::Reindexer;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::config::ServerConfig;
use crate::shim::CompatibilityShim;

pub type OrganizationRegistry =
    OrganizationService<SurrealOrganizationRepository<Any>, RsaProvisioner>;

pub type OrganizationReindexer = Reindexer<
    SurrealOrganizationRepository<Any>,
    SurrealObjectCatalog<Any>,
    SurrealSearchIndex<Any>,
    SurrealReindexJobRepository<Any>,
>;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<OrganizationRegistry>,
    pub reindexer: Arc<OrganizationReindexer>,
    pub shim: CompatibilityShim,
}

impl AppState {
    /// Wire services over an already-migrated database handle.
    pub fn new(db: Surreal<Any>, config: &ServerConfig) -> Self {
        let registry = OrganizationService::new(
            SurrealOrganizationRepository::new(db.clone()),
            RsaProvisioner::new(config.provisioner.clone()),
            config.registry.clone(),
        );
        let reindexer = Reindexer::new(
            SurrealOrganizationRepository::new(db.clone()),
            SurrealObjectCatalog::new(db.clone()),
            SurrealSearchIndex::new(db.clone()),
            SurrealReindexJobRepository::new(db),
            config.reindex.clone(),
        );

        Self {
            registry: Arc::new(registry),
            reindexer: Arc::new(reindexer),
            shim: CompatibilityShim::new(config.response_mode),
        }
    }
}

/// Connect to SurrealDB, apply migrations and wire the services.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let manager = DbManager::connect(&config.db)
        .await
        .with_context(|| format!("connect to SurrealDB at {}", config.db.url))?;
    corral_db::run_migrations(manager.client())
        .await
        .with_context(|| "apply schema migrations")?;

    Ok(AppState::new(manager.client().clone(), config))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/_status", get(api::system::status))
        .route(
            "/organizations",
            get(api::organizations::list_organizations)
                .post(api::organizations::create_organization),
        )
        .route(
            "/organizations/:name",
            get(api::organizations::get_organization)
                .put(api::organizations::update_organization)
                .delete(api::organizations::delete_organization),
        )
        .route(
            "/organizations/:name/_reindex",
            get(api::reindex::list_reindex_jobs).post(api::reindex::start_reindex),
        )
        .route(
            "/organizations/:name/_reindex/:job_id",
            get(api::reindex::get_reindex_job),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
