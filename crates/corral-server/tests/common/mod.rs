use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use corral_pki::ProvisionerConfig;
use corral_registry::RegistryConfig;
use corral_reindex::ReindexConfig;
use corral_server::app::{AppState, build_router};
use corral_server::config::ServerConfig;
use corral_server::shim::ResponseMode;
use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};

pub const BASE_URL: &str = "http://corral.test";

/// Router over a fresh in-memory database.
pub async fn app(mode: ResponseMode) -> (Router, Surreal<Any>) {
    let db = any::connect("mem://").await.expect("mem db");
    db.use_ns("test").use_db("test").await.expect("ns");
    corral_db::run_migrations(&db).await.expect("migrations");

    let config = ServerConfig {
        response_mode: mode,
        registry: RegistryConfig {
            base_url: BASE_URL.into(),
        },
        provisioner: ProvisionerConfig { rsa_key_bits: 1024 },
        reindex: ReindexConfig {
            flush_interval: Duration::from_millis(10),
            ..Default::default()
        },
        ..Default::default()
    };
    (build_router(AppState::new(db.clone(), &config)), db)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    raw_request(method, uri, body.to_string())
}

pub fn raw_request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
