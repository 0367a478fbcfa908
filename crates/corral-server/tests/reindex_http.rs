mod common;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use common::{BASE_URL, app, empty_request, json_request, read_json};
use corral_core::models::reindex::ObjectType;
use corral_db::repository::SurrealObjectCatalog;
use corral_server::shim::ResponseMode;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(app: &Router, request: axum::http::Request<axum::body::Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    (status, read_json(response).await)
}

async fn org_guid(app: &Router, name: &str) -> String {
    let (status, org) = send(app, empty_request("GET", &format!("/organizations/{name}"))).await;
    assert_eq!(status, StatusCode::OK);
    org["guid"].as_str().unwrap().to_string()
}

/// Poll the job until it reaches a terminal state.
async fn wait_for_job(app: &Router, uri_path: &str) -> Value {
    for _ in 0..200 {
        let (status, job) = send(app, empty_request("GET", uri_path)).await;
        assert_eq!(status, StatusCode::OK);
        if matches!(job["status"].as_str(), Some("completed" | "partial_failure")) {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("reindex job did not finish");
}

#[tokio::test]
async fn reindex_runs_in_background_and_reports_progress() {
    let (app, db) = app(ResponseMode::Current).await;
    let (status, _) = send(
        &app,
        json_request("POST", "/organizations", json!({"name": "acme", "full_name": "Acme"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let guid = org_guid(&app, "acme").await;

    let catalog = SurrealObjectCatalog::new(db.clone());
    for i in 1..=3 {
        catalog
            .put_object(&guid, ObjectType::Node, &format!("node-{i}"), json!({"i": i}))
            .await
            .unwrap();
    }
    catalog
        .put_object(&guid, ObjectType::Client, "acme-validator", json!({"validator": true}))
        .await
        .unwrap();

    let (status, started) = send(&app, empty_request("POST", "/organizations/acme/_reindex")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = started["job_id"].as_str().unwrap().to_string();
    let uri = started["uri"].as_str().unwrap();
    let path = format!("/organizations/acme/_reindex/{job_id}");
    assert_eq!(uri, format!("{BASE_URL}{path}"));

    let job = wait_for_job(&app, &path).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["organization_name"], "acme");
    assert_eq!(job["organization_guid"], guid.as_str());
    assert_eq!(job["per_type_progress"]["node"]["submitted"], 3);
    assert_eq!(job["per_type_progress"]["client"]["submitted"], 1);
    assert_eq!(job["per_type_progress"]["role"]["submitted"], 0);
    assert_eq!(job["per_type_progress"]["node"]["failed"], 0);

    let (status, jobs) = send(&app, empty_request("GET", "/organizations/acme/_reindex")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(jobs.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reindex_unknown_organization_is_404() {
    let (app, _db) = app(ResponseMode::Current).await;
    let (status, body) = send(&app, empty_request("POST", "/organizations/ghost/_reindex")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn job_lookup_is_scoped_to_its_organization() {
    let (app, _db) = app(ResponseMode::Current).await;
    for name in ["acme", "other"] {
        send(
            &app,
            json_request("POST", "/organizations", json!({"name": name, "full_name": name})),
        )
        .await;
    }

    let (_, started) = send(&app, empty_request("POST", "/organizations/acme/_reindex")).await;
    let job_id = started["job_id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        empty_request("GET", &format!("/organizations/other/_reindex/{job_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        empty_request("GET", "/organizations/acme/_reindex/not-a-uuid"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        empty_request(
            "GET",
            &format!("/organizations/acme/_reindex/{}", uuid::Uuid::new_v4()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn renamed_organization_reindexes_its_objects_and_keeps_jobs() {
    let (app, db) = app(ResponseMode::Current).await;
    send(
        &app,
        json_request("POST", "/organizations", json!({"name": "foo", "full_name": "Foo"})),
    )
    .await;
    let guid = org_guid(&app, "foo").await;

    let catalog = SurrealObjectCatalog::new(db.clone());
    for i in 1..=3 {
        catalog
            .put_object(&guid, ObjectType::Node, &format!("node-{i}"), json!({"i": i}))
            .await
            .unwrap();
    }

    let (_, first) = send(&app, empty_request("POST", "/organizations/foo/_reindex")).await;
    let first_id = first["job_id"].as_str().unwrap().to_string();
    wait_for_job(&app, &format!("/organizations/foo/_reindex/{first_id}")).await;

    let (status, _) = send(
        &app,
        json_request("PUT", "/organizations/foo", json!({"name": "bar", "full_name": "Bar"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The earlier job is reachable under the new name.
    let (status, _) = send(
        &app,
        empty_request("GET", &format!("/organizations/bar/_reindex/{first_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, second) = send(&app, empty_request("POST", "/organizations/bar/_reindex")).await;
    let second_id = second["job_id"].as_str().unwrap();
    let job = wait_for_job(&app, &format!("/organizations/bar/_reindex/{second_id}")).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["per_type_progress"]["node"]["submitted"], 3);

    let (_, jobs) = send(&app, empty_request("GET", "/organizations/bar/_reindex")).await;
    assert_eq!(jobs.as_array().unwrap().len(), 2);
}
