//! Integration tests for the organization repository using in-memory
//! SurrealDB.

use corral_core::error::CorralError;
use corral_core::models::organization::{NewOrganization, UpdateOrganization};
use corral_core::repository::OrganizationRepository;
use corral_db::repository::SurrealOrganizationRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    corral_db::run_migrations(&db).await.unwrap();
    db
}

fn new_org(name: &str) -> NewOrganization {
    NewOrganization {
        name: name.into(),
        full_name: format!("Full {name}"),
        guid: Uuid::new_v4().simple().to_string(),
        org_type: None,
        validator_client_name: format!("{name}-validator"),
        validator_public_key: "-----BEGIN PUBLIC KEY-----".into(),
        validator_key_fingerprint: "ab".repeat(32),
    }
}

#[tokio::test]
async fn create_and_get_organization() {
    let repo = SurrealOrganizationRepository::new(setup().await);

    let input = new_org("acme");
    let guid = input.guid.clone();
    let org = repo.create(input).await.unwrap();

    assert_eq!(org.name, "acme");
    assert_eq!(org.full_name, "Full acme");
    assert_eq!(org.guid, guid);
    assert_eq!(org.validator_client_name, "acme-validator");

    let fetched = repo.get_by_name("acme").await.unwrap();
    assert_eq!(fetched, org);
}

#[tokio::test]
async fn get_missing_organization_is_not_found() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let result = repo.get_by_name("nope").await;
    assert!(matches!(result, Err(CorralError::NotFound { .. })));
}

#[tokio::test]
async fn duplicate_name_rejected() {
    let repo = SurrealOrganizationRepository::new(setup().await);

    let first = repo.create(new_org("dup")).await.unwrap();
    let result = repo.create(new_org("dup")).await;

    assert!(matches!(result, Err(CorralError::AlreadyExists { .. })));
    // The original record is untouched.
    assert_eq!(repo.get_by_name("dup").await.unwrap().guid, first.guid);
}

#[tokio::test]
async fn reused_guid_reports_collision() {
    let repo = SurrealOrganizationRepository::new(setup().await);

    let first = new_org("one");
    let mut second = new_org("two");
    second.guid = first.guid.clone();

    repo.create(first).await.unwrap();
    let result = repo.create(second).await;
    assert!(matches!(result, Err(CorralError::IdentifierCollision { .. })));
    assert!(repo.get_by_name("two").await.is_err());
}

#[tokio::test]
async fn concurrent_creates_with_same_name_yield_one_winner() {
    let repo = SurrealOrganizationRepository::new(setup().await);

    let a = new_org("race");
    let b = new_org("race");
    let (guid_a, guid_b) = (a.guid.clone(), b.guid.clone());

    let (ra, rb) = tokio::join!(repo.create(a), repo.create(b));
    let winners = [ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1, "exactly one create must succeed");

    let loser = if ra.is_ok() { rb } else { ra };
    assert!(matches!(loser, Err(CorralError::AlreadyExists { .. })));

    let stored = repo.get_by_name("race").await.unwrap();
    assert!(stored.guid == guid_a || stored.guid == guid_b);
}

#[tokio::test]
async fn rename_swaps_unique_key() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let org = repo.create(new_org("foo")).await.unwrap();

    let renamed = repo
        .update(
            "foo",
            UpdateOrganization {
                name: Some("bar".into()),
                full_name: Some("Bar Inc".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(renamed.name, "bar");
    assert_eq!(renamed.full_name, "Bar Inc");
    assert_eq!(renamed.guid, org.guid);
    assert_eq!(renamed.assigned_at, org.assigned_at);
    assert_eq!(renamed.validator_key_fingerprint, org.validator_key_fingerprint);
    assert!(repo.get_by_name("foo").await.is_err());

    // The old name is free again.
    repo.create(new_org("foo")).await.unwrap();
}

#[tokio::test]
async fn rename_onto_taken_name_leaves_record_untouched() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let foo = repo.create(new_org("foo")).await.unwrap();
    repo.create(new_org("bar")).await.unwrap();

    let result = repo
        .update(
            "foo",
            UpdateOrganization {
                name: Some("bar".into()),
                full_name: Some("Changed".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CorralError::AlreadyExists { .. })));

    let still_foo = repo.get_by_name("foo").await.unwrap();
    assert_eq!(still_foo.full_name, foo.full_name);
    assert_eq!(still_foo.guid, foo.guid);
}

#[tokio::test]
async fn rename_to_own_name_is_allowed() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    repo.create(new_org("same")).await.unwrap();

    let updated = repo
        .update(
            "same",
            UpdateOrganization {
                name: Some("same".into()),
                org_type: Some("Pleasure".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "same");
    assert_eq!(updated.org_type.as_deref(), Some("Pleasure"));
}

#[tokio::test]
async fn update_missing_organization_is_not_found() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let result = repo
        .update(
            "ghost",
            UpdateOrganization {
                full_name: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CorralError::NotFound { .. })));
}

#[tokio::test]
async fn delete_frees_the_name() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    let org = repo.create(new_org("gone")).await.unwrap();

    let removed = repo.delete("gone").await.unwrap();
    assert_eq!(removed.guid, org.guid);
    assert!(repo.get_by_name("gone").await.is_err());
    assert!(matches!(
        repo.delete("gone").await,
        Err(CorralError::NotFound { .. })
    ));

    let again = repo.create(new_org("gone")).await.unwrap();
    assert_ne!(again.guid, org.guid);
}

#[tokio::test]
async fn list_returns_every_live_organization() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    for name in ["charlie", "alpha", "bravo"] {
        repo.create(new_org(name)).await.unwrap();
    }
    repo.delete("bravo").await.unwrap();

    let names: Vec<String> = repo
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.name)
        .collect();
    assert_eq!(names, vec!["alpha", "charlie"]);
}

#[tokio::test]
async fn ping_succeeds_on_live_store() {
    let repo = SurrealOrganizationRepository::new(setup().await);
    repo.ping().await.unwrap();
}
