//! Repository integration tests
//!
//! Exercise the SQLite repositories directly against a migrated temporary
//! database.

use chrono::{TimeZone, Utc};
use rstest::rstest;

use recordme_backend::{
    db::{self, DbPool, DealRepository, OrganizationRepository, RecordingRepository, UserRepository},
    models::{DealRequest, DerivedId, OrganizationRequest, RecordingRequest, Status, UserRequest},
};

use crate::common::test_database;

async fn pool_with_org(name: &str) -> DbPool {
    let pool = db::init_pool(&test_database())
        .await
        .expect("Failed to initialize test database");

    OrganizationRepository::new(&pool)
        .upsert(&OrganizationRequest {
            name: name.to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    pool
}

fn user(email: &str) -> UserRequest {
    UserRequest {
        org_id: Some("org_1".to_string()),
        email: Some(email.to_string()),
        ..Default::default()
    }
    .with_key_defaults(None, None)
}

fn recording(url: &str, participants: &[&str]) -> RecordingRequest {
    RecordingRequest {
        org_id: Some("org_1".to_string()),
        url: url.to_string(),
        participants: Some(participants.iter().map(|p| p.to_string()).collect()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_health_check_on_fresh_pool() {
    let pool = db::init_pool(&test_database()).await.unwrap();
    assert!(db::check_health(&pool).await.is_ok());
}

#[tokio::test]
async fn test_upsert_keeps_created_at_and_bumps_updated_at() {
    let pool = pool_with_org("org_1").await;
    let repo = OrganizationRepository::new(&pool);
    let first = repo.get_by_id("org_1").await.unwrap().unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    let second = repo
        .upsert(&OrganizationRequest {
            name: "org_1".to_string(),
            status: Some(Status::Pending),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(second.created_at, first.created_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.status, Status::Pending);
}

#[tokio::test]
async fn test_update_and_delete_of_missing_rows() {
    let pool = pool_with_org("org_1").await;

    let deals = DealRepository::new(&pool);
    let missing = DealRequest {
        name: "ghost".to_string(),
        ..Default::default()
    };
    assert!(deals.update(&missing).await.unwrap().is_none());
    assert!(!deals.delete("ghost").await.unwrap());

    let users = UserRepository::new(&pool);
    assert!(users.update(&user("ghost@test.com")).await.unwrap().is_none());
    assert!(!users.delete("ghost").await.unwrap());
}

#[tokio::test]
async fn test_read_or_insert_returns_existing_user() {
    let pool = pool_with_org("org_1").await;
    let repo = UserRepository::new(&pool);

    let created = repo.read_or_insert(&user("jane@test.com")).await.unwrap();
    assert_eq!(created.name.as_deref(), Some("jane"));

    let again = repo
        .read_or_insert(&UserRequest {
            name: Some("Changed".to_string()),
            ..user("jane@test.com")
        })
        .await
        .unwrap();

    assert_eq!(again, created);
    assert_eq!(repo.list_by_org("org_1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_update_leaves_key_fields_alone() {
    let pool = pool_with_org("org_1").await;
    let repo = UserRepository::new(&pool);
    let created = repo.upsert(&user("jane@test.com")).await.unwrap();

    let updated = repo
        .update(&UserRequest {
            org_id: Some("org_1".to_string()),
            email: Some("jane@test.com".to_string()),
            role: Some("manager".to_string()),
            ..Default::default()
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.email, created.email);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.role.as_deref(), Some("manager"));
}

#[tokio::test]
async fn test_recording_keeps_client_timestamp() {
    let pool = pool_with_org("org_1").await;
    let repo = RecordingRepository::new(&pool);
    let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

    let req = RecordingRequest {
        created_at: Some(created_at),
        ..recording("https://www.google.com", &[])
    };
    let stored = repo.upsert(&req).await.unwrap();

    assert_eq!(stored.id, req.derived_id());
    assert_eq!(stored.created_at, created_at);
}

#[tokio::test]
async fn test_recording_requires_existing_deal() {
    let pool = pool_with_org("org_1").await;
    let repo = RecordingRepository::new(&pool);

    let orphan = RecordingRequest {
        deal_id: Some("no-such-deal".to_string()),
        ..recording("https://rec.test/1", &[])
    };
    assert!(repo.upsert(&orphan).await.is_err());

    DealRepository::new(&pool)
        .upsert(&DealRequest {
            org_id: Some("org_1".to_string()),
            name: "no-such-deal".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(repo.upsert(&orphan).await.is_ok());
}

#[rstest]
#[case("alice@test.com", 2)]
#[case("bob@test.com", 1)]
#[case("carol@test.com", 0)]
#[tokio::test]
async fn test_list_for_participant(#[case] email: &str, #[case] expected: usize) {
    let pool = pool_with_org("org_1").await;
    let repo = RecordingRepository::new(&pool);

    repo.upsert(&recording("https://rec.test/1", &["alice@test.com"]))
        .await
        .unwrap();
    repo.upsert(&recording(
        "https://rec.test/2",
        &["alice@test.com", "bob@test.com"],
    ))
    .await
    .unwrap();
    repo.upsert(&RecordingRequest {
        participants: None,
        ..recording("https://rec.test/3", &[])
    })
    .await
    .unwrap();

    let found = repo.list_for_participant("org_1", email).await.unwrap();
    assert_eq!(found.len(), expected);
    assert_eq!(repo.list_by_org("org_1").await.unwrap().len(), 3);
}
