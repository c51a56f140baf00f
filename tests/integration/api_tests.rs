//! API integration tests
//!
//! Tests the API endpoints with real HTTP requests against a local-environment
//! application, authenticating with unverified tokens.

use serde_json::{json, Value};

use crate::common::*;

/// Local application whose caller is `test@test.com` in organization `org_1`
async fn app() -> TestApp {
    TestApp::new().await.with_token(unsigned_token(&json!({
        "sub": "auth0|user-1",
        "org_id": "org_abc",
        "org_name": "org_1",
        "user_email": "test@test.com"
    })))
}

async fn app_with_org(name: &str) -> TestApp {
    let app = app().await;
    app.post_json("/api/v1/org", json!({"name": name}))
        .await
        .assert_created();
    app
}

#[tokio::test]
async fn test_probes_need_no_authentication() {
    let app = TestApp::new().await;

    let response = app.get("/healthcheck").await;
    response.assert_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "OK"}));

    let response = app.get("/startup").await;
    response.assert_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "OK"}));

    let response = app.get("/readiness").await;
    response.assert_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "Ready"}));
}

#[tokio::test]
async fn test_detailed_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/api/v1/health/detailed").await;

    response.assert_ok();

    let json: Value = response.json();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["environment"], "local");
    assert_eq!(json["components"]["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_readiness_fails_when_database_closed() {
    let app = TestApp::new().await;
    app.state.db.close().await;

    let response = app.get("/readiness").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>(),
        json!({"status": "Service Unavailable"})
    );
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let app = TestApp::new().await;

    for response in [app.get("/healthcheck").await, app.get("/api/v1/org").await] {
        assert_eq!(response.headers["x-frame-options"], "DENY");
        assert_eq!(response.headers["referrer-policy"], "no-referrer");
        assert_eq!(
            response.headers["strict-transport-security"],
            "max-age=31536000; includeSubDomains"
        );
        assert!(response.headers.contains_key("content-security-policy"));
    }
}

#[tokio::test]
async fn test_organization_crud() {
    let app = app().await;

    let response = app
        .post_json(
            "/api/v1/org",
            json!({"id": "ignored", "name": "acme", "domains": ["acme.com"]}),
        )
        .await;
    response.assert_created();
    let org: Value = response.json();
    assert_eq!(org["id"], "acme");
    assert_eq!(org["status"], "active");
    assert_eq!(org["domains"], json!(["acme.com"]));
    assert_eq!(org["meta"], json!({}));

    app.get("/api/v1/org/acme").await.assert_ok();

    let list: Vec<Value> = app.get("/api/v1/org").await.json();
    assert_eq!(list.len(), 1);

    let response = app
        .patch_json("/api/v1/org", json!({"name": "acme", "status": "inactive"}))
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert_eq!(updated["status"], "inactive");
    assert_eq!(updated["domains"], json!(["acme.com"]));

    let response = app.delete("/api/v1/org/acme").await;
    response.assert_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"detail": "Organization deleted successfully"})
    );

    app.get("/api/v1/org/acme").await.assert_not_found();
    app.delete("/api/v1/org/acme").await.assert_not_found();
}

#[tokio::test]
async fn test_organization_upsert_is_idempotent() {
    let app = app().await;

    let first: Value = app
        .post_json("/api/v1/org", json!({"name": "acme"}))
        .await
        .json();
    let second: Value = app
        .post_json("/api/v1/org", json!({"name": "acme", "meta": {"tier": "gold"}}))
        .await
        .json();

    assert_eq!(first["id"], second["id"]);
    assert_eq!(first["created_at"], second["created_at"]);
    assert_eq!(second["meta"], json!({"tier": "gold"}));

    let list: Vec<Value> = app.get("/api/v1/org").await.json();
    assert_eq!(list.len(), 1);
}

#[tokio::test]
async fn test_update_missing_organization_is_not_found() {
    let app = app().await;
    let response = app
        .patch_json("/api/v1/org", json!({"name": "ghost", "status": "failed"}))
        .await;

    response.assert_not_found();
    let json: Value = response.json();
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_empty_organization_name_is_rejected() {
    let app = app().await;
    app.post_json("/api/v1/org", json!({"name": ""}))
        .await
        .assert_unprocessable();
}

#[tokio::test]
async fn test_user_read_or_insert_and_update() {
    let app = app_with_org("org_1").await;

    let response = app
        .post_json(
            "/api/v1/user",
            json!({"org_id": "org_1", "email": "test@test.com"}),
        )
        .await;
    response.assert_created();
    let user: Value = response.json();
    assert_eq!(user["id"], "c425f0e5-dd6c-5994-992a-c4f2413aa699");
    assert_eq!(user["name"], "test");

    // Existing users are returned untouched
    let again: Value = app
        .post_json(
            "/api/v1/user",
            json!({"org_id": "org_1", "email": "test@test.com", "name": "Someone Else"}),
        )
        .await
        .json();
    assert_eq!(again["name"], "test");

    let response = app
        .patch_json(
            "/api/v1/user",
            json!({"org_id": "org_1", "email": "test@test.com", "role": "admin"}),
        )
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert_eq!(updated["role"], "admin");
    assert_eq!(updated["name"], "test");

    let users: Vec<Value> = app.get("/api/v1/user/org/org_1").await.json();
    assert_eq!(users.len(), 1);

    let response = app
        .delete("/api/v1/user/c425f0e5-dd6c-5994-992a-c4f2413aa699")
        .await;
    response.assert_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"detail": "User deleted successfully"})
    );
}

#[tokio::test]
async fn test_user_defaults_to_caller() {
    let app = app_with_org("org_1").await;

    let response = app.post_json("/api/v1/user", json!({})).await;
    response.assert_created();
    let user: Value = response.json();
    assert_eq!(user["org_id"], "org_1");
    assert_eq!(user["email"], "test@test.com");

    let response = app.get("/api/v1/user").await;
    response.assert_ok();
    assert_eq!(response.json::<Value>()["id"], user["id"]);

    let response = app
        .get("/api/v1/user?user_id=c425f0e5-dd6c-5994-992a-c4f2413aa699")
        .await;
    response.assert_ok();
}

#[tokio::test]
async fn test_user_patch_defaults_key_to_caller() {
    let app = app_with_org("org_1").await;
    app.post_json("/api/v1/user", json!({})).await.assert_created();

    let response = app
        .patch_json("/api/v1/user", json!({"role": "manager"}))
        .await;
    response.assert_ok();
    let updated: Value = response.json();
    assert_eq!(updated["id"], "c425f0e5-dd6c-5994-992a-c4f2413aa699");
    assert_eq!(updated["role"], "manager");
    assert_eq!(updated["name"], "test");
}

#[tokio::test]
async fn test_user_with_invalid_email_is_rejected() {
    let app = app_with_org("org_1").await;
    app.post_json(
        "/api/v1/user",
        json!({"org_id": "org_1", "email": "not-an-email"}),
    )
    .await
    .assert_unprocessable();
}

#[tokio::test]
async fn test_user_in_unknown_organization_conflicts() {
    let app = app().await;
    app.post_json(
        "/api/v1/user",
        json!({"org_id": "nowhere", "email": "test@test.com"}),
    )
    .await
    .assert_conflict();
}

#[tokio::test]
async fn test_deleting_organization_with_users_conflicts() {
    let app = app_with_org("org_1").await;
    app.post_json("/api/v1/user", json!({})).await.assert_created();

    app.delete("/api/v1/org/org_1").await.assert_conflict();
    app.get("/api/v1/org/org_1").await.assert_ok();
}

#[tokio::test]
async fn test_deal_crud() {
    let app = app_with_org("org_1").await;

    let response = app
        .post_json(
            "/api/v1/deal",
            json!({"org_id": "org_1", "name": "big-deal", "domain": "customer.com"}),
        )
        .await;
    response.assert_created();
    let deal: Value = response.json();
    assert_eq!(deal["id"], "big-deal");

    app.get("/api/v1/deal/big-deal").await.assert_ok();

    let deals: Vec<Value> = app.get("/api/v1/deal/org/org_1").await.json();
    assert_eq!(deals.len(), 1);

    let updated: Value = app
        .patch_json(
            "/api/v1/deal",
            json!({"name": "big-deal", "status": "completed"}),
        )
        .await
        .json();
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["domain"], "customer.com");

    let response = app.delete("/api/v1/deal/big-deal").await;
    response.assert_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"detail": "Deal deleted successfully"})
    );
    app.get("/api/v1/deal/big-deal").await.assert_not_found();
}

#[tokio::test]
async fn test_recording_crud() {
    let app = app_with_org("org_1").await;

    let response = app
        .post_json(
            "/api/v1/recorder",
            json!({
                "org_id": "org_1",
                "url": "https://www.google.com",
                "title": "Test Recording",
                "participants": ["test@test.com", "other@test.com"],
                "duration": 42.5
            }),
        )
        .await;
    response.assert_created();
    let recording: Value = response.json();
    let id = "46122b30-2e4d-5e5a-8fdf-2f662bd5da84";
    assert_eq!(recording["id"], id);
    assert_eq!(recording["duration"], 42.5);

    app.get(&format!("/api/v1/recorder/{}", id))
        .await
        .assert_ok();

    let updated: Value = app
        .patch_json(
            "/api/v1/recorder",
            json!({"org_id": "org_1", "url": "https://www.google.com", "title": "Renamed"}),
        )
        .await
        .json();
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["participants"], json!(["test@test.com", "other@test.com"]));

    let response = app.delete(&format!("/api/v1/recorder/{}", id)).await;
    response.assert_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({"detail": "Recording deleted successfully"})
    );
    app.get(&format!("/api/v1/recorder/{}", id))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn test_recording_with_client_timestamp() {
    let app = app_with_org("org_1").await;

    let recording: Value = app
        .post_json(
            "/api/v1/recorder",
            json!({
                "org_id": "org_1",
                "url": "https://www.google.com",
                "created_at": "2024-05-01T12:30:00Z"
            }),
        )
        .await
        .json();

    assert_eq!(recording["id"], "c02058c2-eade-5e21-bfe1-79273ebf9e62");
    assert!(recording["created_at"]
        .as_str()
        .unwrap()
        .starts_with("2024-05-01T12:30:00"));
}

#[tokio::test]
async fn test_recordings_by_participant() {
    let app = app_with_org("org_1").await;

    for (url, participants) in [
        ("https://rec.test/1", json!(["test@test.com"])),
        ("https://rec.test/2", json!(["test@test.com", "other@test.com"])),
        ("https://rec.test/3", json!(["other@test.com"])),
    ] {
        app.post_json(
            "/api/v1/recorder",
            json!({"org_id": "org_1", "url": url, "participants": participants}),
        )
        .await
        .assert_created();
    }

    let mine: Vec<Value> = app
        .get("/api/v1/recorder/org_1/test@test.com")
        .await
        .json();
    assert_eq!(mine.len(), 2);

    let nobody: Vec<Value> = app
        .get("/api/v1/recorder/org_1/nobody@test.com")
        .await
        .json();
    assert!(nobody.is_empty());
}

#[tokio::test]
async fn test_recording_organization_defaults_to_caller() {
    let app = app_with_org("org_1").await;

    let recording: Value = app
        .post_json("/api/v1/recorder", json!({"url": "https://rec.test/1"}))
        .await
        .json();

    assert_eq!(recording["org_id"], "org_1");
}

#[tokio::test]
async fn test_recording_with_invalid_participant_is_rejected() {
    let app = app_with_org("org_1").await;
    app.post_json(
        "/api/v1/recorder",
        json!({"org_id": "org_1", "url": "https://rec.test/1", "participants": ["nope"]}),
    )
    .await
    .assert_unprocessable();
}

#[tokio::test]
async fn test_local_api_key_caller_uses_local_organization() {
    let app = TestApp::new().await.with_token(LOCAL_API_KEY);
    app.post_json("/api/v1/org", json!({"name": "local"}))
        .await
        .assert_created();

    let recording: Value = app
        .post_json("/api/v1/recorder", json!({"url": "https://rec.test/1"}))
        .await
        .json();

    assert_eq!(recording["org_id"], "local");
}
