//! Login behavior: token issuance, single-session invariant, and the
//! deliberately generic failure message.

mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn login_returns_distinct_tokens_and_one_session() {
    let app = TestApp::spawn().await;
    let user_id = app.register("casey@example.com", "a sound passphrase").await;

    let (access, refresh) = app.login("casey@example.com", "a sound passphrase").await;

    assert!(!access.is_empty());
    assert!(!refresh.is_empty());
    assert_ne!(access, refresh);

    let session = app
        .state
        .sessions
        .find_by_owner(user_id)
        .await
        .unwrap()
        .expect("login left no session");
    assert_eq!(session.owner_id, user_id);
}

#[tokio::test]
async fn second_login_supersedes_the_first_session() {
    let app = TestApp::spawn().await;
    app.register("casey@example.com", "a sound passphrase").await;

    let (_, first_refresh) = app.login("casey@example.com", "a sound passphrase").await;
    let (_, second_refresh) = app.login("casey@example.com", "a sound passphrase").await;

    // The first refresh token was superseded and no longer rotates.
    let (status, body) = app
        .request(
            "POST",
            "/auth/refresh",
            Some(serde_json::json!({ "refresh_token": first_refresh })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Refresh token not found");

    let (status, _) = app
        .request(
            "POST",
            "/auth/refresh",
            Some(serde_json::json!({ "refresh_token": second_refresh })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_and_unknown_email_fail_identically() {
    let app = TestApp::spawn().await;
    app.register("casey@example.com", "a sound passphrase").await;

    let (wrong_status, wrong_body) = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "casey@example.com",
                "password": "not the passphrase"
            })),
            None,
        )
        .await;

    let (unknown_status, unknown_body) = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({
                "email": "nobody@example.com",
                "password": "a sound passphrase"
            })),
            None,
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["error"], unknown_body["error"]);
    assert_eq!(wrong_body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_rejects_malformed_email() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "email": "not-an-email", "password": "whatever" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = TestApp::spawn().await;
    app.register("casey@example.com", "a sound passphrase").await;

    let (status, body) = app
        .request(
            "POST",
            "/auth/register",
            Some(serde_json::json!({
                "email": "casey@example.com",
                "password": "another passphrase"
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}
