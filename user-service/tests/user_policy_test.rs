//! Authorization policy inside mutation operations: customers reach
//! only themselves, root is unreachable, credential changes kill
//! sessions, and elevation requires privilege.

mod common;

use axum::http::StatusCode;
use common::{TestApp, ROOT_EMAIL, ROOT_PASSWORD};

async fn admin_token(app: &TestApp) -> String {
    let (root_access, _) = app.login(ROOT_EMAIL, ROOT_PASSWORD).await;
    let (status, _) = app
        .request(
            "POST",
            "/admin/users",
            Some(serde_json::json!({
                "email": "operator@example.com",
                "password": "operator-pass-1"
            })),
            Some(&root_access),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (access, _) = app.login("operator@example.com", "operator-pass-1").await;
    access
}

#[tokio::test]
async fn customer_reaching_another_account_sees_not_found() {
    let app = TestApp::spawn().await;
    let (_, alice_access, _) = app
        .register_and_login("alice@example.com", "a sound passphrase")
        .await;
    let bob_id = app.register("bob@example.com", "a different phrase").await;

    for (method, uri, body) in [
        ("GET", format!("/users/{bob_id}"), None),
        (
            "PATCH",
            format!("/users/{bob_id}"),
            Some(serde_json::json!({ "email": "hijack@example.com" })),
        ),
        ("DELETE", format!("/users/{bob_id}"), None),
        (
            "POST",
            format!("/users/{bob_id}/password"),
            Some(serde_json::json!({ "new_password": "hijacked-pass" })),
        ),
    ] {
        let (status, body) = app.request(method, &uri, body, Some(&alice_access)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "User not found", "{method} {uri}");
    }

    // Bob is untouched.
    let (bob_access, _) = app.login("bob@example.com", "a different phrase").await;
    let (status, _) = app
        .get_with_auth_header("/users/me", Some(&format!("Bearer {bob_access}")))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn customer_can_update_own_account() {
    let app = TestApp::spawn().await;
    let (alice_id, alice_access, _) = app
        .register_and_login("alice@example.com", "a sound passphrase")
        .await;

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/users/{alice_id}"),
            Some(serde_json::json!({ "email": "alice2@example.com" })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice2@example.com");
}

#[tokio::test]
async fn email_change_invalidates_the_session() {
    let app = TestApp::spawn().await;
    let (alice_id, alice_access, alice_refresh) = app
        .register_and_login("alice@example.com", "a sound passphrase")
        .await;

    let (status, _) = app
        .request(
            "PATCH",
            &format!("/users/{alice_id}"),
            Some(serde_json::json!({ "email": "alice2@example.com" })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            "POST",
            "/auth/refresh",
            Some(serde_json::json!({ "refresh_token": alice_refresh })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Refresh token not found");
}

#[tokio::test]
async fn admin_can_mutate_customers() {
    let app = TestApp::spawn().await;
    let admin = admin_token(&app).await;
    let bob_id = app.register("bob@example.com", "a different phrase").await;

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/users/{bob_id}"),
            Some(serde_json::json!({ "email": "robert@example.com" })),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "robert@example.com");

    let (status, _) = app
        .request("DELETE", &format!("/users/{bob_id}"), None, Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request("GET", &format!("/users/{bob_id}"), None, Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn root_is_unreachable_for_every_caller() {
    let app = TestApp::spawn().await;
    let root_id = app.root.id;
    let admin = admin_token(&app).await;
    let (root_access, _) = app.login(ROOT_EMAIL, ROOT_PASSWORD).await;

    for token in [&admin, &root_access] {
        for (method, uri, body) in [
            ("GET", format!("/users/{root_id}"), None),
            (
                "PATCH",
                format!("/users/{root_id}"),
                Some(serde_json::json!({ "email": "newroot@example.com" })),
            ),
            ("DELETE", format!("/users/{root_id}"), None),
        ] {
            let (status, body) = app.request(method, &uri, body, Some(token)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(body["error"], "User not found", "{method} {uri}");
        }
    }

    // Root still exists and can log in.
    app.login(ROOT_EMAIL, ROOT_PASSWORD).await;
}

#[tokio::test]
async fn self_password_change_requires_current_password() {
    let app = TestApp::spawn().await;
    let (alice_id, alice_access, _) = app
        .register_and_login("alice@example.com", "a sound passphrase")
        .await;

    // Missing current password.
    let (status, _) = app
        .request(
            "POST",
            &format!("/users/{alice_id}/password"),
            Some(serde_json::json!({ "new_password": "my next passphrase" })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong current password.
    let (status, _) = app
        .request(
            "POST",
            &format!("/users/{alice_id}/password"),
            Some(serde_json::json!({
                "current_password": "not the passphrase",
                "new_password": "my next passphrase"
            })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct current password.
    let (status, _) = app
        .request(
            "POST",
            &format!("/users/{alice_id}/password"),
            Some(serde_json::json!({
                "current_password": "a sound passphrase",
                "new_password": "my next passphrase"
            })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.login("alice@example.com", "my next passphrase").await;
}

#[tokio::test]
async fn password_change_invalidates_the_session() {
    let app = TestApp::spawn().await;
    let (alice_id, alice_access, alice_refresh) = app
        .register_and_login("alice@example.com", "a sound passphrase")
        .await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/users/{alice_id}/password"),
            Some(serde_json::json!({
                "current_password": "a sound passphrase",
                "new_password": "my next passphrase"
            })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "POST",
            "/auth/refresh",
            Some(serde_json::json!({ "refresh_token": alice_refresh })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_resets_a_password_without_the_current_one() {
    let app = TestApp::spawn().await;
    let admin = admin_token(&app).await;
    let bob_id = app.register("bob@example.com", "a different phrase").await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/users/{bob_id}/password"),
            Some(serde_json::json!({ "new_password": "reset-by-admin-1" })),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    app.login("bob@example.com", "reset-by-admin-1").await;
}

#[tokio::test]
async fn elevation_requires_admin_or_above() {
    let app = TestApp::spawn().await;
    let (_, alice_access, _) = app
        .register_and_login("alice@example.com", "a sound passphrase")
        .await;

    let (status, body) = app
        .request(
            "POST",
            "/admin/users",
            Some(serde_json::json!({
                "email": "wannabe@example.com",
                "password": "wannabe-pass-1"
            })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient privileges");
}

#[tokio::test]
async fn admin_can_elevate_and_the_account_has_admin_level() {
    let app = TestApp::spawn().await;
    let admin = admin_token(&app).await;

    let (status, body) = app
        .request(
            "POST",
            "/admin/users",
            Some(serde_json::json!({
                "email": "second-op@example.com",
                "password": "second-op-pass"
            })),
            Some(&admin),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["level"], "admin");
}

#[tokio::test]
async fn update_to_a_taken_email_conflicts() {
    let app = TestApp::spawn().await;
    let (alice_id, alice_access, _) = app
        .register_and_login("alice@example.com", "a sound passphrase")
        .await;
    app.register("bob@example.com", "a different phrase").await;

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/users/{alice_id}"),
            Some(serde_json::json!({ "email": "bob@example.com" })),
            Some(&alice_access),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already registered");
}
