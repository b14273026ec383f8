//! End-to-end tests for login, protected routes, refresh and revocation

mod common;

use chrono::Duration;
use common::spawn_app;
use serde_json::{json, Value};

const EMAIL: &str = "walt@breakingbad.com";
const PASSWORD: &str = "04234";

// --- Registration ---

#[tokio::test]
async fn create_user_returns_201_without_password_hash() {
    let app = spawn_app();

    let response = app.create_user(EMAIL, PASSWORD).await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], EMAIL);
    assert!(body.get("id").is_some());
    assert!(body.get("hashed_password").is_none());
}

#[tokio::test]
async fn create_user_returns_409_for_duplicate_email() {
    let app = spawn_app();

    assert_eq!(201, app.create_user(EMAIL, PASSWORD).await.status().as_u16());
    assert_eq!(409, app.create_user(EMAIL, "other").await.status().as_u16());
}

#[tokio::test]
async fn create_user_returns_400_for_invalid_input() {
    let app = spawn_app();

    let test_cases = vec![
        ("notanemail", PASSWORD, "invalid email"),
        ("", PASSWORD, "empty email"),
        (EMAIL, "", "empty password"),
    ];

    for (email, password, reason) in test_cases {
        let response = app.create_user(email, password).await;
        assert_eq!(400, response.status().as_u16(), "Should reject {}", reason);
    }
}

// --- Login ---

#[tokio::test]
async fn login_returns_tokens_for_valid_credentials() {
    let app = spawn_app();
    let created: Value = app.create_user(EMAIL, PASSWORD).await.json().await.unwrap();

    let response = app.login(EMAIL, PASSWORD).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["email"], EMAIL);
    assert!(body["access_token"].as_str().is_some());
    assert_eq!(body["refresh_token"].as_str().map(str::len), Some(64));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    app.create_user(EMAIL, PASSWORD).await;

    let wrong_password = app.login(EMAIL, "wrong").await;
    let unknown_email = app.login("jesse@breakingbad.com", PASSWORD).await;
    let empty_password = app.login(EMAIL, "").await;

    for response in [wrong_password, unknown_email, empty_password] {
        assert_eq!(401, response.status().as_u16());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["message"], "Unauthorized");
    }
}

// --- Protected routes ---

#[tokio::test]
async fn protected_route_rejects_missing_or_bad_tokens() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let no_header = app
        .client
        .get(app.url("/api/me"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, no_header.status().as_u16());

    for token in ["garbage", "", refresh_token] {
        let response = app.get_me(token).await;
        assert_eq!(401, response.status().as_u16(), "token {:?} accepted", token);
    }
}

#[tokio::test]
async fn protected_route_accepts_unprefixed_token() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let access_token = session["access_token"].as_str().unwrap();

    let response = app
        .client
        .get(app.url("/api/me"))
        .header("Authorization", access_token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn expired_and_tampered_tokens_get_the_same_response() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let access_token = session["access_token"].as_str().unwrap().to_string();

    let tampered: Value = app
        .get_me(&format!("{}X", access_token))
        .await
        .json()
        .await
        .unwrap();

    app.clock.advance(Duration::hours(1));
    let expired: Value = app.get_me(&access_token).await.json().await.unwrap();

    assert_eq!(tampered["code"], expired["code"]);
    assert_eq!(tampered["message"], expired["message"]);
    assert_eq!(tampered["status"], 401);
}

// --- Session lifecycle ---

#[tokio::test]
async fn full_session_lifecycle() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let access_token = session["access_token"].as_str().unwrap();
    let refresh_token = session["refresh_token"].as_str().unwrap();

    // The access token authorizes a protected call.
    let me = app.get_me(access_token).await;
    assert_eq!(200, me.status().as_u16());
    let me: Value = me.json().await.unwrap();
    assert_eq!(me["email"], EMAIL);

    // One second before expiry it still works; at expiry it does not.
    app.clock.advance(Duration::hours(1) - Duration::seconds(1));
    assert_eq!(200, app.get_me(access_token).await.status().as_u16());
    app.clock.advance(Duration::seconds(1));
    assert_eq!(401, app.get_me(access_token).await.status().as_u16());

    // The refresh token yields a fresh access token.
    let refreshed = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(200, refreshed.status().as_u16());
    let refreshed: Value = refreshed.json().await.unwrap();
    let new_access_token = refreshed["access_token"].as_str().unwrap();
    assert_eq!(200, app.get_me(new_access_token).await.status().as_u16());

    // Revoking the refresh token ends the session.
    let revoked = app.post_with_bearer("/api/revoke", refresh_token).await;
    assert_eq!(204, revoked.status().as_u16());

    let after_revoke = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, after_revoke.status().as_u16());
}

#[tokio::test]
async fn refresh_token_is_not_rotated() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    for _ in 0..2 {
        let response = app.post_with_bearer("/api/refresh", refresh_token).await;
        assert_eq!(200, response.status().as_u16());
    }
}

#[tokio::test]
async fn refresh_token_expires_after_60_days() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    app.clock.advance(Duration::days(60));

    let response = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_unknown_and_missing_tokens() {
    let app = spawn_app();

    let unknown = app.post_with_bearer("/api/refresh", "deadbeef").await;
    assert_eq!(401, unknown.status().as_u16());

    let missing = app
        .client
        .post(app.url("/api/refresh"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, missing.status().as_u16());
}

#[tokio::test]
async fn revoke_always_returns_204() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let unknown = app.post_with_bearer("/api/revoke", "not-a-real-token").await;
    assert_eq!(204, unknown.status().as_u16());

    let missing = app
        .client
        .post(app.url("/api/revoke"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, missing.status().as_u16());

    for _ in 0..2 {
        let response = app.post_with_bearer("/api/revoke", refresh_token).await;
        assert_eq!(204, response.status().as_u16());
    }
}

// --- Credential change ---

#[tokio::test]
async fn password_change_revokes_refresh_tokens() {
    let app = spawn_app();
    let session = app.signed_in_user(EMAIL, PASSWORD).await;
    let access_token = session["access_token"].as_str().unwrap();
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let response = app
        .client
        .put(app.url("/api/users"))
        .header("Authorization", format!("Bearer {}", access_token))
        .json(&json!({ "email": "heisenberg@breakingbad.com", "password": "new-secret" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "heisenberg@breakingbad.com");

    let refreshed = app.post_with_bearer("/api/refresh", refresh_token).await;
    assert_eq!(401, refreshed.status().as_u16());

    assert_eq!(401, app.login(EMAIL, PASSWORD).await.status().as_u16());
    assert_eq!(
        200,
        app.login("heisenberg@breakingbad.com", "new-secret")
            .await
            .status()
            .as_u16()
    );
}

#[tokio::test]
async fn password_change_requires_access_token() {
    let app = spawn_app();
    app.create_user(EMAIL, PASSWORD).await;

    let response = app
        .client
        .put(app.url("/api/users"))
        .json(&json!({ "email": EMAIL, "password": "new-secret" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}
