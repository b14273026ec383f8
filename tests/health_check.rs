//! Integration tests for the public, unauthenticated endpoints

mod common;

use common::spawn_app;
use serde_json::{json, Value};

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = app
        .client
        .get(app.url("/api/healthz"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn validate_chirp_censors_profanity() {
    let app = spawn_app();

    let response = app
        .client
        .post(app.url("/api/validate_chirp"))
        .json(&json!({ "body": "I really need a kerfuffle to go to bed sooner, Fornax !" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["cleaned_body"],
        "I really need a **** to go to bed sooner, **** !"
    );
}

#[tokio::test]
async fn validate_chirp_rejects_long_body() {
    let app = spawn_app();

    let response = app
        .client
        .post(app.url("/api/validate_chirp"))
        .json(&json!({ "body": "a".repeat(141) }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let app = spawn_app();

    let test_cases = vec![
        ("{", "truncated json"),
        ("{\"text\": \"hi\"}", "missing body field"),
    ];

    for (payload, reason) in test_cases {
        let response = app
            .client
            .post(app.url("/api/validate_chirp"))
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            reason
        );
    }
}
