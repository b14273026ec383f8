#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use serde_json::{json, Value};

use chirpy::auth::Authenticator;
use chirpy::clock::ManualClock;
use chirpy::configuration::AuthSettings;
use chirpy::startup::run;
use chirpy::store::{InMemoryRefreshTokenRepository, InMemoryUserStore};

pub const JWT_SECRET: &str = "integration-test-signing-secret";
pub const API_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub struct TestApp {
    pub address: String,
    pub clock: ManualClock,
    pub client: reqwest::Client,
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let clock = ManualClock::starting_now();
    let authenticator = Authenticator::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(InMemoryRefreshTokenRepository::new()),
        AuthSettings::new(JWT_SECRET, API_KEY),
        Arc::new(clock.clone()),
    );

    let server = run(listener, authenticator).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register then log in, returning the login body.
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Value {
        assert_eq!(201, self.create_user(email, password).await.status().as_u16());
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse login response")
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_me(&self, token: &str) -> reqwest::Response {
        self.client
            .get(self.url("/api/me"))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
