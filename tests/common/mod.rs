//! In-process harness: the full router over a fresh `MemoryStore`.

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use campus_clubs::{
    auth::Keys,
    models::Club,
    seed,
    store::{Db, MemoryStore},
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "root-password";

pub struct TestApp {
    pub router: Router,
    pub store: Db,
    pub keys: Arc<Keys>,
}

impl TestApp {
    /// Seeds the bootstrap admin and the given clubs from the catalogue.
    pub async fn with_clubs(slugs: &[&str]) -> Self {
        let store: Db = Arc::new(MemoryStore::new());
        for s in seed::CLUBS.iter().filter(|c| slugs.contains(&c.slug)) {
            seed::insert_club(store.as_ref(), s).await.unwrap();
        }
        seed::ensure_admin(store.as_ref(), ADMIN_USERNAME, ADMIN_PASSWORD)
            .await
            .unwrap();

        let keys = Arc::new(Keys::new(SECRET, Duration::from_secs(3600)));
        let router = campus_clubs::app(store.clone(), keys.clone(), "assets");
        Self { router, store, keys }
    }

    pub async fn club(&self, slug: &str) -> Club {
        self.store.find_club_by_slug(slug).await.unwrap().unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn login(&self, role: &str, username: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/login",
                None,
                json!({ "role": role, "username": username, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn register_student(&self, roll: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/register",
                None,
                json!({
                    "role": "student",
                    "name": "Asha",
                    "studentUsername": roll,
                    "studentPassword": password,
                    "confirmPassword": password,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        self.login("student", roll, password).await
    }

    pub async fn register_head(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/register",
                None,
                json!({ "role": "clubhead", "clubUsername": username, "clubPassword": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        self.login("clubhead", username, password).await
    }

    pub async fn register_faculty(&self) -> String {
        let (status, body) = self
            .post(
                "/register",
                None,
                json!({
                    "role": "faculty",
                    "name": "Ramakrishna",
                    "facultyEmail": "ramakrishn123@gmail.com",
                    "facultyPassword": "Professor1!",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        self.login("faculty", "ramakrishn123@gmail.com", "Professor1!")
            .await
    }
}
