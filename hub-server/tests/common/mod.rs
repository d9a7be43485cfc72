//! Test harness: the full router over a private in-memory database

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use hub_server::{Config, ServerState, build_app};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "root@hub.io";
pub const ADMIN_PASSWORD: &str = "root-password-1";

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut config = Config::for_tests();
        config.bootstrap_admin_email = Some(ADMIN_EMAIL.into());
        config.bootstrap_admin_password = Some(ADMIN_PASSWORD.into());

        let state = ServerState::for_tests(config).await.unwrap();
        Self {
            app: build_app(state.clone()),
            state,
        }
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
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Log in and return the bearer token
    pub async fn login(&self, class: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                &format!("/api/{class}/auth/login"),
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{class} login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Register a restaurant open around the clock; returns its id
    pub async fn register_restaurant(&self, tag: &str, lat: f64, lng: f64) -> i64 {
        let (status, body) = self
            .post(
                "/api/public/restaurants/register",
                None,
                json!({
                    "name": format!("Restaurant {tag}"),
                    "email": format!("{tag}@food.io"),
                    "phone": "5551234",
                    "address": "1 Main St",
                    "latitude": lat,
                    "longitude": lng,
                    "opening_time": "00:00",
                    "closing_time": "00:00",
                    "owner_name": format!("Owner {tag}"),
                    "owner_email": format!("owner.{tag}@food.io"),
                    "owner_password": "owner-password",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "registration failed: {body}");
        body["restaurant"]["id"].as_i64().unwrap()
    }

    /// Register, approve and log in as the owner; returns (restaurant id, owner token)
    pub async fn approved_restaurant(&self, admin: &str, tag: &str, lat: f64, lng: f64) -> (i64, String) {
        let id = self.register_restaurant(tag, lat, lng).await;
        let (status, body) = self
            .post(&format!("/api/admin/restaurants/{id}/approve"), Some(admin), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {body}");
        let token = self
            .login("staff", &format!("owner.{tag}@food.io"), "owner-password")
            .await;
        (id, token)
    }

    /// Register a customer; returns the token
    pub async fn customer(&self, email: &str) -> String {
        let (status, body) = self
            .post(
                "/api/customer/auth/register",
                None,
                json!({ "name": "Cleo", "email": email, "password": "customer-pass" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Category > subcategory > item; returns the item id
    pub async fn menu_item(&self, staff: &str, name: &str, price: f64) -> i64 {
        let (_, category) = self
            .post("/api/staff/menu/categories", Some(staff), json!({ "name": "Mains" }))
            .await;
        let (_, sub) = self
            .post(
                "/api/staff/menu/subcategories",
                Some(staff),
                json!({ "category_id": category["id"], "name": "Kitchen" }),
            )
            .await;
        let (status, item) = self
            .post(
                "/api/staff/menu/items",
                Some(staff),
                json!({ "subcategory_id": sub["id"], "name": name, "price": price }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "item create failed: {item}");
        item["id"].as_i64().unwrap()
    }
}

/// Error code of an error body
pub fn code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap_or_default()
}
