//! Authentication, actor separation and permission checks over HTTP

mod common;

use common::{ADMIN_EMAIL, TestApp, code};
use http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn health_is_public() {
    let t = TestApp::new().await;
    let (status, body) = t.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let t = TestApp::new().await;
    let (status, body) = t.get("/api/customer/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1001);

    let (status, _) = t.get("/api/customer/cart", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn customer_register_login_logout() {
    let t = TestApp::new().await;
    let token = t.customer("Dana@X.io").await;

    let (status, me) = t.get("/api/customer/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{me}");
    assert_eq!(me["email"], "dana@x.io");
    assert_eq!(me["kind"], "customer");

    let (status, body) = t
        .post(
            "/api/customer/auth/register",
            None,
            json!({ "name": "Dana", "email": "dana@x.io", "password": "another-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(code(&body), 1009);

    let (status, body) = t
        .post(
            "/api/customer/auth/login",
            None,
            json!({ "email": "dana@x.io", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1002);

    // Unknown email looks the same as a wrong password
    let (status, body) = t
        .post(
            "/api/customer/auth/login",
            None,
            json!({ "email": "nobody@x.io", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1002);

    let second = t.login("customer", "DANA@x.io", "customer-pass").await;

    let (status, _) = t.post("/api/customer/auth/logout", Some(&token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = t.get("/api/customer/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Other sessions survive a logout
    let (status, _) = t.get("/api/customer/auth/me", Some(&second)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn actor_classes_are_separated() {
    let t = TestApp::new().await;
    let customer = t.customer("mia@x.io").await;
    let admin = t.admin_token().await;

    let (status, body) = t.get("/api/staff/menu/tree", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2002);

    let (status, body) = t.get("/api/customer/cart", Some(&admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2002);

    let (status, body) = t.get("/api/admin/restaurants", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2002);
}

#[tokio::test]
async fn staff_role_limits_what_a_member_can_do() {
    let t = TestApp::new().await;
    let admin = t.admin_token().await;
    let (_, owner) = t.approved_restaurant(&admin, "rbac", 5.0, 5.0).await;

    let (status, role) = t
        .post(
            "/api/staff/roles",
            Some(&owner),
            json!({ "name": "viewer", "permissions": ["menu:read"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{role}");

    let (status, body) = t
        .post(
            "/api/staff/roles",
            Some(&owner),
            json!({ "name": "pilot", "permissions": ["menu:fly"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, member) = t
        .post(
            "/api/staff/members",
            Some(&owner),
            json!({
                "name": "Vic",
                "email": "vic@food.io",
                "password": "viewer-pass",
                "role_id": role["id"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{member}");

    let viewer = t.login("staff", "vic@food.io", "viewer-pass").await;
    let (status, _) = t.get("/api/staff/menu/categories", Some(&viewer)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = t
        .post("/api/staff/menu/categories", Some(&viewer), json!({ "name": "Drinks" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2001);

    let (status, body) = t.get("/api/staff/members", Some(&viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2001);

    // Disabling the member ends their sessions
    let member_id = member["id"].as_i64().unwrap();
    let (status, body) = t
        .put(
            &format!("/api/staff/members/{member_id}"),
            Some(&owner),
            json!({ "is_active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let (status, _) = t.get("/api/staff/menu/categories", Some(&viewer)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = t
        .post(
            "/api/staff/auth/login",
            None,
            json!({ "email": "vic@food.io", "password": "viewer-pass" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1007);
}

#[tokio::test]
async fn admin_cannot_delete_self() {
    let t = TestApp::new().await;
    let (status, login) = t
        .post(
            "/api/admin/auth/login",
            None,
            json!({ "email": ADMIN_EMAIL, "password": common::ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().unwrap();
    let id = login["user"]["id"].as_i64().unwrap();

    let (status, body) = t.delete(&format!("/api/admin/admins/{id}"), Some(token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2106);
}

#[tokio::test]
async fn disabled_customer_is_logged_out() {
    let t = TestApp::new().await;
    let admin = t.admin_token().await;
    let customer = t.customer("zed@x.io").await;

    let (_, page) = t.get("/api/admin/customers", Some(&admin)).await;
    assert_eq!(page["total"], 1);
    let id = page["items"][0]["id"].as_i64().unwrap();
    assert!(page["items"][0].get("password_hash").is_none());

    let (status, body) = t
        .put(
            &format!("/api/admin/customers/{id}/active"),
            Some(&admin),
            json!({ "is_active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = t.get("/api/customer/auth/me", Some(&customer)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn narrowing_a_role_ends_member_sessions() {
    let t = TestApp::new().await;
    let admin = t.admin_token().await;
    let (_, owner) = t.approved_restaurant(&admin, "narrow", 5.0, 5.0).await;

    let (status, role) = t
        .post(
            "/api/staff/roles",
            Some(&owner),
            json!({ "name": "chef", "permissions": ["menu:read", "menu:manage"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{role}");
    let role_id = role["id"].as_i64().unwrap();

    let (status, body) = t
        .post(
            "/api/staff/members",
            Some(&owner),
            json!({
                "name": "Cy",
                "email": "cy@food.io",
                "password": "chef-pass",
                "role_id": role_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let chef = t.login("staff", "cy@food.io", "chef-pass").await;
    let (status, body) = t
        .post("/api/staff/menu/categories", Some(&chef), json!({ "name": "Starters" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = t
        .put(
            &format!("/api/staff/roles/{role_id}"),
            Some(&owner),
            json!({ "permissions": ["menu:read"] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // The token issued under the old permission set is gone
    let (status, body) = t
        .post("/api/staff/menu/categories", Some(&chef), json!({ "name": "Mains" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1005);

    let chef = t.login("staff", "cy@food.io", "chef-pass").await;
    let (status, body) = t
        .post("/api/staff/menu/categories", Some(&chef), json!({ "name": "Mains" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(code(&body), 2001);
    let (status, _) = t.get("/api/staff/menu/categories", Some(&chef)).await;
    assert_eq!(status, StatusCode::OK);

    // The owner's own session is unaffected
    let (status, _) = t.get("/api/staff/roles", Some(&owner)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn suspension_logs_out_restaurant_staff() {
    let t = TestApp::new().await;
    let admin = t.admin_token().await;
    let (id, owner) = t.approved_restaurant(&admin, "paused", 5.0, 5.0).await;
    let (_, other) = t.approved_restaurant(&admin, "running", 6.0, 6.0).await;

    let (status, body) = t
        .post(&format!("/api/admin/restaurants/{id}/suspend"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "suspended");

    let (status, body) = t
        .post("/api/staff/menu/categories", Some(&owner), json!({ "name": "Late" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(code(&body), 1005);

    let (_, body) = t
        .post(
            "/api/staff/auth/login",
            None,
            json!({ "email": "owner.paused@food.io", "password": "owner-password" }),
        )
        .await;
    assert_eq!(code(&body), 3002);

    // Staff of other restaurants keep working
    let (status, body) = t
        .post("/api/staff/menu/categories", Some(&other), json!({ "name": "Open" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
}
