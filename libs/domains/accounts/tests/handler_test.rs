//! Handler tests for the Accounts domain
//!
//! These drive the router with `oneshot()` against the in-memory repository:
//! - Form validation messages
//! - Login success and the generic failure
//! - Profile whitelist, password change and soft-delete endpoints

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_accounts::handlers::{UserEnvelope, UserListResponse};
use domain_accounts::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const PASSWORD: &str = "taka-ni-mali";

fn app() -> Router {
    handlers::router(UserService::new(InMemoryUserRepository::new()))
}

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn send(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn registration(phone: &str, email: &str) -> Value {
    json!({
        "first_name": "Neema",
        "last_name": "Kimaro",
        "phone_number": phone,
        "email": email,
        "password": PASSWORD,
        "password_confirm": PASSWORD,
    })
}

async fn register(app: &Router, phone: &str, email: &str) -> UserResponse {
    let response = app
        .clone()
        .oneshot(send("POST", "/register", Some(registration(phone, email))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: UserEnvelope = json_body(response.into_body()).await;
    assert_eq!(body.message, "Registration successful. Please login.");
    body.user
}

#[tokio::test]
async fn test_register_creates_household_user() {
    let user = register(&app(), "0713000001", "neema@example.com").await;

    assert_eq!(user.role, Role::Household);
    assert!(user.is_active);
    assert!(!user.is_verified);
    assert!(!user.is_deleted);
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let mut body = registration("0713000001", "neema@example.com");
    body["password_confirm"] = json!("different-password");

    let response = app()
        .oneshot(send("POST", "/register", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body["details"]["password_confirm"][0]["message"],
        "Passwords do not match"
    );
}

#[tokio::test]
async fn test_register_rejects_foreign_phone() {
    let response = app()
        .oneshot(send(
            "POST",
            "/register",
            Some(registration("+254700000001", "neema@example.com")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body["details"]["phone_number"][0]["message"],
        "Phone number must start with +255 or 0"
    );
}

#[tokio::test]
async fn test_register_duplicate_phone_is_conflict() {
    let app = app();
    register(&app, "0713000001", "first@example.com").await;

    let response = app
        .oneshot(send(
            "POST",
            "/register",
            Some(registration("0713000001", "second@example.com")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "A user with this phone number already exists.");
}

#[tokio::test]
async fn test_login_success() {
    let app = app();
    register(&app, "0713000001", "neema@example.com").await;

    let response = app
        .oneshot(send(
            "POST",
            "/login",
            Some(json!({ "phone_number": "0713000001", "password": PASSWORD })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: UserEnvelope = json_body(response.into_body()).await;
    assert_eq!(body.message, "Welcome back, Neema!");
    assert!(body.user.last_login.is_some());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = app();
    register(&app, "0713000001", "neema@example.com").await;

    let wrong_password = app
        .clone()
        .oneshot(send(
            "POST",
            "/login",
            Some(json!({ "phone_number": "0713000001", "password": "not-it" })),
        ))
        .await
        .unwrap();
    let unknown_phone = app
        .oneshot(send(
            "POST",
            "/login",
            Some(json!({ "phone_number": "0799000000", "password": PASSWORD })),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_phone.status(), StatusCode::UNAUTHORIZED);

    let a: Value = json_body(wrong_password.into_body()).await;
    let b: Value = json_body(unknown_phone.into_body()).await;
    assert_eq!(a, b);
    assert_eq!(a["message"], "Invalid phone number or password.");
}

#[tokio::test]
async fn test_verify_otp_placeholder() {
    let app = app();

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            "/verify-otp",
            Some(json!({ "phone_number": "0713000001", "code": "1234" })),
        ))
        .await
        .unwrap();
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["valid"], true);

    let response = app
        .oneshot(send(
            "POST",
            "/verify-otp",
            Some(json!({ "phone_number": "0713000001", "code": "0000" })),
        ))
        .await
        .unwrap();
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["valid"], false);
}

#[tokio::test]
async fn test_profile_update_ignores_role() {
    let app = app();
    let user = register(&app, "0713000001", "neema@example.com").await;

    let response = app
        .oneshot(send(
            "PUT",
            &format!("/users/{}", user.id),
            Some(json!({ "first_name": "Rehema", "role": "admin", "is_staff": true })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: UserEnvelope = json_body(response.into_body()).await;
    assert_eq!(body.message, "Profile updated successfully.");
    assert_eq!(body.user.first_name, "Rehema");
    assert_eq!(body.user.role, Role::Household);
    assert!(!body.user.is_staff);
}

#[tokio::test]
async fn test_profile_update_cannot_take_padded_phone() {
    let app = app();
    register(&app, "0713000001", "neema@example.com").await;
    let other = register(&app, "0713000002", "rehema@example.com").await;

    let response = app
        .clone()
        .oneshot(send(
            "PUT",
            &format!("/users/{}", other.id),
            Some(json!({ "phone_number": "0713000001 " })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(send(
            "POST",
            "/login",
            Some(json!({ "phone_number": "0713000002", "password": PASSWORD })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_checks_old_password() {
    let app = app();
    let user = register(&app, "0713000001", "neema@example.com").await;
    let uri = format!("/users/{}/password", user.id);

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            &uri,
            Some(json!({
                "old_password": "wrong-old",
                "new_password": "brand-new-pass",
                "new_password_confirm": "brand-new-pass",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Incorrect old password.");

    let response = app
        .clone()
        .oneshot(send(
            "POST",
            &uri,
            Some(json!({
                "old_password": PASSWORD,
                "new_password": "brand-new-pass",
                "new_password_confirm": "brand-new-pass",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["message"], "Password changed successfully.");

    let response = app
        .oneshot(send(
            "POST",
            "/login",
            Some(json!({ "phone_number": "0713000001", "password": "brand-new-pass" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_soft_delete_and_restore() {
    let app = app();
    let user = register(&app, "0713000001", "neema@example.com").await;
    let uri = format!("/users/{}", user.id);

    let response = app.clone().oneshot(send("DELETE", &uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(send("GET", &uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(send("GET", &format!("{}?scope=all", uri), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: UserResponse = json_body(response.into_body()).await;
    assert!(fetched.is_deleted);
    assert!(fetched.deleted_at.is_some());

    let response = app
        .clone()
        .oneshot(send("GET", "/users?scope=deleted_only", None))
        .await
        .unwrap();
    let listed: UserListResponse = json_body(response.into_body()).await;
    assert_eq!(listed.total, 1);

    let response = app
        .clone()
        .oneshot(send("POST", &format!("{}/restore", uri), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let restored: UserResponse = json_body(response.into_body()).await;
    assert!(!restored.is_deleted);
    assert_eq!(restored.deleted_at, None);

    let response = app.oneshot(send("GET", &uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_repeat_soft_delete_succeeds() {
    let app = app();
    let user = register(&app, "0713000001", "neema@example.com").await;
    let uri = format!("/users/{}", user.id);

    for _ in 0..2 {
        let response = app.clone().oneshot(send("DELETE", &uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let response = app
        .oneshot(send("DELETE", &format!("/users/{}", uuid::Uuid::now_v7()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hard_delete_removes_row() {
    let app = app();
    let user = register(&app, "0713000001", "neema@example.com").await;
    let uri = format!("/users/{}", user.id);

    let response = app
        .clone()
        .oneshot(send("DELETE", &format!("{}?hard=true", uri), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(send("GET", &format!("{}?scope=all", uri), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_uuid_is_bad_request() {
    let response = app()
        .oneshot(send("GET", "/users/not-a-uuid", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
