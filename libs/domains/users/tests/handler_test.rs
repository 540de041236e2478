//! Handler tests for the Users domain
//!
//! Run the users router against the in-memory repository and check status
//! codes, auth layering and response bodies.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::{ErrorResponse, JwtAuth, JwtConfig, MessageResponse, Role};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

const SECRET: &str = "handler-test-secret-with-32-characters!!";

async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn app() -> (Router, String) {
    let service = UserService::new(
        InMemoryUserRepository::new(),
        JwtAuth::new(&JwtConfig::new(SECRET)),
    );
    service
        .ensure_admin(SeedAdmin {
            name: "Root".into(),
            email: "root@example.com".into(),
            username: "root".into(),
            password: "rootpass".into(),
        })
        .await
        .unwrap();
    let app = handlers::router(service);
    let token = login(&app, "root", "rootpass").await;
    (app, token)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/login",
            None,
            Some(json!({ "username": username, "password": password })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: LoginResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "Login successful");
    body.token
}

async fn register(app: &Router, username: &str) -> UserResponse {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/add",
            None,
            Some(json!({
                "name": "Test User",
                "email": format!("{username}@example.com"),
                "username": username,
                "password": "secret123"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response.into_body()).await
}

#[tokio::test]
async fn test_register_and_view_profile() {
    let (app, _) = app().await;
    let user = register(&app, "alice").await;
    assert_eq!(user.role, Role::User);

    let token = login(&app, "alice", "secret123").await;
    let response = app
        .oneshot(request("GET", "/viewprofile", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let profile: Value = json_body(response.into_body()).await;
    assert_eq!(profile["username"], "alice");
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_returns_400() {
    let (app, _) = app().await;
    register(&app, "alice").await;

    let response = app
        .oneshot(request(
            "POST",
            "/add",
            None,
            Some(json!({
                "name": "Other",
                "email": "alice@example.com",
                "username": "alice_two",
                "password": "secret123"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "Email already in use.");
}

#[tokio::test]
async fn test_register_invalid_body_returns_400() {
    let (app, _) = app().await;
    let response = app
        .oneshot(request(
            "POST",
            "/add",
            None,
            Some(json!({
                "name": "Bad",
                "email": "not-an-email",
                "username": "bad",
                "password": "123"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anonymous_cannot_create_admin() {
    let (app, admin_token) = app().await;
    let body = json!({
        "name": "Boss",
        "email": "boss@example.com",
        "role": "Manager",
        "username": "boss",
        "password": "secret123"
    });

    let response = app
        .clone()
        .oneshot(request("POST", "/add", None, Some(body.clone())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request("POST", "/add", Some(&admin_token), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: UserResponse = json_body(response.into_body()).await;
    assert_eq!(created.role, Role::Manager);
}

#[tokio::test]
async fn test_login_errors() {
    let (app, _) = app().await;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/login",
            None,
            Some(json!({ "username": "nobody", "password": "whatever" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request(
            "POST",
            "/login",
            None,
            Some(json!({ "username": "root", "password": "wrong-password" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = app().await;

    for (method, uri) in [
        ("GET", "/viewprofile"),
        ("GET", "/viewuser"),
        ("DELETE", "/delete/00000000-0000-0000-0000-000000000000"),
    ] {
        let response = app
            .clone()
            .oneshot(request(method, uri, None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        let body: ErrorResponse = json_body(response.into_body()).await;
        assert_eq!(body.message, "No token provided");
    }

    let response = app
        .oneshot(request("GET", "/viewprofile", Some("garbage"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "Invalid token");
}

#[tokio::test]
async fn test_list_users_by_role() {
    let (app, admin_token) = app().await;
    register(&app, "alice").await;
    let user_token = login(&app, "alice", "secret123").await;

    let response = app
        .clone()
        .oneshot(request("GET", "/viewuser", Some(&user_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request("GET", "/viewuser", Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let users: Vec<UserResponse> = json_body(response.into_body()).await;
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].username, "alice");
}

#[tokio::test]
async fn test_edit_and_profile_update() {
    let (app, _) = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let token = login(&app, "alice", "secret123").await;

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/edit/{}", alice.id),
            Some(&token),
            Some(json!({ "name": "Alice A.", "email": "" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let edited: UserResponse = json_body(response.into_body()).await;
    assert_eq!(edited.name, "Alice A.");
    assert_eq!(edited.email, "alice@example.com");

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/edit/{}", bob.id),
            Some(&token),
            Some(json!({ "name": "Hijacked" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            "PUT",
            "/profile",
            Some(&token),
            Some(json!({ "username": "alice_renamed" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: UserResponse = json_body(response.into_body()).await;
    assert_eq!(updated.username, "alice_renamed");
}

#[tokio::test]
async fn test_delete_user() {
    let (app, admin_token) = app().await;
    let alice = register(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/delete/{}", alice.id),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: MessageResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "User deleted successfully");

    let response = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/delete/{}", alice.id),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("DELETE", "/delete/not-a-uuid", Some(&admin_token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_cannot_be_deleted() {
    let (app, admin_token) = app().await;

    let response = app
        .clone()
        .oneshot(request("GET", "/viewprofile", Some(&admin_token), None))
        .await
        .unwrap();
    let admin: UserResponse = json_body(response.into_body()).await;

    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/delete/{}", admin.id),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: ErrorResponse = json_body(response.into_body()).await;
    assert_eq!(body.message, "Cannot delete an admin");
}
