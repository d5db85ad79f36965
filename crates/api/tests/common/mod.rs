use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use api::app::build_router;
use api::auth::AuthConfig;
use api::AppState;
use infra::models::{Role, RoomType};
use infra::store::{ChatStore, NewChatRoom, NewUser, UserStore};
use infra::MemStore;

pub fn test_state() -> AppState {
    let config = AuthConfig {
        jwt_secret: "test-secret-not-for-production".to_string(),
        jwt_expiration_hours: 1,
    };
    AppState::with_config(Arc::new(MemStore::new()), &config)
}

pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    (build_router(state.clone()), state)
}

/// Drive one request through the router and decode the envelope.
pub async fn request(
    app: &Router,
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
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Register through the real endpoint and return (token, user id).
#[allow(dead_code)]
pub async fn register_user(app: &Router, email: &str, name: &str) -> (String, Uuid) {
    let (status, body) = request(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": email, "name": name, "password": "passw0rd" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");

    let token = body["data"]["token"].as_str().unwrap().to_string();
    let id = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();
    (token, id)
}

/// Seed an admin directly in the store, the way moderation accounts are
/// provisioned out of band, and mint a token for it.
#[allow(dead_code)]
pub async fn create_admin(state: &AppState, email: &str) -> String {
    let user = state
        .store
        .insert_user(NewUser {
            email: email.to_string(),
            name: "Admin".to_string(),
            password_hash: "$2b$12$dummy.hash.for.testing".to_string(),
            role: Role::Admin.as_str().to_string(),
        })
        .await
        .expect("failed to create admin user");

    state
        .jwt_service()
        .create_token(user.id, user.email)
        .expect("failed to mint admin token")
}

/// Seed a regular user directly in the store and mint a token, for tests
/// that talk to a served socket instead of the in-process router.
#[allow(dead_code)]
pub async fn create_user_with_token(state: &AppState, email: &str, name: &str) -> (String, Uuid) {
    let user = state
        .store
        .insert_user(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password_hash: "$2b$12$dummy.hash.for.testing".to_string(),
            role: Role::User.as_str().to_string(),
        })
        .await
        .expect("failed to create user");

    let token = state
        .jwt_service()
        .create_token(user.id, user.email)
        .expect("failed to mint token");

    (token, user.id)
}

/// Submit a team through the API and return its id.
#[allow(dead_code)]
pub async fn submit_team(app: &Router, token: &str, name: &str, state_code: &str) -> Uuid {
    let (status, body) = request(
        app,
        Method::POST,
        "/teams",
        Some(token),
        Some(json!({
            "name": name,
            "location": "Atlanta",
            "state": state_code,
            "age_groups": ["12U", "14U"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "team submission failed: {body}");

    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

#[allow(dead_code)]
pub async fn approve_team(app: &Router, admin_token: &str, team_id: Uuid) {
    let (status, body) = request(
        app,
        Method::PUT,
        &format!("/admin/teams/{team_id}/approve"),
        Some(admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "approval failed: {body}");
}

#[allow(dead_code)]
pub async fn create_room(state: &AppState, name: &str) -> Uuid {
    state
        .store
        .insert_room(NewChatRoom {
            name: name.to_string(),
            room_type: RoomType::Global.as_str().to_string(),
            state: None,
        })
        .await
        .expect("failed to create chat room")
        .id
}
