//! End-to-end flows across registration, projects, tokens and secrets.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use lockbox::config::Config;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let state = lockbox::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    lockbox::api::router(state).await
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", mime::APPLICATION_JSON.as_ref())
            .body(Body::from(serde_json::to_string(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn register_and_login(app: &Router, username: &str, email: &str) -> String {
    let (status, _) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": username, "email": email, "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": username, "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_project(app: &Router, session: &str, name: &str) -> i64 {
    let (status, body) = request(
        app,
        "POST",
        "/api/projects",
        Some(session),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_interactive_flow_register_to_metadata() {
    let app = spawn_app().await;

    let session = register_and_login(&app, "alice", "alice@example.com").await;
    let project_id = create_project(&app, &session, "p1").await;

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&session),
        Some(json!({"key": "DB_URL", "value": "postgres://x", "description": "primary db"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["key"], "DB_URL");
    // the write path returns metadata only
    assert!(body["data"].get("value").is_none());

    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&session),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["key"], "DB_URL");
    assert_eq!(listed[0]["description"], "primary db");
    assert!(listed[0].get("value").is_none());
}

#[tokio::test]
async fn test_token_flow_resolves_plaintext() {
    let app = spawn_app().await;

    let session = register_and_login(&app, "alice", "alice@example.com").await;
    let project_id = create_project(&app, &session, "p1").await;

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&session),
        Some(json!({"key": "DB_URL", "value": "postgres://x"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/tokens"),
        Some(&session),
        Some(json!({"name": "ci"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "ci");
    assert_eq!(body["data"]["expires_at"], Value::Null);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 64);

    let (status, body) = request(&app, "GET", "/api/secrets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["DB_URL"], "postgres://x");
}

#[tokio::test]
async fn test_outsider_is_forbidden() {
    let app = spawn_app().await;

    let alice = register_and_login(&app, "alice", "alice@example.com").await;
    let project_id = create_project(&app, &alice, "p1").await;

    // bob has no permission row on p1
    let bob = register_and_login(&app, "bob", "bob@example.com").await;

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&bob),
        Some(json!({"key": "SNEAKY", "value": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/tokens"),
        Some(&bob),
        Some(json!({"name": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // and bob's own project list stays empty
    let (status, body) = request(&app, "GET", "/api/projects", Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "alice", "email": "alice@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // same email, different username
    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "alice2", "email": "alice@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // same username, different email
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"username": "alice", "email": "other@example.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_upsert_replaces_in_place() {
    let app = spawn_app().await;

    let session = register_and_login(&app, "alice", "alice@example.com").await;
    let project_id = create_project(&app, &session, "p1").await;

    let (_, first) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&session),
        Some(json!({"key": "DB_URL", "value": "one"})),
    )
    .await;

    let (_, second) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&session),
        Some(json!({"key": "DB_URL", "value": "two"})),
    )
    .await;

    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(first["data"]["created_at"], second["data"]["created_at"]);

    let (_, listed) = request(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/secrets"),
        Some(&session),
        None,
    )
    .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    // the token path sees the replacement value
    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/tokens"),
        Some(&session),
        Some(json!({"name": "ci"})),
    )
    .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (_, resolved) = request(&app, "GET", "/api/secrets", Some(&token), None).await;
    assert_eq!(resolved["data"]["DB_URL"], "two");
}

#[tokio::test]
async fn test_token_is_scoped_to_its_project() {
    let app = spawn_app().await;

    let session = register_and_login(&app, "alice", "alice@example.com").await;
    let p1 = create_project(&app, &session, "p1").await;
    let p2 = create_project(&app, &session, "p2").await;

    for (project, key, value) in [(p1, "ONE", "1"), (p2, "TWO", "2")] {
        let (status, _) = request(
            &app,
            "POST",
            &format!("/api/projects/{project}/secrets"),
            Some(&session),
            Some(json!({"key": key, "value": value})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = request(
        &app,
        "POST",
        &format!("/api/projects/{p1}/tokens"),
        Some(&session),
        Some(json!({"name": "ci"})),
    )
    .await;
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // alice holds admin on both projects, but the token does not
    let (status, body) = request(&app, "GET", "/api/secrets", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ONE"], "1");
    assert!(body["data"].get("TWO").is_none());
}

#[tokio::test]
async fn test_project_listing_reports_role() {
    let app = spawn_app().await;

    let session = register_and_login(&app, "alice", "alice@example.com").await;
    create_project(&app, &session, "p1").await;

    let (status, body) = request(&app, "GET", "/api/projects", Some(&session), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "p1");
    // the creator is admin immediately after creation
    assert_eq!(listed[0]["role"], "admin");
}
