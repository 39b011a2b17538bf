mod common;

use axum::http::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, generate_unique_email, spawn_app};
use learnhub_models::RoleName;

async fn admin_token(app: &TestApp) -> String {
    app.user_with_role(&generate_unique_email(), RoleName::Admin)
        .await
        .1
}

fn role_id(roles: &Value, name: &str) -> i64 {
    roles
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == name)
        .and_then(|r| r["id"].as_i64())
        .unwrap()
}

#[tokio::test]
async fn test_initialize_default_roles_is_idempotent() {
    let app = spawn_app().await;

    // spawn_app already seeded once
    assert_eq!(app.state.roles.initialize_default_roles().await.unwrap(), 0);

    let token = admin_token(&app).await;
    let roles = app.get("/api/roles", Some(&token)).await;
    assert_eq!(roles.status, StatusCode::OK);

    let names: Vec<&str> = roles
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 5);
    for expected in ["user", "teacher", "content_creator", "moderator", "admin"] {
        assert!(names.contains(&expected));
    }
    assert!(roles.body.as_array().unwrap().iter().all(|r| r["predefined"] == true));
}

#[tokio::test]
async fn test_assign_is_idempotent() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let user_id = app.register(&generate_unique_email(), "password123").await;
    let roles = app.get("/api/roles", Some(&token)).await.body;
    let teacher = role_id(&roles, "teacher");

    let body = json!({ "userId": user_id, "roleId": teacher });
    let first = app.post("/api/roles/assign", Some(&token), body.clone()).await;
    let second = app.post("/api/roles/assign", Some(&token), body.clone()).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["assigned"], true);
    assert_eq!(second.body["assigned"], false);

    let users = app
        .get(&format!("/api/roles/{}/users", teacher), Some(&token))
        .await;
    assert_eq!(users.body, json!([user_id]));

    let removed = app.post("/api/roles/remove", Some(&token), body.clone()).await;
    assert_eq!(removed.body["removed"], true);
    let again = app.post("/api/roles/remove", Some(&token), body).await;
    assert_eq!(again.body["removed"], false);
}

#[tokio::test]
async fn test_assign_missing_targets_are_not_found() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let user_id = app.register(&generate_unique_email(), "password123").await;
    let roles = app.get("/api/roles", Some(&token)).await.body;

    let missing_role = app
        .post(
            "/api/roles/assign",
            Some(&token),
            json!({ "userId": user_id, "roleId": 9999 }),
        )
        .await;
    assert_eq!(missing_role.status, StatusCode::NOT_FOUND);

    let missing_user = app
        .post(
            "/api/roles/assign",
            Some(&token),
            json!({ "userId": 9999, "roleId": role_id(&roles, "teacher") }),
        )
        .await;
    assert_eq!(missing_user.status, StatusCode::NOT_FOUND);
    assert_eq!(missing_user.body["error"], "User not found");
}

#[tokio::test]
async fn test_predefined_roles_are_protected() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;
    let roles = app.get("/api/roles", Some(&token)).await.body;
    let teacher = role_id(&roles, "teacher");
    let uri = format!("/api/roles/{}", teacher);

    let delete = app.request("DELETE", &uri, Some(&token), None).await;
    assert_eq!(delete.status, StatusCode::BAD_REQUEST);
    assert_eq!(delete.body["error"], "Cannot delete a predefined role");

    let rename = app
        .request("PUT", &uri, Some(&token), Some(json!({ "name": "moderator" })))
        .await;
    assert_eq!(rename.status, StatusCode::BAD_REQUEST);

    let describe = app
        .request(
            "PUT",
            &uri,
            Some(&token),
            Some(json!({ "description": "Runs classes" })),
        )
        .await;
    assert_eq!(describe.status, StatusCode::OK);
    assert_eq!(describe.body["name"], "teacher");
    assert_eq!(describe.body["description"], "Runs classes");
}

#[tokio::test]
async fn test_create_role_validates_name() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let invalid = app
        .post("/api/roles", Some(&token), json!({ "name": "wizard" }))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.body["error"], "Invalid role name: wizard");

    let duplicate = app
        .post("/api/roles", Some(&token), json!({ "name": "teacher" }))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_missing_role_is_not_found() {
    let app = spawn_app().await;
    let token = admin_token(&app).await;

    let response = app.get("/api/roles/4242", Some(&token)).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_roles_visible_to_self_and_admin_only() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    let email = generate_unique_email();
    let owner_id = app.register(&email, "password123").await;
    let owner = app.access_token(&email, "password123").await;

    let other_email = generate_unique_email();
    app.register(&other_email, "password123").await;
    let other = app.access_token(&other_email, "password123").await;

    let uri = format!("/api/roles/user/{}", owner_id);

    let own = app.get(&uri, Some(&owner)).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body[0]["name"], "user");

    assert_eq!(app.get(&uri, Some(&admin)).await.status, StatusCode::OK);
    assert_eq!(app.get(&uri, Some(&other)).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get(&uri, None).await.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_admin_requires_admin() {
    let app = spawn_app().await;
    let email = generate_unique_email();
    app.register(&email, "password123").await;
    let token = app.access_token(&email, "password123").await;

    let response = app.get("/api/roles", Some(&token)).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "Insufficient role");
}
