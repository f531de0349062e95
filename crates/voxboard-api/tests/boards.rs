mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use voxboard_types::roles::GlobalRole;

#[tokio::test]
async fn missing_and_invalid_credentials_are_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/boards", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing bearer credential");

    let (status, body) = app.get("/boards", "not-a-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid or expired credential");
}

#[tokio::test]
async fn health_and_categories_are_public() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn board_seven_membership_scenario() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", GlobalRole::AppAdmin);
    let (subject, token) = app.user("s@example.com", GlobalRole::User);

    app.state
        .db
        .with_conn_mut(|conn| {
            conn.execute("INSERT INTO boards (id, name) VALUES (7, 'Seven')", [])?;
            conn.execute(
                "INSERT INTO feedback (board_id, title, description, category_id)
                 VALUES (7, 'Export', 'CSV export please', 1)",
                [],
            )?;
            Ok(())
        })
        .unwrap();

    let (status, _) = app.get("/boards/7", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/boards/7/members",
            &admin,
            json!({ "email": "s@example.com", "role": "user" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/boards/7", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": 7, "name": "Seven" }));

    let (status, feedback) = app.get("/boards/7/feedback", &token).await;
    assert_eq!(status, StatusCode::OK);
    let feedback_id = feedback[0]["id"].as_i64().unwrap();

    let (status, _) = app
        .put(
            &format!("/feedback/{feedback_id}/status"),
            &token,
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Member listing is Manager+ as well
    let (status, _) = app.get("/boards/7/members", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, members) = app.get("/boards/7/members", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members[0]["userId"], subject.id);
    assert_eq!(members[0]["boardRole"], "user");
}

#[tokio::test]
async fn admin_reaches_boards_without_membership() {
    let app = TestApp::new();
    let (_, creator) = app.user("creator@example.com", GlobalRole::AppAdmin);
    let (_, other_admin) = app.user("other@example.com", GlobalRole::AppAdmin);

    let (status, board) = app.post("/boards", &creator, json!({ "name": "Roadmap" })).await;
    assert_eq!(status, StatusCode::CREATED);
    let board_id = board["id"].as_i64().unwrap();

    let (status, _) = app.get(&format!("/boards/{board_id}"), &other_admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, boards) = app.get("/boards", &other_admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(boards.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn creator_becomes_stakeholder() {
    let app = TestApp::new();
    let (creator, token) = app.user("creator@example.com", GlobalRole::AppAdmin);

    let (_, board) = app.post("/boards", &token, json!({ "name": "Roadmap" })).await;
    let board_id = board["id"].as_i64().unwrap();

    let (_, members) = app.get(&format!("/boards/{board_id}/members"), &token).await;
    assert_eq!(members[0]["userId"], creator.id);
    assert_eq!(members[0]["boardRole"], "stakeholder");
}

#[tokio::test]
async fn only_admins_create_boards() {
    let app = TestApp::new();
    let (_, stakeholder) = app.user("sh@example.com", GlobalRole::Stakeholder);

    let (status, _) = app.post("/boards", &stakeholder, json!({ "name": "Mine" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn board_name_length_limits() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", GlobalRole::AppAdmin);

    let (status, board) = app.post("/boards", &admin, json!({ "name": "a".repeat(255) })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(board["name"].as_str().unwrap().len(), 255);

    let (status, body) = app.post("/boards", &admin, json!({ "name": "a".repeat(256) })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "board name cannot exceed 255 characters");

    for name in ["", "   \t "] {
        let (status, _) = app.post("/boards", &admin, json!({ "name": name })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn stakeholder_member_manages_board() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", GlobalRole::AppAdmin);
    let (_, manager) = app.user("pm@example.com", GlobalRole::User);
    let (dev, dev_token) = app.user("dev@example.com", GlobalRole::User);

    let (_, board) = app.post("/boards", &admin, json!({ "name": "Roadmap" })).await;
    let board_id = board["id"].as_i64().unwrap();
    app.post(
        &format!("/boards/{board_id}/members"),
        &admin,
        json!({ "email": "pm@example.com", "role": "stakeholder" }),
    )
    .await;

    let (status, renamed) = app
        .put(&format!("/boards/{board_id}"), &manager, json!({ "name": "  Q3 Roadmap " }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Q3 Roadmap");

    let (status, _) = app
        .post(
            &format!("/boards/{board_id}/members"),
            &manager,
            json!({ "email": "dev@example.com", "role": "user" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/boards/{board_id}"), &dev_token).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/boards/{board_id}/members/{}", dev.id);
    let (status, _) = app.send(Method::DELETE, &uri, Some(manager.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/boards/{board_id}"), &dev_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::DELETE, &uri, Some(manager.as_str()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn adding_unknown_email_is_not_found() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", GlobalRole::AppAdmin);
    let (_, board) = app.post("/boards", &admin, json!({ "name": "Roadmap" })).await;
    let board_id = board["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            &format!("/boards/{board_id}/members"),
            &admin,
            json!({ "email": "ghost@example.com", "role": "user" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user not found");
}

#[tokio::test]
async fn unknown_roles_are_bad_requests() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", GlobalRole::AppAdmin);
    let (user, _) = app.user("dev@example.com", GlobalRole::User);
    let (_, board) = app.post("/boards", &admin, json!({ "name": "Roadmap" })).await;
    let board_id = board["id"].as_i64().unwrap();

    let (status, body) = app
        .post(
            &format!("/boards/{board_id}/members"),
            &admin,
            json!({ "email": "dev@example.com", "role": "owner" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("owner"));

    let (status, body) = app
        .put(&format!("/admin/users/{}/role", user.id), &admin, json!({ "role": "superuser" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("superuser"));
}

#[tokio::test]
async fn global_roles_are_admin_only() {
    let app = TestApp::new();
    let (_, admin) = app.user("admin@example.com", GlobalRole::AppAdmin);
    let (user, token) = app.user("dev@example.com", GlobalRole::User);
    let uri = format!("/admin/users/{}/role", user.id);

    let (status, _) = app.put(&uri, &token, json!({ "role": "app_admin" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.put(&uri, &admin, json!({ "role": "stakeholder" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "stakeholder");

    let (status, profile) = app.get("/auth/profile", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["role"], "stakeholder");
    assert_eq!(profile["boardRoles"], json!({}));
}
