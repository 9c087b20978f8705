mod common;

use axum::http::{Method, StatusCode};
use campus_clubs::{auth::Claims, models::Role};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn student_registers_logs_in_and_sees_dashboard() {
    let app = TestApp::with_clubs(&[]).await;
    let token = app.register_student("23BD1A05C7", "hunter22").await;

    let (status, body) = app.get("/student/dashboard", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "23bd1a05c7");
    assert_eq!(body["rollNumber"], "23BD1A05C7");
    assert_eq!(body["joinedClubs"], json!([]));
    assert_eq!(body["pendingRequests"], json!([]));

    // usernames are case-insensitive at login
    app.login("student", "23bd1a05c7", "hunter22").await;
}

#[tokio::test]
async fn duplicate_and_malformed_registrations_are_rejected() {
    let app = TestApp::with_clubs(&[]).await;
    app.register_student("23BD1A05C7", "hunter22").await;

    let (status, body) = app
        .post(
            "/register",
            None,
            json!({ "role": "student", "studentUsername": "23bd1a05c7", "studentPassword": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app
        .post(
            "/register",
            None,
            json!({ "role": "student", "studentUsername": "not-a-roll", "studentPassword": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.post("/register", None, json!({ "role": "wizard" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid role");
}

#[tokio::test]
async fn club_head_must_match_a_club_and_register_once() {
    let app = TestApp::with_clubs(&["mudra"]).await;
    app.register_head("Mudra-Head", "dance-floor").await;

    let (status, body) = app
        .post(
            "/register",
            None,
            json!({ "role": "clubhead", "clubUsername": "mudra-head", "clubPassword": "again" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This club already has a head assigned.");

    let (status, _) = app
        .post(
            "/register",
            None,
            json!({ "role": "clubhead", "clubUsername": "Chess-head", "clubPassword": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_failures() {
    let app = TestApp::with_clubs(&[]).await;
    app.register_student("23BD1A05C7", "hunter22").await;

    let (status, body) = app
        .post(
            "/login",
            None,
            json!({ "role": "student", "username": "23BD1A05C7", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    // right credentials, wrong role
    let (status, _) = app
        .post(
            "/login",
            None,
            json!({ "role": "faculty", "username": "23BD1A05C7", "password": "hunter22" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn join_request_is_visible_on_both_sides() {
    let app = TestApp::with_clubs(&["mudra"]).await;
    let mudra = app.club("mudra").await;
    let student = app.register_student("23BD1A05C7", "hunter22").await;
    let head = app.register_head("Mudra-Head", "dance-floor").await;

    let (status, body) = app
        .post("/student/join-club", Some(&student), json!({ "clubId": mudra.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request sent successfully!");

    let (_, body) = app
        .post("/student/join-club", Some(&student), json!({ "clubId": mudra.id }))
        .await;
    assert_eq!(body["message"], "Request already pending.");

    let (_, dashboard) = app.get("/student/dashboard", Some(&student)).await;
    let student_id = dashboard["id"].as_i64().unwrap();
    assert_eq!(dashboard["pendingRequests"][0]["id"], mudra.id);

    let (_, club) = app.get("/clubhead/dashboard", Some(&head)).await;
    assert_eq!(club["slug"], "mudra");
    assert_eq!(club["pendingRequests"][0]["id"], student_id);
    assert_eq!(club["members"], json!([]));

    let (status, body) = app
        .post(
            "/clubhead/respond",
            Some(&head),
            json!({ "studentId": student_id, "action": "accept" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request has been accepted.");

    let (_, dashboard) = app.get("/student/dashboard", Some(&student)).await;
    assert_eq!(dashboard["joinedClubs"][0]["id"], mudra.id);
    assert_eq!(dashboard["pendingRequests"], json!([]));

    let (_, club) = app.get("/clubhead/dashboard", Some(&head)).await;
    assert_eq!(club["members"][0]["id"], student_id);
    assert_eq!(club["pendingRequests"], json!([]));

    // no request left to answer
    let (status, _) = app
        .post(
            "/clubhead/respond",
            Some(&head),
            json!({ "studentId": student_id, "action": "reject" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/student/join-club", Some(&student), json!({ "clubId": mudra.id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/student/leave-club", Some(&student), json!({ "clubId": mudra.id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, club) = app.get("/clubhead/dashboard", Some(&head)).await;
    assert_eq!(club["members"], json!([]));
}

#[tokio::test]
async fn rejected_request_leaves_no_trace_and_bad_action_is_refused() {
    let app = TestApp::with_clubs(&["mudra"]).await;
    let mudra = app.club("mudra").await;
    let student = app.register_student("23BD1A05C7", "hunter22").await;
    let head = app.register_head("Mudra-Head", "dance-floor").await;

    app.post("/student/join-club", Some(&student), json!({ "clubId": mudra.id }))
        .await;
    let (_, dashboard) = app.get("/student/dashboard", Some(&student)).await;
    let student_id = dashboard["id"].clone();

    let (status, _) = app
        .post(
            "/clubhead/respond",
            Some(&head),
            json!({ "studentId": student_id, "action": "maybe" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/clubhead/respond",
            Some(&head),
            json!({ "studentId": student_id, "action": "reject" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request has been rejected.");

    let (_, dashboard) = app.get("/student/dashboard", Some(&student)).await;
    assert_eq!(dashboard["joinedClubs"], json!([]));
    assert_eq!(dashboard["pendingRequests"], json!([]));

    let (status, _) = app
        .post("/student/join-club", Some(&student), json!({ "clubId": 9999 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_is_approved_by_faculty_then_funded_by_admin() {
    let app = TestApp::with_clubs(&["mudra"]).await;
    let head = app.register_head("Mudra-Head", "dance-floor").await;
    let faculty = app.register_faculty().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/clubhead/events",
            Some(&head),
            json!({
                "title": "Spring Showcase",
                "description": "Annual dance night",
                "date": "2025-03-14",
                "fundRequest": 5000,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let event_id = body["event"]["id"].as_i64().unwrap();
    assert_eq!(body["event"]["status"], "pending");

    let (_, dashboard) = app.get("/faculty/dashboard", Some(&faculty)).await;
    assert_eq!(dashboard["pendingEvents"][0]["id"], event_id);
    assert_eq!(dashboard["pendingEvents"][0]["club"]["slug"], "mudra");

    // funds only go to approved events
    let (status, _) = app
        .post(
            &format!("/admin/events/{event_id}/update-funds"),
            Some(&admin),
            json!({ "approvedFund": 4000 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/faculty/events/respond",
            Some(&faculty),
            json!({ "eventId": event_id, "action": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["status"], "approved");

    let (_, approved) = app.get("/events/approved", None).await;
    assert_eq!(approved[0]["id"], event_id);
    let (_, fetched) = app.get(&format!("/events/{event_id}"), Some(&head)).await;
    assert_eq!(fetched["status"], "approved");
    let (status, _) = app.get(&format!("/events/{event_id}"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            &format!("/admin/events/{event_id}/update-funds"),
            Some(&admin),
            json!({ "approvedFund": 4000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["event"]["approvedFund"], 4000);
    assert_eq!(body["event"]["fundRequest"], 5000);
    assert_eq!(body["event"]["status"], "approved");

    // decisions are final
    let (status, _) = app
        .post(&format!("/admin/events/{event_id}/reject"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, requests) = app.get("/admin/fund-requests", Some(&admin)).await;
    assert_eq!(requests.as_array().unwrap().len(), 1);
    let (_, mine) = app.get("/clubhead/my-events", Some(&head)).await;
    assert_eq!(mine[0]["approvedFund"], 4000);
}

#[tokio::test]
async fn event_validation() {
    let app = TestApp::with_clubs(&["mudra"]).await;
    let head = app.register_head("Mudra-Head", "dance-floor").await;

    for body in [
        json!({ "title": "", "description": "d", "date": "2025-03-14" }),
        json!({ "title": "t", "description": "d", "date": "next tuesday" }),
        json!({ "title": "t", "description": "d", "date": "2025-03-14", "fundRequest": -1 }),
    ] {
        let (status, _) = app.post("/clubhead/events", Some(&head), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let admin = app.admin_token().await;
    let (status, _) = app
        .post("/admin/events/404/approve", Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token_and_role() {
    let app = TestApp::with_clubs(&[]).await;
    let student = app.register_student("23BD1A05C7", "hunter22").await;

    let expired = app
        .keys
        .sign(&Claims {
            id: 1,
            role: Role::Admin,
            username: "root".to_string(),
            name: "Administrator".to_string(),
            exp: jsonwebtoken::get_current_timestamp() - 600,
        })
        .unwrap();

    let routes = [
        (Method::GET, "/student/dashboard"),
        (Method::POST, "/student/join-club"),
        (Method::GET, "/clubhead/dashboard"),
        (Method::POST, "/clubhead/respond"),
        (Method::POST, "/clubhead/events"),
        (Method::GET, "/faculty/dashboard"),
        (Method::POST, "/faculty/events/respond"),
        (Method::GET, "/admin/users"),
        (Method::GET, "/admin/events"),
        (Method::GET, "/admin/fund-requests"),
        (Method::POST, "/admin/events/1/approve"),
        (Method::POST, "/admin/users/1/deactivate"),
        (Method::DELETE, "/admin/users/1"),
    ];
    for (method, uri) in routes {
        let (status, body) = app.request(method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Access denied. No token provided.");

        let (status, _) = app.request(method.clone(), uri, Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");

        let (status, _) = app.request(method, uri, Some(&expired), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, body) = app.get("/admin/users", Some(&student)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn admin_manages_users() {
    let app = TestApp::with_clubs(&["mudra"]).await;
    let mudra = app.club("mudra").await;
    let student = app.register_student("23BD1A05C7", "hunter22").await;
    let admin = app.admin_token().await;

    app.post("/student/join-club", Some(&student), json!({ "clubId": mudra.id }))
        .await;
    let (_, users) = app.get("/admin/users", Some(&admin)).await;
    let users = users.as_array().unwrap().clone();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()));
    let student_id = users.iter().find(|u| u["role"] == "student").unwrap()["id"].clone();
    let admin_id = users.iter().find(|u| u["role"] == "admin").unwrap()["id"].clone();

    let (status, _) = app
        .post(&format!("/admin/users/{admin_id}/deactivate"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&format!("/admin/users/{student_id}/deactivate"), Some(&admin), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .post(
            "/login",
            None,
            json!({ "role": "student", "username": "23BD1A05C7", "password": "hunter22" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is deactivated");

    app.post(&format!("/admin/users/{student_id}/activate"), Some(&admin), json!({}))
        .await;
    app.login("student", "23BD1A05C7", "hunter22").await;

    let (status, _) = app
        .request(Method::DELETE, &format!("/admin/users/{student_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .request(Method::DELETE, &format!("/admin/users/{student_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the pending request went with the student
    let (_, clubs) = app.get("/admin/clubs-detailed", Some(&admin)).await;
    assert_eq!(clubs[0]["pendingRequests"], json!([]));
}

#[tokio::test]
async fn only_admins_register_admins() {
    let app = TestApp::with_clubs(&[]).await;
    let body = json!({ "role": "admin", "adminId": "deputy", "adminPassword": "s3cret" });

    let (status, _) = app.post("/register", None, body.clone()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = app.admin_token().await;
    let (status, body) = app.post("/register", Some(&admin), body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Admin registration successful");
    app.login("admin", "deputy", "s3cret").await;
}

#[tokio::test]
async fn public_club_routes() {
    let app = TestApp::with_clubs(&["mudra", "recurse"]).await;

    let (status, clubs) = app.get("/clubs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(clubs.as_array().unwrap().len(), 2);

    let (_, club) = app.get("/clubs/mudra", None).await;
    assert_eq!(club["name"], "Mudra");
    assert_eq!(club["image"], "Mudra.png");

    let (status, body) = app.get("/clubs/chess", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "the club does not exist");

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn deactivated_and_deleted_accounts_lose_their_tokens() {
    let app = TestApp::with_clubs(&["mudra"]).await;
    let mudra = app.club("mudra").await;
    let student = app.register_student("23BD1A05C7", "hunter22").await;
    let admin = app.admin_token().await;

    let (_, dashboard) = app.get("/student/dashboard", Some(&student)).await;
    let student_id = dashboard["id"].clone();

    app.post(&format!("/admin/users/{student_id}/deactivate"), Some(&admin), json!({}))
        .await;

    let (status, body) = app
        .post("/student/join-club", Some(&student), json!({ "clubId": mudra.id }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Account is deactivated");
    let (status, _) = app.get("/student/dashboard", Some(&student)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.post(&format!("/admin/users/{student_id}/activate"), Some(&admin), json!({}))
        .await;
    let (status, _) = app.get("/student/dashboard", Some(&student)).await;
    assert_eq!(status, StatusCode::OK);

    app.request(Method::DELETE, &format!("/admin/users/{student_id}"), Some(&admin), None)
        .await;
    let (status, body) = app.get("/student/dashboard", Some(&student)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid token.");
}

#[tokio::test]
async fn public_registration_ignores_stale_tokens() {
    let app = TestApp::with_clubs(&[]).await;

    let (status, body) = app
        .post(
            "/register",
            Some("garbage"),
            json!({ "role": "student", "studentUsername": "23BD1A05C7", "studentPassword": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    // a stale token does not unlock admin registration either
    let body = json!({ "role": "admin", "adminId": "deputy", "adminPassword": "s3cret" });
    let (status, _) = app.post("/register", Some("garbage"), body).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_username_fails_like_a_wrong_password() {
    let app = TestApp::with_clubs(&[]).await;

    let (status, body) = app
        .post(
            "/login",
            None,
            json!({ "role": "student", "username": "23BD1A05C8", "password": "hunter22" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}
