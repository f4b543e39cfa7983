// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use axum::http::{StatusCode, header};
use serde_json::json;

use common::*;

#[tokio::test]
async fn register_login_and_read_session() {
    let app = setup();
    let token = login_as(&app, "Ana", "Ana@Example.com").await;

    let reply = send(&app, get("/api/auth/session", Some(&token))).await;
    assert_eq!(reply.status, StatusCode::OK);
    let user = reply.json();
    assert_eq!(user["name"], "Ana");
    assert_eq!(user["email"], "ana@example.com");
}

#[tokio::test]
async fn register_reports_success_message() {
    let app = setup();
    let reply = send(
        &app,
        register_request(
            "10.0.0.2",
            json!({"name": " Bo ", "email": "bo@example.com", "password": "12345678"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert!(
        reply.json()["message"]
            .as_str()
            .unwrap()
            .starts_with("Registration successful!")
    );
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let (app, state) = setup_with(test_config());
    login_as(&app, "Ana", "ana@example.com").await;
    let reply = send(
        &app,
        register_request(
            "10.0.0.3",
            json!({"name": "Ana 2", "email": "ANA@example.com", "password": "another-pass"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.json()["error"], "This email is already registered.");

    let conn = state.db.lock().unwrap();
    for table in ["identities", "users"] {
        let rows: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE email='ana@example.com'", table),
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1, "{}", table);
    }
}

#[tokio::test]
async fn register_validates_fields() {
    let app = setup();
    let cases = [
        (
            json!({"name": "", "email": "a@b.co", "password": "12345678"}),
            "Please enter your name.",
        ),
        (
            json!({"name": "A", "email": "not-an-email", "password": "12345678"}),
            "Please enter a valid email address.",
        ),
        (
            json!({"name": "A", "email": "a@b.co", "password": "1234567"}),
            "Password must be at least 8 characters long.",
        ),
    ];
    for (i, (body, message)) in cases.into_iter().enumerate() {
        let reply = send(&app, register_request(&format!("10.1.0.{}", i), body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(reply.json()["error"], message);
    }
}

#[tokio::test]
async fn malformed_register_body_is_bad_request() {
    let app = setup();
    let mut req = register_request("10.0.0.4", json!({}));
    *req.body_mut() = axum::body::Body::from("{not json");
    let reply = send(&app, req).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "Invalid request body.");
}

#[tokio::test]
async fn sixth_registration_from_one_ip_is_limited() {
    let app = setup();
    for i in 0..5 {
        let reply = send(
            &app,
            register_request(
                "203.0.113.7",
                json!({"name": "U", "email": format!("u{}@example.com", i), "password": "12345678"}),
            ),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED, "attempt {}", i);
    }

    let reply = send(
        &app,
        register_request(
            "203.0.113.7",
            json!({"name": "U", "email": "u5@example.com", "password": "12345678"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        reply.json()["error"],
        "Too many registration attempts. Please try again later."
    );

    // Invalid bodies count too, and other clients are unaffected.
    let reply = send(&app, register_request("203.0.113.7", json!({}))).await;
    assert_eq!(reply.status, StatusCode::TOO_MANY_REQUESTS);
    let reply = send(
        &app,
        register_request(
            "203.0.113.8",
            json!({"name": "U", "email": "u5@example.com", "password": "12345678"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED);
}

#[tokio::test]
async fn failed_profile_insert_leaves_identity_and_reports_500() {
    let (app, state) = setup_with(test_config());
    state
        .db
        .lock()
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER no_profiles BEFORE INSERT ON users \
             BEGIN SELECT RAISE(ABORT, 'profiles disabled'); END;",
        )
        .unwrap();

    let reply = send(
        &app,
        register_request(
            "10.0.0.5",
            json!({"name": "Orphan", "email": "orphan@example.com", "password": "12345678"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply.json()["error"].as_str().unwrap().contains("profile"));

    let identities: i64 = state
        .db
        .lock()
        .unwrap()
        .query_row(
            "SELECT COUNT(*) FROM identities WHERE email='orphan@example.com'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(identities, 1);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = setup();
    login_as(&app, "Ana", "ana@example.com").await;
    let reply = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({"email": "ana@example.com", "password": "wrong password"}),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guard_redirects_visitors_without_a_session() {
    let app = setup();
    for uri in ["/dashboard", "/api/accounts", "/history/export.csv"] {
        let reply = send(&app, get(uri, None)).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(reply.headers[header::LOCATION], "/login");
    }

    let reply = send(&app, get("/dashboard", Some("not-a-real-token"))).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);

    let reply = send(&app, get("/login", None)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = send(&app, get("/api/health", None)).await;
    assert_eq!(reply.text(), "OK");
}

#[tokio::test]
async fn logout_invalidates_the_token() {
    let app = setup();
    let token = login_as(&app, "Ana", "ana@example.com").await;

    let reply = send(&app, json_request("POST", "/api/auth/logout", Some(&token), json!({}))).await;
    assert_eq!(reply.status, StatusCode::NO_CONTENT);

    let reply = send(&app, get("/api/auth/session", Some(&token))).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
}
