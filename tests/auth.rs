mod common;

use crate::common::*;

#[tokio::test]
async fn signup_creates_public_user_and_session() {
    let pool = test_pool().await;
    let app = test_router(pool);

    let request = json_request(
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "email": "new@example.com",
            "password": "Password123",
            "display_name": "New User",
        })),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, http::StatusCode::CREATED);
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["role"], "public");
    assert_eq!(body["display_name"], "New User");
}

#[tokio::test]
async fn signup_rejects_weak_password() {
    let pool = test_pool().await;
    let app = test_router(pool);

    let request = json_request(
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "email": "weak@example.com",
            "password": "short",
            "display_name": "Weak",
        })),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let pool = test_pool().await;
    let app = test_router(pool);
    signup_user(&app, "dup@example.com", "First").await;

    let request = json_request(
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "email": "dup@example.com",
            "password": "Password123",
            "display_name": "Second",
        })),
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let pool = test_pool().await;
    let app = test_router(pool);
    signup_user(&app, "user@example.com", "User").await;

    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "user@example.com",
            "password": "Password124",
        })),
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_then_me_round_trip() {
    let pool = test_pool().await;
    let app = test_router(pool);
    let (_, user_id) = signup_user(&app, "user@example.com", "User").await;

    let request = json_request(
        "POST",
        "/api/auth/login",
        None,
        Some(serde_json::json!({
            "email": "user@example.com",
            "password": "Password123",
        })),
    );
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::OK);
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookie = extract_session_cookie(&set_cookie).unwrap();

    let (status, body) = send(&app, json_request("GET", "/api/me", Some(&cookie), None)).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["id"], user_id);
}

#[tokio::test]
async fn me_requires_session() {
    let pool = test_pool().await;
    let app = test_router(pool);

    let (status, body) = send(&app, json_request("GET", "/api/me", None, None)).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let (status, _) = send(
        &app,
        json_request("GET", "/api/me", Some("session_id=invalid"), None),
    )
    .await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_session() {
    let pool = test_pool().await;
    let app = test_router(pool);
    let (cookie, _) = signup_user(&app, "user@example.com", "User").await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/auth/logout", Some(&cookie), None),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);

    let (status, _) = send(&app, json_request("GET", "/api/me", Some(&cookie), None)).await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn role_change_requires_admin_tier() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let (cookie_a, user_a) = signup_user(&app, "a@example.com", "A").await;
    let (_, user_b) = signup_user(&app, "b@example.com", "B").await;

    let request = json_request(
        "PUT",
        &format!("/api/users/{}/role", user_b),
        Some(&cookie_a),
        Some(serde_json::json!({ "role": "partner" })),
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);

    // promote A to admin, retry
    set_global_role(&pool, &user_a, "admin").await;

    let request = json_request(
        "PUT",
        &format!("/api/users/{}/role", user_b),
        Some(&cookie_a),
        Some(serde_json::json!({ "role": "partner" })),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["role"], "partner");
}
