mod common;

use crate::common::*;

#[tokio::test]
async fn create_org_makes_caller_the_owner() {
    let pool = test_pool().await;
    let app = test_router(pool);
    let (cookie, user_id) = signup_user(&app, "owner@example.com", "Owner").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/orgs",
            Some(&cookie),
            Some(serde_json::json!({ "name": "Acme", "slug": "acme" })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED);
    assert_eq!(body["owner_id"], user_id);
    assert_eq!(body["slug"], "acme");
}

#[tokio::test]
async fn public_user_may_own_only_one_org() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let (cookie, user_id) = signup_user(&app, "owner@example.com", "Owner").await;
    create_org(&app, &cookie, "Acme", "acme").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/orgs",
            Some(&cookie),
            Some(serde_json::json!({ "name": "Globex", "slug": "globex" })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Organization limit reached");

    // higher tiers are not limited
    set_global_role(&pool, &user_id, "partner").await;
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/orgs",
            Some(&cookie),
            Some(serde_json::json!({ "name": "Globex", "slug": "globex" })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED);
}

#[tokio::test]
async fn slug_must_be_unique_and_well_formed() {
    let pool = test_pool().await;
    let app = test_router(pool);
    let (cookie, _) = signup_user(&app, "a@example.com", "A").await;
    let (cookie_b, _) = signup_user(&app, "b@example.com", "B").await;
    create_org(&app, &cookie, "Acme", "acme").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/orgs",
            Some(&cookie_b),
            Some(serde_json::json!({ "name": "Other", "slug": "acme" })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Slug already taken");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/orgs",
            Some(&cookie_b),
            Some(serde_json::json!({ "name": "Other", "slug": "Bad Slug!" })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn show_is_member_only() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let (cookie, _) = signup_user(&app, "owner@example.com", "Owner").await;
    let (cookie_b, user_b) = signup_user(&app, "b@example.com", "B").await;
    let org_id = create_org(&app, &cookie, "Acme", "acme").await;

    let uri = format!("/api/orgs/{}", org_id);
    let (status, _) = send(&app, json_request("GET", &uri, Some(&cookie_b), None)).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);

    add_staff_direct(&pool, &org_id, &user_b, 1).await;
    let (status, body) = send(&app, json_request("GET", &uri, Some(&cookie_b), None)).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["name"], "Acme");
}

#[tokio::test]
async fn update_requires_owner_or_level_five() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let (cookie, _) = signup_user(&app, "owner@example.com", "Owner").await;
    let (cookie_b, user_b) = signup_user(&app, "b@example.com", "B").await;
    let org_id = create_org(&app, &cookie, "Acme", "acme").await;
    add_staff_direct(&pool, &org_id, &user_b, 4).await;

    let uri = format!("/api/orgs/{}", org_id);
    let update = serde_json::json!({ "name": "Acme Renamed" });

    let (status, _) = send(&app, json_request("PUT", &uri, Some(&cookie_b), Some(update.clone()))).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);

    let (status, body) = send(&app, json_request("PUT", &uri, Some(&cookie), Some(update))).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["name"], "Acme Renamed");
}
