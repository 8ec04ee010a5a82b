mod common;

use crate::common::*;

async fn setup() -> (sqlx::SqlitePool, axum::Router, String, String) {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let (owner_cookie, _) = signup_user(&app, "owner@example.com", "Owner").await;
    let org_id = create_org(&app, &owner_cookie, "Acme", "acme").await;
    (pool, app, owner_cookie, org_id)
}

async fn issue_code(app: &axum::Router, cookie: &str, org_id: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            &format!("/api/orgs/{}/guests", org_id),
            Some(cookie),
            Some(serde_json::json!({})),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED, "issue_code failed: {}", body);
    body["guest_code"].as_str().unwrap().to_string()
}

fn redeem_body(org_id: &str, code: &str, display_name: &str) -> serde_json::Value {
    serde_json::json!({
        "organization_id": org_id,
        "code": code,
        "display_name": display_name,
    })
}

#[tokio::test]
async fn issuance_requires_level_five() {
    let (pool, app, _owner_cookie, org_id) = setup().await;
    let (cookie4, user4) = signup_user(&app, "l4@example.com", "L4").await;
    add_staff_direct(&pool, &org_id, &user4, 4).await;
    let (cookie5, user5) = signup_user(&app, "l5@example.com", "L5").await;
    add_staff_direct(&pool, &org_id, &user5, 5).await;

    let uri = format!("/api/orgs/{}/guests", org_id);
    let (status, _) = send(&app, json_request("POST", &uri, Some(&cookie4), Some(serde_json::json!({})))).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);

    let (status, body) = send(&app, json_request("POST", &uri, Some(&cookie5), Some(serde_json::json!({})))).await;
    assert_eq!(status, http::StatusCode::CREATED);
    let code = body["guest_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

    // listing shares the same gate
    let (status, _) = send(&app, json_request("GET", &uri, Some(&cookie4), None)).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);
    let (status, list) = send(&app, json_request("GET", &uri, Some(&cookie5), None)).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn issued_code_is_verified_free_before_insert() {
    use dealdeck::app::domain::GuestCode;
    use dealdeck::app::features::guests::unique_code;

    let (pool, app, owner_cookie, org_id) = setup().await;
    let taken = GuestCode::new(&issue_code(&app, &owner_cookie, &org_id).await).unwrap();
    let fresh = GuestCode::new("FRESH1").unwrap();

    // a colliding candidate is regenerated, not inserted
    let mut sequence = vec![fresh.clone(), taken.clone()];
    let picked = unique_code(&pool, &org_id, || sequence.pop().unwrap())
        .await
        .unwrap();
    assert_eq!(picked, fresh);

    // if every candidate collides the search fails instead of inserting a duplicate
    let result = unique_code(&pool, &org_id, || taken.clone()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn redeem_twice_yields_equivalent_data() {
    let (_pool, app, owner_cookie, org_id) = setup().await;
    let code = issue_code(&app, &owner_cookie, &org_id).await;

    let (status, first) = send(
        &app,
        json_request("POST", "/api/guest-access", None, Some(redeem_body(&org_id, &code, "Visitor"))),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(first["guest"]["display_name"], "Visitor");
    assert_eq!(first["organization"]["id"], org_id);
    assert_eq!(first["organization"]["name"], "Acme");

    // codes stay valid until expiry
    let (status, second) = send(
        &app,
        json_request("POST", "/api/guest-access", None, Some(redeem_body(&org_id, &code, "Visitor"))),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(second["guest"]["id"], first["guest"]["id"]);
    assert_eq!(second["expires_at"], first["expires_at"]);
}

#[tokio::test]
async fn code_is_case_insensitive() {
    let (_pool, app, owner_cookie, org_id) = setup().await;
    let code = issue_code(&app, &owner_cookie, &org_id).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/guest-access",
            None,
            Some(redeem_body(&org_id, &code.to_lowercase(), "Visitor")),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let (_pool, app, owner_cookie, org_id) = setup().await;
    issue_code(&app, &owner_cookie, &org_id).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/guest-access", None, Some(redeem_body(&org_id, "ZZZZZZ", "Visitor"))),
    )
    .await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid guest code");

    // an unknown organization is indistinguishable from an unknown code
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/guest-access",
            None,
            Some(redeem_body("01HZ9999999999999999999999", "ZZZZZZ", "Visitor")),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid guest code");
}

#[tokio::test]
async fn expired_code_is_always_refused() {
    let (pool, app, owner_cookie, org_id) = setup().await;
    let code = issue_code(&app, &owner_cookie, &org_id).await;

    let past = time::OffsetDateTime::now_utc().unix_timestamp() - 60;
    sqlx::query("UPDATE guest_accounts SET expires_at = ? WHERE guest_code = ?")
        .bind(past)
        .bind(&code)
        .execute(&pool)
        .await
        .unwrap();

    for _ in 0..2 {
        let (status, body) = send(
            &app,
            json_request("POST", "/api/guest-access", None, Some(redeem_body(&org_id, &code, "Visitor"))),
        )
        .await;
        assert_eq!(status, http::StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Guest code expired");
    }
}

#[tokio::test]
async fn display_name_is_required() {
    let (_pool, app, owner_cookie, org_id) = setup().await;
    let code = issue_code(&app, &owner_cookie, &org_id).await;

    let (status, _) = send(
        &app,
        json_request("POST", "/api/guest-access", None, Some(redeem_body(&org_id, &code, "   "))),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/guest-access",
            None,
            Some(serde_json::json!({ "organization_id": org_id, "code": code, "display_name": "" })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_code_is_rejected_before_lookup() {
    let (_pool, app, _owner_cookie, org_id) = setup().await;

    for bad in ["", "ABC", "TOOLONG1", "AB-CD!"] {
        let (status, _) = send(
            &app,
            json_request("POST", "/api/guest-access", None, Some(redeem_body(&org_id, bad, "Visitor"))),
        )
        .await;
        assert_eq!(status, http::StatusCode::BAD_REQUEST, "code {:?} should be rejected", bad);
    }
}

#[tokio::test]
async fn redemption_records_contact_details() {
    let (_pool, app, owner_cookie, org_id) = setup().await;
    let code = issue_code(&app, &owner_cookie, &org_id).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/guest-access",
            None,
            Some(serde_json::json!({
                "organization_id": org_id,
                "code": code,
                "display_name": "Visitor",
                "email": "visitor@example.com",
                "phone": "+1 555 0100",
            })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["guest"]["email"], "visitor@example.com");
    assert_eq!(body["guest"]["phone"], "+1 555 0100");
    assert!(body["guest"]["last_accessed_at"].is_i64());

    // issuers see the recorded details
    let (_, list) = send(
        &app,
        json_request("GET", &format!("/api/orgs/{}/guests", org_id), Some(&owner_cookie), None),
    )
    .await;
    assert_eq!(list[0]["display_name"], "Visitor");
}

#[tokio::test]
async fn custom_expiry_is_honored() {
    let (_pool, app, owner_cookie, org_id) = setup().await;

    let before = time::OffsetDateTime::now_utc().unix_timestamp();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/orgs/{}/guests", org_id),
            Some(&owner_cookie),
            Some(serde_json::json!({ "expires_in_hours": 1 })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED);
    let expires_at = body["expires_at"].as_i64().unwrap();
    assert!(expires_at >= before + 3600 && expires_at <= before + 3700);

    // out-of-range lifetimes are rejected
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/orgs/{}/guests", org_id),
            Some(&owner_cookie),
            Some(serde_json::json!({ "expires_in_hours": 0 })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
}
