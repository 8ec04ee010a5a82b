#![allow(dead_code)]

use axum::body::Body;
use dealdeck::app::{self, AppState};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_router(pool: SqlitePool) -> axum::Router {
    let state = AppState {
        db: pool,
        config: app::config::Config::for_tests(),
    };
    dealdeck::create_router(state)
}

/// Build a JSON request. `cookie` is a full "session_id=..." header value.
pub fn json_request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<serde_json::Value>,
) -> http::Request<Body> {
    let mut builder = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

/// Send a request and return (status, parsed JSON body).
pub async fn send(
    app: &axum::Router,
    request: http::Request<Body>,
) -> (http::StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub fn extract_session_cookie(set_cookie_header: &str) -> Option<String> {
    set_cookie_header
        .split(';')
        .next()
        .filter(|part| part.starts_with("session_id="))
        .map(|part| part.to_string())
}

/// Sign up a user through the API. Returns (cookie header value, user id).
pub async fn signup_user(
    app: &axum::Router,
    email: &str,
    display_name: &str,
) -> (String, String) {
    let request = json_request(
        "POST",
        "/api/auth/signup",
        None,
        Some(serde_json::json!({
            "email": email,
            "password": "Password123",
            "display_name": display_name,
        })),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::CREATED);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookie = extract_session_cookie(&set_cookie).expect("signup must set session cookie");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let user_id = body["id"].as_str().unwrap().to_string();

    (cookie, user_id)
}

/// Create an organization through the API. Returns the organization id.
pub async fn create_org(app: &axum::Router, cookie: &str, name: &str, slug: &str) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/orgs",
            Some(cookie),
            Some(serde_json::json!({ "name": name, "slug": slug })),
        ),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED, "create_org failed: {}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Insert a staff row directly in the database, bypassing the API.
pub async fn add_staff_direct(
    pool: &SqlitePool,
    org_id: &str,
    user_id: &str,
    access_level: i64,
) -> String {
    use dealdeck::app::db::staff;
    use dealdeck::app::domain::{AccessLevel, StaffStatus};

    let staff_id = ulid::Ulid::new().to_string();
    let member = staff::NewStaffMember {
        id: staff_id.clone(),
        organization_id: org_id.to_string(),
        user_id: user_id.to_string(),
        access_level: AccessLevel::new(access_level).unwrap(),
        role: "staff".to_string(),
        status: StaffStatus::Active,
        position: None,
        department: None,
        reports_to: None,
    };
    staff::insert(pool, &member).await.unwrap();
    staff_id
}

/// Create a user directly in the database (bypasses the signup endpoint).
pub async fn create_user_direct(pool: &SqlitePool, email: &str, display_name: &str) -> String {
    use dealdeck::app::db;
    use dealdeck::app::domain::{Email, GlobalRole, HashedPassword, Password, UserId};

    let user_id = UserId::new();
    let password = Password::new("Password123".to_string()).unwrap();
    let new_user = db::NewUser {
        id: user_id.clone(),
        email: Email::new(email.to_string()).unwrap(),
        password_hash: HashedPassword::from_password(&password).unwrap(),
        role: GlobalRole::Public,
        display_name: display_name.to_string(),
    };
    db::users::insert(pool, &new_user).await.unwrap();
    user_id.as_str()
}

/// Create an organization directly in the database.
pub async fn create_org_direct(pool: &SqlitePool, owner_id: &str, slug: &str) -> String {
    use dealdeck::app::db::organizations;
    use dealdeck::app::domain::{OrganizationId, UserId};

    let org_id = OrganizationId::new();
    let new_org = organizations::NewOrganization {
        id: org_id.clone(),
        slug: slug.to_string(),
        name: format!("Org {}", slug),
        description: None,
        owner_id: UserId::from_string(owner_id).unwrap(),
    };
    organizations::insert(pool, &new_org).await.unwrap();
    org_id.as_str()
}

/// Promote a user's global role directly in the database.
pub async fn set_global_role(pool: &SqlitePool, user_id: &str, role: &str) {
    use dealdeck::app::domain::GlobalRole;
    let role = role.parse::<GlobalRole>().unwrap();
    dealdeck::app::db::users::update_role(pool, user_id, role)
        .await
        .unwrap();
}
