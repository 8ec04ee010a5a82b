use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::{
    db,
    domain::{Email, Password},
    error::AppError,
    session::{self, ApiAuthenticatedSession},
    AppState,
};

pub mod service;

/// Request body for signup.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for the authenticated user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
}

/// POST /api/auth/signup — Create an account and start a session.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> Result<(CookieJar, (StatusCode, Json<UserResponse>)), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    let email = Email::new(request.email)
        .map_err(|e| AppError::Validation(e.message.map(|m| m.to_string()).unwrap_or_else(|| "Invalid email".to_string())))?;
    let password = Password::new(request.password)
        .map_err(|e| AppError::Validation(e.message.map(|m| m.to_string()).unwrap_or_else(|| "Invalid password".to_string())))?;

    let (user_id, session_id) = service::signup(
        &state.db,
        &email,
        &password,
        request.display_name.trim(),
        state.config.session_days,
    )
    .await?;

    let user = db::users::find_by_id(&state.db, &user_id.as_str())
        .await?
        .ok_or(AppError::Internal)?;

    let jar = jar.add(session::session_cookie(session_id));
    Ok((
        jar,
        (
            StatusCode::CREATED,
            Json(UserResponse {
                id: user.id,
                email: user.email,
                display_name: user.display_name,
                role: user.role,
            }),
        ),
    ))
}

/// POST /api/auth/login — Verify credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), AppError> {
    let email = Email::new(request.email)
        .map_err(|_| AppError::Validation("Invalid email or password".to_string()))?;
    let password = Password::for_verification(request.password);

    let (user_id, session_id) =
        service::login(&state.db, &email, &password, state.config.session_days).await?;

    let user = db::users::find_by_id(&state.db, &user_id.as_str())
        .await?
        .ok_or(AppError::Internal)?;

    let jar = jar.add(session::session_cookie(session_id));
    Ok((
        jar,
        Json(UserResponse {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            role: user.role,
        }),
    ))
}

/// POST /api/auth/logout — End the current session.
pub async fn logout(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    db::sessions::delete(&state.db, &session.id).await?;

    let jar = jar.add(session::clear_session_cookie());
    Ok((jar, Json(serde_json::json!({ "message": "Logged out" }))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}
