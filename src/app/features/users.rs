use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    db,
    domain::GlobalRole,
    error::AppError,
    features::auth::UserResponse,
    session::ApiAuthenticatedSession,
    AppState,
};

/// Request body for a global role change.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: GlobalRole,
}

/// GET /api/me — The authenticated user's own record.
pub async fn me(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let user = db::users::find_by_id(&state.db, &session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        role: user.role,
    }))
}

/// PUT /api/users/:user_id/role — Change a user's global tier. Admin tier only.
pub async fn update_role(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let caller = db::users::find_by_id(&state.db, &session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !caller.global_role().is_admin_tier() {
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }

    let target = db::users::find_by_id(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    db::users::update_role(&state.db, &target.id, request.role).await?;

    let user = db::users::find_by_id(&state.db, &target.id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok(Json(UserResponse {
        id: user.id,
        email: user.email,
        display_name: user.display_name,
        role: user.role,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me))
        .route("/api/users/:user_id/role", put(update_role))
}
