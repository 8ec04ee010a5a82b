use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::app::{db, error::AppError, AppState};

pub fn session_cookie(session_id: impl Into<String>) -> Cookie<'static> {
    Cookie::build(("session_id", session_id.into()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(("session_id", ""))
        .path("/")
        .removal()
        .into()
}

/// The authenticated caller, loaded from the session cookie.
/// Passed explicitly to handlers; there is no module-level current user.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub id: String,
    pub user_id: String,
}

/// Extractor for JSON API routes. Missing or expired sessions reject with
/// 401 `{ "error": "Unauthorized" }` before the handler runs.
pub struct ApiAuthenticatedSession(pub SessionContext);

#[async_trait]
impl FromRequestParts<AppState> for ApiAuthenticatedSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Unauthorized)?;

        let session_id = jar
            .get("session_id")
            .map(|c| c.value().to_string())
            .ok_or(AppError::Unauthorized)?;

        let session = db::sessions::find_valid(&state.db, &session_id)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::Unauthorized)?;

        Ok(Self(SessionContext {
            id: session.id,
            user_id: session.user_id,
        }))
    }
}
