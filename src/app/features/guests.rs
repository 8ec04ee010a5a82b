use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use ulid::Ulid;
use validator::Validate;

use crate::app::{
    access::{self, Requirement, LEVEL_MANAGE_STAFF},
    db,
    domain::GuestCode,
    error::AppError,
    session::ApiAuthenticatedSession,
    AppState,
};

/// Request body for issuing a guest code.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueGuestCodeRequest {
    /// Lifetime in hours; defaults to the configured guest code lifetime.
    #[validate(range(min = 1, max = 8760))]
    pub expires_in_hours: Option<i64>,
}

/// Request body for redeeming a guest code. No session required.
#[derive(Debug, Deserialize, Validate)]
pub struct RedeemGuestCodeRequest {
    pub organization_id: String,
    pub code: String,
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
}

/// Response for an issued guest account.
#[derive(Debug, Serialize)]
pub struct GuestAccountResponse {
    pub id: String,
    pub organization_id: String,
    pub guest_code: String,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub expires_at: i64,
    pub last_accessed_at: Option<i64>,
}

impl From<db::guest_accounts::GuestAccount> for GuestAccountResponse {
    fn from(g: db::guest_accounts::GuestAccount) -> Self {
        Self {
            id: g.id,
            organization_id: g.organization_id,
            guest_code: g.guest_code,
            display_name: g.display_name,
            email: g.email,
            phone: g.phone,
            expires_at: g.expires_at,
            last_accessed_at: g.last_accessed_at,
        }
    }
}

/// Response for a successful redemption: the guest identity plus the
/// organization's public identity.
#[derive(Debug, Serialize)]
pub struct RedeemResponse {
    pub guest: GuestAccountResponse,
    pub organization: OrganizationIdentity,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct OrganizationIdentity {
    pub id: String,
    pub name: String,
}

/// Regeneration attempts before giving up on a free code.
const MAX_CODE_ATTEMPTS: usize = 5;

/// Pick a code not already issued for this organization. Codes are random,
/// so collisions are rare; every candidate is checked before use and the
/// search gives up after a bounded number of attempts rather than letting
/// the UNIQUE constraint surface as a 500.
pub async fn unique_code(
    pool: &sqlx::SqlitePool,
    organization_id: &str,
    mut generate: impl FnMut() -> GuestCode,
) -> Result<GuestCode, AppError> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let candidate = generate();
        if db::guest_accounts::find_by_org_and_code(pool, organization_id, &candidate)
            .await?
            .is_none()
        {
            return Ok(candidate);
        }
    }
    Err(AppError::Internal)
}

/// POST /api/orgs/:org_id/guests — Issue a guest code. Level 5 or owner.
pub async fn issue(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Json(request): Json<IssueGuestCodeRequest>,
) -> Result<(StatusCode, Json<GuestAccountResponse>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    access::resolve(
        &state.db,
        &session.user_id,
        &org_id,
        Requirement::Level(LEVEL_MANAGE_STAFF),
    )
    .await?;

    let hours = request.expires_in_hours.unwrap_or(state.config.guest_code_hours);
    let expires_at = (OffsetDateTime::now_utc() + Duration::hours(hours)).unix_timestamp();

    let guest_code = unique_code(&state.db, &org_id, GuestCode::generate).await?;

    let guest_id = Ulid::new().to_string();
    let new_guest = db::guest_accounts::NewGuestAccount {
        id: guest_id.clone(),
        organization_id: org_id,
        guest_code,
        expires_at,
    };
    db::guest_accounts::insert(&state.db, &new_guest).await?;

    let guest = db::guest_accounts::find_by_org_and_code(
        &state.db,
        &new_guest.organization_id,
        &new_guest.guest_code,
    )
    .await?
    .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(guest.into())))
}

/// GET /api/orgs/:org_id/guests — List issued guest accounts. Level 5 or owner.
pub async fn list(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<GuestAccountResponse>>, AppError> {
    access::resolve(
        &state.db,
        &session.user_id,
        &org_id,
        Requirement::Level(LEVEL_MANAGE_STAFF),
    )
    .await?;

    let guests = db::guest_accounts::list_for_org(&state.db, &org_id).await?;
    Ok(Json(guests.into_iter().map(GuestAccountResponse::from).collect()))
}

/// POST /api/guest-access — Redeem a guest code. No account needed.
///
/// Codes are reusable until expiry: the same valid code with the same
/// display name yields equivalent data every time. An unknown code is a
/// 404, an expired one a 403, so the two cannot be confused.
pub async fn redeem(
    State(state): State<AppState>,
    Json(request): Json<RedeemGuestCodeRequest>,
) -> Result<Json<RedeemResponse>, AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    if request.display_name.trim().is_empty() {
        return Err(AppError::Validation("Display name is required".to_string()));
    }

    let code = GuestCode::new(&request.code)
        .map_err(|e| AppError::Validation(e.message.map(|m| m.to_string()).unwrap_or_else(|| "Invalid guest code".to_string())))?;

    // An unknown organization reads the same as an unknown code:
    // the endpoint is unauthenticated and must not confirm org ids.
    let org = db::organizations::find_by_id(&state.db, &request.organization_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid guest code".to_string()))?;

    let guest = db::guest_accounts::find_by_org_and_code(&state.db, &org.id, &code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid guest code".to_string()))?;

    if guest.is_expired(OffsetDateTime::now_utc()) {
        return Err(AppError::Forbidden("Guest code expired".to_string()));
    }

    db::guest_accounts::record_access(
        &state.db,
        &guest.id,
        request.display_name.trim(),
        request.email.as_deref(),
        request.phone.as_deref(),
    )
    .await?;

    let guest = db::guest_accounts::find_by_org_and_code(&state.db, &org.id, &code)
        .await?
        .ok_or(AppError::Internal)?;

    let expires_at = guest.expires_at;
    Ok(Json(RedeemResponse {
        guest: guest.into(),
        organization: OrganizationIdentity {
            id: org.id,
            name: org.name,
        },
        expires_at,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orgs/:org_id/guests", get(list).post(issue))
        .route("/api/guest-access", post(redeem))
}
