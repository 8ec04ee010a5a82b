use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use validator::Validate;

use crate::app::{
    access::{self, Requirement, LEVEL_MANAGE_STAFF},
    db,
    domain::{AccessLevel, StaffStatus},
    error::AppError,
    session::ApiAuthenticatedSession,
    AppState,
};

/// Request body for adding a staff member.
#[derive(Debug, Deserialize, Validate)]
pub struct AddStaffRequest {
    pub user_id: String,
    pub access_level: i64,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub reports_to: Option<String>,
}

/// Request body for updating a staff member.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStaffRequest {
    pub access_level: i64,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
    pub status: StaffStatus,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[validate(length(max = 100))]
    pub department: Option<String>,
    pub reports_to: Option<String>,
}

/// Response for a staff row.
#[derive(Debug, Serialize)]
pub struct StaffResponse {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub access_level: i64,
    pub role: String,
    pub status: String,
    pub position: Option<String>,
    pub department: Option<String>,
    pub reports_to: Option<String>,
    pub created_at: i64,
}

impl From<db::staff::StaffMember> for StaffResponse {
    fn from(m: db::staff::StaffMember) -> Self {
        Self {
            id: m.id,
            organization_id: m.organization_id,
            user_id: m.user_id,
            access_level: m.access_level,
            role: m.role,
            status: m.status,
            position: m.position,
            department: m.department,
            reports_to: m.reports_to,
            created_at: m.created_at,
        }
    }
}

/// GET /api/orgs/:org_id/staff — List the roster. Any member.
pub async fn list(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<StaffResponse>>, AppError> {
    access::resolve(&state.db, &session.user_id, &org_id, Requirement::Member).await?;

    let roster = db::staff::list_for_org(&state.db, &org_id).await?;
    Ok(Json(roster.into_iter().map(StaffResponse::from).collect()))
}

/// POST /api/orgs/:org_id/staff — Add a staff member. Level 5 or owner.
pub async fn add(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Json(request): Json<AddStaffRequest>,
) -> Result<(StatusCode, Json<StaffResponse>), AppError> {
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

    let access_level = AccessLevel::new(request.access_level)
        .map_err(|e| AppError::Validation(e.message.map(|m| m.to_string()).unwrap_or_else(|| "Invalid access level".to_string())))?;

    db::users::find_by_id(&state.db, &request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    // Application-level duplicate check; the UNIQUE constraint backstops races.
    if db::staff::find_by_org_and_user(&state.db, &org_id, &request.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(
            "User is already a staff member of this organization".to_string(),
        ));
    }

    let staff_id = Ulid::new().to_string();
    access::ensure_no_reporting_cycle(&state.db, &org_id, &staff_id, request.reports_to.as_deref())
        .await?;

    let new_member = db::staff::NewStaffMember {
        id: staff_id.clone(),
        organization_id: org_id.clone(),
        user_id: request.user_id,
        access_level,
        role: request.role,
        status: StaffStatus::Active,
        position: request.position,
        department: request.department,
        reports_to: request.reports_to,
    };
    db::staff::insert(&state.db, &new_member).await?;

    let member = db::staff::find_by_id(&state.db, &staff_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(member.into())))
}

/// Fetch a staff row scoped to the org in the path. 404 on mismatch.
async fn staff_in_org(
    pool: &sqlx::SqlitePool,
    org_id: &str,
    staff_id: &str,
) -> Result<db::staff::StaffMember, AppError> {
    let member = db::staff::find_by_id(pool, staff_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Staff member not found".to_string()))?;
    if member.organization_id != org_id {
        return Err(AppError::NotFound("Staff member not found".to_string()));
    }
    Ok(member)
}

/// PUT /api/orgs/:org_id/staff/:staff_id — Update a staff row. Level 5 or owner.
pub async fn update(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, staff_id)): Path<(String, String)>,
    Json(request): Json<UpdateStaffRequest>,
) -> Result<Json<StaffResponse>, AppError> {
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

    let member = staff_in_org(&state.db, &org_id, &staff_id).await?;

    let access_level = AccessLevel::new(request.access_level)
        .map_err(|e| AppError::Validation(e.message.map(|m| m.to_string()).unwrap_or_else(|| "Invalid access level".to_string())))?;

    access::ensure_no_reporting_cycle(&state.db, &org_id, &member.id, request.reports_to.as_deref())
        .await?;

    let fields = db::staff::StaffUpdate {
        access_level,
        role: request.role,
        status: request.status,
        position: request.position,
        department: request.department,
        reports_to: request.reports_to,
    };
    db::staff::update(&state.db, &member.id, &fields).await?;

    let updated = db::staff::find_by_id(&state.db, &member.id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok(Json(updated.into()))
}

/// DELETE /api/orgs/:org_id/staff/:staff_id — Remove a staff member. Level 5 or owner.
pub async fn remove(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, staff_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::resolve(
        &state.db,
        &session.user_id,
        &org_id,
        Requirement::Level(LEVEL_MANAGE_STAFF),
    )
    .await?;

    let member = staff_in_org(&state.db, &org_id, &staff_id).await?;
    db::staff::delete(&state.db, &member.id).await?;

    Ok(Json(serde_json::json!({ "message": "Staff member removed" })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orgs/:org_id/staff", get(list).post(add))
        .route("/api/orgs/:org_id/staff/:staff_id", axum::routing::put(update).delete(remove))
}
