use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::{
    access::{self, Requirement, LEVEL_MANAGE_STAFF},
    db,
    domain::{OrganizationId, UserId},
    error::AppError,
    session::ApiAuthenticatedSession,
    AppState,
};

/// Request body for creating an organization.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 3, max = 50))]
    pub slug: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Request body for updating an organization.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateOrganizationRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// Response for an organization.
#[derive(Debug, Serialize)]
pub struct OrganizationResponse {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: String,
    pub created_at: i64,
}

impl From<db::organizations::Organization> for OrganizationResponse {
    fn from(org: db::organizations::Organization) -> Self {
        Self {
            id: org.id,
            slug: org.slug,
            name: org.name,
            description: org.description,
            owner_id: org.owner_id,
            created_at: org.created_at,
        }
    }
}

fn valid_slug(slug: &str) -> bool {
    slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-')
}

/// POST /api/orgs — Create an organization. The caller becomes the owner.
/// Public-tier users may own at most one organization.
pub async fn create(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateOrganizationRequest>,
) -> Result<(StatusCode, Json<OrganizationResponse>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    if !valid_slug(&request.slug) {
        return Err(AppError::Validation(
            "Slug must be lowercase letters, digits, and hyphens".to_string(),
        ));
    }

    let caller = db::users::find_by_id(&state.db, &session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let owner_id = UserId::from_string(&caller.id).map_err(|_| AppError::Internal)?;

    if let Some(limit) = caller.global_role().owned_organization_limit() {
        let owned = db::organizations::count_owned_by(&state.db, &owner_id).await?;
        if owned >= limit {
            return Err(AppError::Forbidden("Organization limit reached".to_string()));
        }
    }

    if db::organizations::find_by_slug(&state.db, &request.slug).await?.is_some() {
        return Err(AppError::Validation("Slug already taken".to_string()));
    }

    let org_id = OrganizationId::new();
    let new_org = db::organizations::NewOrganization {
        id: org_id.clone(),
        slug: request.slug,
        name: request.name,
        description: request.description,
        owner_id,
    };
    db::organizations::insert(&state.db, &new_org).await?;

    let org = db::organizations::find_by_id(&state.db, &org_id.as_str())
        .await?
        .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(org.into())))
}

/// GET /api/orgs/:org_id — Organization details, members and owner only.
pub async fn show(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<OrganizationResponse>, AppError> {
    access::resolve(&state.db, &session.user_id, &org_id, Requirement::Member).await?;

    let org = db::organizations::find_by_id(&state.db, &org_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    Ok(Json(org.into()))
}

/// PUT /api/orgs/:org_id — Update name/description. Owner or level-5 staff.
pub async fn update(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Json(request): Json<UpdateOrganizationRequest>,
) -> Result<Json<OrganizationResponse>, AppError> {
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

    db::organizations::update(&state.db, &org_id, &request.name, request.description.as_deref())
        .await?;

    let org = db::organizations::find_by_id(&state.db, &org_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok(Json(org.into()))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orgs", post(create))
        .route("/api/orgs/:org_id", get(show).put(update))
}
