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
    access::{self, Requirement},
    db,
    domain::{Confidentiality, DealStatus, ParticipantStatus},
    error::AppError,
    session::ApiAuthenticatedSession,
    AppState,
};

/// Request body for creating a deal.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDealRequest {
    pub organization_id: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub confidentiality_level: Option<Confidentiality>,
}

/// Request body for updating deal terms.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDealRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub confidentiality_level: Confidentiality,
}

/// Request body for a deal status change.
#[derive(Debug, Deserialize)]
pub struct UpdateDealStatusRequest {
    pub status: DealStatus,
}

/// Request body for adding a participant.
#[derive(Debug, Deserialize, Validate)]
pub struct AddParticipantRequest {
    pub user_id: String,
    #[validate(length(min = 1, max = 100))]
    pub role: String,
}

/// Request body for changing one's own participation status.
#[derive(Debug, Deserialize)]
pub struct UpdateParticipationRequest {
    pub status: ParticipantStatus,
}

/// Response for a participant row.
#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub id: String,
    pub user_id: String,
    pub role: String,
    pub status: String,
}

impl From<db::deals::DealParticipant> for ParticipantResponse {
    fn from(p: db::deals::DealParticipant) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            role: p.role,
            status: p.status,
        }
    }
}

/// Response for a deal.
#[derive(Debug, Serialize)]
pub struct DealResponse {
    pub id: String,
    pub organization_id: String,
    pub initiator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub confidentiality_level: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub participants: Vec<ParticipantResponse>,
}

impl DealResponse {
    fn new(deal: db::deals::Deal, participants: Vec<db::deals::DealParticipant>) -> Self {
        Self {
            id: deal.id,
            organization_id: deal.organization_id,
            initiator_id: deal.initiator_id,
            title: deal.title,
            description: deal.description,
            confidentiality_level: deal.confidentiality_level,
            status: deal.status,
            created_at: deal.created_at,
            updated_at: deal.updated_at,
            participants: participants.into_iter().map(ParticipantResponse::from).collect(),
        }
    }
}

/// Load a deal and verify the caller may see it.
///
/// Public deals are visible to any authenticated user. Private and
/// confidential deals are visible only to the initiator or an accepted
/// participant; a confidential deal hides its existence (404) while a
/// private one refuses (403).
async fn visible_deal(
    pool: &sqlx::SqlitePool,
    deal_id: &str,
    user_id: &str,
) -> Result<db::deals::Deal, AppError> {
    let deal = db::deals::find_by_id(pool, deal_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Deal not found".to_string()))?;

    match deal.confidentiality() {
        Confidentiality::Public => Ok(deal),
        level => {
            if deal.initiator_id == user_id {
                return Ok(deal);
            }
            let participant = db::deals::find_participant(pool, &deal.id, user_id).await?;
            let accepted = participant
                .map(|p| p.status == ParticipantStatus::Accepted.to_string())
                .unwrap_or(false);
            if accepted {
                return Ok(deal);
            }
            match level {
                Confidentiality::Confidential => {
                    Err(AppError::NotFound("Deal not found".to_string()))
                }
                _ => Err(AppError::Forbidden("Not a participant of this deal".to_string())),
            }
        }
    }
}

/// Only the initiator or an admin-tier global role may edit a deal.
async fn ensure_may_edit(
    pool: &sqlx::SqlitePool,
    deal: &db::deals::Deal,
    user_id: &str,
) -> Result<(), AppError> {
    if deal.initiator_id == user_id {
        return Ok(());
    }
    let caller = db::users::find_by_id(pool, user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    if caller.global_role().is_admin_tier() {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "Only the initiator or an admin may edit this deal".to_string(),
    ))
}

/// POST /api/deals — Create a deal. The caller must be a member (or owner)
/// of the owning organization and becomes the initiator.
pub async fn create(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Json(request): Json<CreateDealRequest>,
) -> Result<(StatusCode, Json<DealResponse>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    access::resolve(
        &state.db,
        &session.user_id,
        &request.organization_id,
        Requirement::Member,
    )
    .await?;

    let deal_id = Ulid::new().to_string();
    let new_deal = db::deals::NewDeal {
        id: deal_id.clone(),
        organization_id: request.organization_id,
        initiator_id: session.user_id.clone(),
        title: request.title,
        description: request.description,
        confidentiality_level: request.confidentiality_level.unwrap_or(Confidentiality::Private),
    };
    db::deals::insert(&state.db, &new_deal).await?;

    let deal = db::deals::find_by_id(&state.db, &deal_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(DealResponse::new(deal, Vec::new()))))
}

/// GET /api/deals — Deals visible to the caller.
pub async fn list(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
) -> Result<Json<Vec<DealResponse>>, AppError> {
    let deals = db::deals::list_visible_to(&state.db, &session.user_id).await?;
    let mut out = Vec::with_capacity(deals.len());
    for deal in deals {
        let participants = db::deals::list_participants(&state.db, &deal.id).await?;
        out.push(DealResponse::new(deal, participants));
    }
    Ok(Json(out))
}

/// GET /api/deals/:deal_id — One deal, confidentiality rules applied.
pub async fn show(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
) -> Result<Json<DealResponse>, AppError> {
    let deal = visible_deal(&state.db, &deal_id, &session.user_id).await?;
    let participants = db::deals::list_participants(&state.db, &deal.id).await?;
    Ok(Json(DealResponse::new(deal, participants)))
}

/// PUT /api/deals/:deal_id — Update terms. Initiator or admin tier.
pub async fn update(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    Json(request): Json<UpdateDealRequest>,
) -> Result<Json<DealResponse>, AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    let deal = visible_deal(&state.db, &deal_id, &session.user_id).await?;
    ensure_may_edit(&state.db, &deal, &session.user_id).await?;

    db::deals::update_terms(
        &state.db,
        &deal.id,
        &request.title,
        request.description.as_deref(),
        request.confidentiality_level,
    )
    .await?;

    let updated = db::deals::find_by_id(&state.db, &deal.id)
        .await?
        .ok_or(AppError::Internal)?;
    let participants = db::deals::list_participants(&state.db, &updated.id).await?;
    Ok(Json(DealResponse::new(updated, participants)))
}

/// PUT /api/deals/:deal_id/status — Status change, state machine enforced:
/// pending → accepted | rejected, accepted → completed.
pub async fn update_status(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    Json(request): Json<UpdateDealStatusRequest>,
) -> Result<Json<DealResponse>, AppError> {
    let deal = visible_deal(&state.db, &deal_id, &session.user_id).await?;
    ensure_may_edit(&state.db, &deal, &session.user_id).await?;

    if !deal.deal_status().can_transition_to(request.status) {
        return Err(AppError::Validation(format!(
            "Invalid status transition: {} -> {}",
            deal.status, request.status
        )));
    }

    db::deals::update_status(&state.db, &deal.id, request.status).await?;

    let updated = db::deals::find_by_id(&state.db, &deal.id)
        .await?
        .ok_or(AppError::Internal)?;
    let participants = db::deals::list_participants(&state.db, &updated.id).await?;
    Ok(Json(DealResponse::new(updated, participants)))
}

/// POST /api/deals/:deal_id/participants — Add a participant. Initiator or admin tier.
pub async fn add_participant(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    Json(request): Json<AddParticipantRequest>,
) -> Result<(StatusCode, Json<ParticipantResponse>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    let deal = visible_deal(&state.db, &deal_id, &session.user_id).await?;
    ensure_may_edit(&state.db, &deal, &session.user_id).await?;

    db::users::find_by_id(&state.db, &request.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if db::deals::find_participant(&state.db, &deal.id, &request.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Validation(
            "User is already a participant of this deal".to_string(),
        ));
    }

    let participant_id = Ulid::new().to_string();
    let new_participant = db::deals::NewDealParticipant {
        id: participant_id.clone(),
        deal_id: deal.id,
        user_id: request.user_id,
        role: request.role,
    };
    db::deals::insert_participant(&state.db, &new_participant).await?;

    let participant = db::deals::find_participant(&state.db, &new_participant.deal_id, &new_participant.user_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(participant.into())))
}

/// PUT /api/deals/:deal_id/participation — Change one's own participation
/// status. Participants cannot touch anyone else's row.
pub async fn update_participation(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(deal_id): Path<String>,
    Json(request): Json<UpdateParticipationRequest>,
) -> Result<Json<ParticipantResponse>, AppError> {
    let deal = db::deals::find_by_id(&state.db, &deal_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Deal not found".to_string()))?;

    // A pending participant must be able to accept, so this looks up the
    // participant row directly instead of going through visibility.
    let participant = db::deals::find_participant(&state.db, &deal.id, &session.user_id)
        .await?
        .ok_or_else(|| AppError::Forbidden("Not a participant of this deal".to_string()))?;

    db::deals::update_participant_status(&state.db, &participant.id, request.status).await?;

    let updated = db::deals::find_participant(&state.db, &deal.id, &session.user_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok(Json(updated.into()))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/deals", get(list).post(create))
        .route("/api/deals/:deal_id", get(show).put(update))
        .route("/api/deals/:deal_id/status", axum::routing::put(update_status))
        .route("/api/deals/:deal_id/participants", axum::routing::post(add_participant))
        .route("/api/deals/:deal_id/participation", axum::routing::put(update_participation))
}
