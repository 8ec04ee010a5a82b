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
    access::{self, Requirement, LEVEL_MANAGE_CONTENT},
    db,
    domain::ContractStatus,
    error::AppError,
    session::ApiAuthenticatedSession,
    AppState,
};

/// Request body for creating a contract.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContractRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 100_000))]
    pub body: Option<String>,
}

/// Request body for a contract status change.
#[derive(Debug, Deserialize)]
pub struct UpdateContractStatusRequest {
    pub status: ContractStatus,
}

/// Request body for signing a contract.
#[derive(Debug, Deserialize, Validate)]
pub struct SignContractRequest {
    /// Optional display name on the signature; defaults to the caller's.
    #[validate(length(min = 1, max = 100))]
    pub signer_name: Option<String>,
}

/// Response for a signature.
#[derive(Debug, Serialize)]
pub struct SignatureResponse {
    pub id: String,
    pub contract_id: String,
    pub signer_id: Option<String>,
    pub signer_name: String,
    pub signed_at: i64,
}

impl From<db::contracts::ContractSignature> for SignatureResponse {
    fn from(s: db::contracts::ContractSignature) -> Self {
        Self {
            id: s.id,
            contract_id: s.contract_id,
            signer_id: s.signer_id,
            signer_name: s.signer_name,
            signed_at: s.signed_at,
        }
    }
}

/// Response for a contract, with its signatures.
#[derive(Debug, Serialize)]
pub struct ContractResponse {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub body: Option<String>,
    pub status: String,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub signatures: Vec<SignatureResponse>,
}

impl ContractResponse {
    fn new(contract: db::contracts::Contract, signatures: Vec<db::contracts::ContractSignature>) -> Self {
        Self {
            id: contract.id,
            organization_id: contract.organization_id,
            title: contract.title,
            body: contract.body,
            status: contract.status,
            created_by: contract.created_by,
            created_at: contract.created_at,
            updated_at: contract.updated_at,
            signatures: signatures.into_iter().map(SignatureResponse::from).collect(),
        }
    }
}

/// Fetch a contract scoped to the org in the path. 404 on mismatch.
async fn contract_in_org(
    pool: &sqlx::SqlitePool,
    org_id: &str,
    contract_id: &str,
) -> Result<db::contracts::Contract, AppError> {
    let contract = db::contracts::find_by_id(pool, contract_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))?;
    if contract.organization_id != org_id {
        return Err(AppError::NotFound("Contract not found".to_string()));
    }
    Ok(contract)
}

/// GET /api/orgs/:org_id/contracts — List contracts. Any member.
pub async fn list(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<ContractResponse>>, AppError> {
    access::resolve(&state.db, &session.user_id, &org_id, Requirement::Member).await?;

    let contracts = db::contracts::list_for_org(&state.db, &org_id).await?;
    let mut out = Vec::with_capacity(contracts.len());
    for contract in contracts {
        let signatures = db::contracts::list_signatures(&state.db, &contract.id).await?;
        out.push(ContractResponse::new(contract, signatures));
    }
    Ok(Json(out))
}

/// POST /api/orgs/:org_id/contracts — Create a draft contract. Level 4 or owner.
pub async fn create(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Json(request): Json<CreateContractRequest>,
) -> Result<(StatusCode, Json<ContractResponse>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    access::resolve(
        &state.db,
        &session.user_id,
        &org_id,
        Requirement::Level(LEVEL_MANAGE_CONTENT),
    )
    .await?;

    let contract_id = Ulid::new().to_string();
    let new_contract = db::contracts::NewContract {
        id: contract_id.clone(),
        organization_id: org_id,
        title: request.title,
        body: request.body,
        created_by: session.user_id.clone(),
    };
    db::contracts::insert(&state.db, &new_contract).await?;

    let contract = db::contracts::find_by_id(&state.db, &contract_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(ContractResponse::new(contract, Vec::new()))))
}

/// GET /api/orgs/:org_id/contracts/:contract_id — Contract with signatures. Any member.
pub async fn show(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, contract_id)): Path<(String, String)>,
) -> Result<Json<ContractResponse>, AppError> {
    access::resolve(&state.db, &session.user_id, &org_id, Requirement::Member).await?;

    let contract = contract_in_org(&state.db, &org_id, &contract_id).await?;
    let signatures = db::contracts::list_signatures(&state.db, &contract.id).await?;
    Ok(Json(ContractResponse::new(contract, signatures)))
}

/// PUT /api/orgs/:org_id/contracts/:contract_id/status — Move the contract
/// forward (draft → pending → sent → signed). Level 4 or owner. Backward
/// moves are rejected.
pub async fn update_status(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, contract_id)): Path<(String, String)>,
    Json(request): Json<UpdateContractStatusRequest>,
) -> Result<Json<ContractResponse>, AppError> {
    access::resolve(
        &state.db,
        &session.user_id,
        &org_id,
        Requirement::Level(LEVEL_MANAGE_CONTENT),
    )
    .await?;

    let contract = contract_in_org(&state.db, &org_id, &contract_id).await?;

    if !contract.contract_status().can_transition_to(request.status) {
        return Err(AppError::Validation(format!(
            "Invalid status transition: {} -> {}",
            contract.status, request.status
        )));
    }

    db::contracts::update_status(&state.db, &contract.id, request.status).await?;

    let updated = db::contracts::find_by_id(&state.db, &contract.id)
        .await?
        .ok_or(AppError::Internal)?;
    let signatures = db::contracts::list_signatures(&state.db, &updated.id).await?;
    Ok(Json(ContractResponse::new(updated, signatures)))
}

/// POST /api/orgs/:org_id/contracts/:contract_id/signatures — Sign. Any member.
pub async fn sign(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, contract_id)): Path<(String, String)>,
    Json(request): Json<SignContractRequest>,
) -> Result<(StatusCode, Json<SignatureResponse>), AppError> {
    request
        .validate()
        .map_err(|_| AppError::Validation("Invalid input".to_string()))?;

    access::resolve(&state.db, &session.user_id, &org_id, Requirement::Member).await?;

    let contract = contract_in_org(&state.db, &org_id, &contract_id).await?;

    let caller = db::users::find_by_id(&state.db, &session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let signer_name = request.signer_name.unwrap_or(caller.display_name);

    let signature_id = Ulid::new().to_string();
    let new_signature = db::contracts::NewContractSignature {
        id: signature_id.clone(),
        contract_id: contract.id,
        signer_id: Some(session.user_id.clone()),
        signer_name,
    };
    db::contracts::insert_signature(&state.db, &new_signature).await?;

    let signature = db::contracts::find_signature(&state.db, &signature_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(signature.into())))
}

/// DELETE /api/orgs/:org_id/contracts/:contract_id/signatures/:signature_id
///
/// Allowed only for the signature's own signer, the contract's creator, or
/// the organization owner. This check is independent of access level: a
/// level-5 staffer who is none of the three is still refused.
pub async fn delete_signature(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, contract_id, signature_id)): Path<(String, String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let org = db::organizations::find_by_id(&state.db, &org_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;

    let contract = contract_in_org(&state.db, &org_id, &contract_id).await?;

    let signature = db::contracts::find_signature(&state.db, &signature_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Signature not found".to_string()))?;
    if signature.contract_id != contract.id {
        return Err(AppError::NotFound("Signature not found".to_string()));
    }

    let caller = session.user_id.as_str();
    let is_signer = signature.signer_id.as_deref() == Some(caller);
    let is_creator = contract.created_by == caller;
    let is_org_owner = org.owner_id == caller;

    if !(is_signer || is_creator || is_org_owner) {
        return Err(AppError::Forbidden(
            "Only the signer, the contract creator, or the organization owner may delete a signature".to_string(),
        ));
    }

    db::contracts::delete_signature(&state.db, &signature.id).await?;

    Ok(Json(serde_json::json!({ "message": "Signature deleted" })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orgs/:org_id/contracts", get(list).post(create))
        .route("/api/orgs/:org_id/contracts/:contract_id", get(show))
        .route(
            "/api/orgs/:org_id/contracts/:contract_id/status",
            axum::routing::put(update_status),
        )
        .route(
            "/api/orgs/:org_id/contracts/:contract_id/signatures",
            axum::routing::post(sign),
        )
        .route(
            "/api/orgs/:org_id/contracts/:contract_id/signatures/:signature_id",
            axum::routing::delete(delete_signature),
        )
}
