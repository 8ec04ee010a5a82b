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
    domain::{TaskPriority, TaskStatus},
    error::AppError,
    session::ApiAuthenticatedSession,
    AppState,
};

/// Request body for creating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[serde(default)]
    pub assigned_to: Vec<String>,
}

/// Request body for updating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[serde(default)]
    pub assigned_to: Vec<String>,
}

/// Response for a task. `assigned_to` is always a list, even for rows
/// written with the legacy single-value format.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub category: Option<String>,
    pub assigned_to: Vec<String>,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<db::tasks::CorporateTask> for TaskResponse {
    fn from(task: db::tasks::CorporateTask) -> Self {
        let assigned_to = task.assignees();
        Self {
            id: task.id,
            organization_id: task.organization_id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            status: task.status,
            category: task.category,
            assigned_to,
            created_by: task.created_by,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Every assigned staff id must be a staff row of this organization.
async fn validate_assignees(
    conn: &mut sqlx::SqliteConnection,
    org_id: &str,
    assigned_to: &[String],
) -> Result<(), AppError> {
    for staff_id in assigned_to {
        let member = db::staff::find_by_id(&mut *conn, staff_id)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown staff id: {}", staff_id)))?;
        if member.organization_id != org_id {
            return Err(AppError::Validation(format!(
                "Staff {} does not belong to this organization",
                staff_id
            )));
        }
    }
    Ok(())
}

/// GET /api/orgs/:org_id/tasks — List tasks. Any member.
pub async fn list(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    access::resolve(&state.db, &session.user_id, &org_id, Requirement::Member).await?;

    let tasks = db::tasks::list_for_org(&state.db, &org_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /api/orgs/:org_id/tasks — Create a task. Level 4 or owner.
/// Assignment validation and the insert run in one transaction.
pub async fn create(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path(org_id): Path<String>,
    Json(request): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
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

    let task_id = Ulid::new().to_string();
    let new_task = db::tasks::NewCorporateTask {
        id: task_id.clone(),
        organization_id: org_id.clone(),
        title: request.title,
        description: request.description,
        priority: request.priority.unwrap_or(TaskPriority::Medium),
        status: TaskStatus::Todo,
        category: request.category,
        assigned_to: request.assigned_to,
        created_by: session.user_id.clone(),
    };

    let mut tx = state.db.begin().await?;
    validate_assignees(&mut *tx, &org_id, &new_task.assigned_to).await?;
    db::tasks::insert(&mut *tx, &new_task).await?;
    tx.commit().await?;

    let task = db::tasks::find_by_id(&state.db, &task_id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// Fetch a task scoped to the org in the path. 404 on mismatch.
async fn task_in_org(
    pool: &sqlx::SqlitePool,
    org_id: &str,
    task_id: &str,
) -> Result<db::tasks::CorporateTask, AppError> {
    let task = db::tasks::find_by_id(pool, task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;
    if task.organization_id != org_id {
        return Err(AppError::NotFound("Task not found".to_string()));
    }
    Ok(task)
}

/// PUT /api/orgs/:org_id/tasks/:task_id — Update a task. Level 4 or owner.
pub async fn update(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, task_id)): Path<(String, String)>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, AppError> {
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

    let task = task_in_org(&state.db, &org_id, &task_id).await?;

    let fields = db::tasks::TaskUpdate {
        title: request.title,
        description: request.description,
        priority: request.priority,
        status: request.status,
        category: request.category,
        assigned_to: request.assigned_to,
    };

    let mut tx = state.db.begin().await?;
    validate_assignees(&mut *tx, &org_id, &fields.assigned_to).await?;
    db::tasks::update(&mut *tx, &task.id, &fields).await?;
    tx.commit().await?;

    let updated = db::tasks::find_by_id(&state.db, &task.id)
        .await?
        .ok_or(AppError::Internal)?;

    Ok(Json(updated.into()))
}

/// DELETE /api/orgs/:org_id/tasks/:task_id — Delete a task. Level 4 or owner.
pub async fn delete(
    ApiAuthenticatedSession(session): ApiAuthenticatedSession,
    State(state): State<AppState>,
    Path((org_id, task_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    access::resolve(
        &state.db,
        &session.user_id,
        &org_id,
        Requirement::Level(LEVEL_MANAGE_CONTENT),
    )
    .await?;

    let task = task_in_org(&state.db, &org_id, &task_id).await?;
    db::tasks::delete(&state.db, &task.id).await?;

    Ok(Json(serde_json::json!({ "message": "Task deleted" })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/orgs/:org_id/tasks", get(list).post(create))
        .route("/api/orgs/:org_id/tasks/:task_id", axum::routing::put(update).delete(delete))
}
